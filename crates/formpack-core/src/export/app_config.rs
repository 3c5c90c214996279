//! Runtime configuration generation for exported projects.
//!
//! Every export carries an annotated `app.config.json.example` for the user
//! to copy and fill in. When the form designer picked a concrete wallet UI
//! kit, an active `app.config.json` is generated alongside it so the project
//! runs with that kit out of the box.

use serde_json::{Map, Value};
use tracing::warn;

use crate::form::{FormConfig, NetworkConfig};

/// Recommended wallet UI kit per known ecosystem, shown in the example
/// config.
pub const RECOMMENDED_UI_KITS: &[(&str, &str)] = &[
    ("evm", "rainbowkit"),
    ("solana", "wallet-ui"),
    ("stellar", "stellar-wallets-kit"),
    ("midnight", "midnight-connect"),
];

/// Kit selections that mean "generate no active config".
const PASSTHROUGH_KITS: &[&str] = &["custom", "none"];

/// Placeholder users replace with their WalletConnect project id.
const WALLETCONNECT_PLACEHOLDER: &str = "YOUR_WALLETCONNECT_PROJECT_ID";
/// Placeholder RPC endpoint in the example config.
const RPC_PLACEHOLDER: &str = "https://your-rpc-endpoint.example.com";

/// Formats generated JSON config documents.
///
/// The pipeline treats formatting as cosmetic: a failing formatter degrades
/// to compact output instead of failing the export.
pub trait JsonFormatter {
    /// Render a JSON document for human consumption.
    ///
    /// # Errors
    /// Implementations report failures as plain messages; callers log and
    /// fall back.
    fn format(&self, value: &Value) -> Result<String, String>;
}

/// Default formatter: pretty-printed with a trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyFormatter;

impl JsonFormatter for PrettyFormatter {
    fn format(&self, value: &Value) -> Result<String, String> {
        serde_json::to_string_pretty(value)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| e.to_string())
    }
}

/// Generated config documents for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfigFiles {
    /// Content of `app.config.json.example`; always produced.
    pub example: String,
    /// Content of `app.config.json`; only for a concrete kit selection.
    pub active: Option<String>,
}

/// Generate the example config and, when applicable, the active config.
#[must_use]
pub fn generate_app_config(
    network: &NetworkConfig,
    form: &FormConfig,
    formatter: &dyn JsonFormatter,
) -> AppConfigFiles {
    AppConfigFiles {
        example: render(&example_config(network), formatter),
        active: active_config(network, form).map(|value| render(&value, formatter)),
    }
}

fn render(value: &Value, formatter: &dyn JsonFormatter) -> String {
    match formatter.format(value) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "config formatter failed; emitting compact JSON");
            value.to_string()
        }
    }
}

fn example_config(network: &NetworkConfig) -> Value {
    let mut root = Map::new();
    root.insert("_readme".to_string(), readme_lines());
    root.insert(
        "globalServiceConfigs".to_string(),
        global_service_configs_example(),
    );
    root.insert(
        "networkServiceConfigs".to_string(),
        network_service_configs_example(network),
    );
    root.insert("rpcEndpoints".to_string(), rpc_endpoints_example(network));
    root.insert("featureFlags".to_string(), Value::Object(Map::new()));
    root.insert(
        "defaultLanguage".to_string(),
        Value::String("en".to_string()),
    );
    Value::Object(root)
}

fn readme_lines() -> Value {
    Value::Array(
        [
            "Copy this file to app.config.json and fill in values for your deployment.",
            "globalServiceConfigs.walletui selects the wallet UI kit per ecosystem; kitConfig is passed to the kit untouched.",
            "networkServiceConfigs holds API keys for block explorer services, keyed by service identifier.",
            "rpcEndpoints overrides the default public RPC endpoint per network id.",
            "featureFlags toggles optional behavior; leave empty for defaults.",
        ]
        .iter()
        .map(|line| Value::String((*line).to_string()))
        .collect(),
    )
}

fn global_service_configs_example() -> Value {
    let mut walletui = Map::new();
    for (ecosystem, kit) in RECOMMENDED_UI_KITS {
        let mut entry = Map::new();
        entry.insert(
            "kitName".to_string(),
            Value::String((*kit).to_string()),
        );
        entry.insert("kitConfig".to_string(), Value::Object(Map::new()));
        walletui.insert((*ecosystem).to_string(), Value::Object(entry));
    }

    let mut walletconnect = Map::new();
    walletconnect.insert(
        "projectId".to_string(),
        Value::String(WALLETCONNECT_PLACEHOLDER.to_string()),
    );

    let mut global = Map::new();
    global.insert("walletui".to_string(), Value::Object(walletui));
    global.insert("walletconnect".to_string(), Value::Object(walletconnect));
    Value::Object(global)
}

fn network_service_configs_example(network: &NetworkConfig) -> Value {
    let service_key = network
        .explorer_service
        .clone()
        .unwrap_or_else(|| synthesized_explorer_key(&network.id));

    let mut service = Map::new();
    service.insert(
        "apiKey".to_string(),
        Value::String("YOUR_API_KEY".to_string()),
    );
    service.insert(
        "_comment".to_string(),
        Value::String(format!(
            "API key for the {service_key} service, used to load contract metadata on {}",
            network.display_label()
        )),
    );

    let mut configs = Map::new();
    configs.insert(service_key, Value::Object(service));
    Value::Object(configs)
}

/// Stand-in key for networks that declare no explorer service.
fn synthesized_explorer_key(network_id: &str) -> String {
    let mut suffix = String::with_capacity(network_id.len());
    for c in network_id.chars() {
        if c.is_ascii_alphanumeric() {
            suffix.extend(c.to_uppercase());
        } else {
            suffix.push('_');
        }
    }
    format!("CONFIGURE_EXPLORER_API_KEY_FOR_{suffix}")
}

fn rpc_endpoints_example(network: &NetworkConfig) -> Value {
    let comment = match &network.rpc_url {
        Some(url) => format!(
            "Optional. Overrides the default endpoint for {} ({url}).",
            network.display_label()
        ),
        None => format!(
            "Optional. RPC endpoint override for {}.",
            network.display_label()
        ),
    };

    let mut endpoints = Map::new();
    endpoints.insert(
        network.id.clone(),
        Value::String(RPC_PLACEHOLDER.to_string()),
    );
    endpoints.insert(
        format!("_comment_for_{}", network.id),
        Value::String(comment),
    );
    Value::Object(endpoints)
}

fn active_config(network: &NetworkConfig, form: &FormConfig) -> Option<Value> {
    let kit = form.ui_kit.as_ref()?;
    if kit.kit_name.is_empty() || PASSTHROUGH_KITS.contains(&kit.kit_name.as_str()) {
        return None;
    }

    let mut entry = Map::new();
    entry.insert("kitName".to_string(), Value::String(kit.kit_name.clone()));
    entry.insert("kitConfig".to_string(), kit.kit_config.clone());

    let mut walletui = Map::new();
    walletui.insert(network.ecosystem.clone(), Value::Object(entry));

    let mut global = Map::new();
    global.insert("walletui".to_string(), Value::Object(walletui));

    let mut root = Map::new();
    root.insert("globalServiceConfigs".to_string(), Value::Object(global));
    Some(Value::Object(root))
}
