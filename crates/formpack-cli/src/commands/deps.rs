//! `formpack deps` command implementation.
//!
//! Print the dependency set an export would install, without running the
//! full pipeline. Useful for auditing what a form pulls in.

use crate::content::{self, ContentError, LoadedContent};
use formpack_core::form::FormConfig;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DepsReport<'a> {
    ok: bool,
    ecosystem: &'a str,
    dependencies: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dev_dependencies: Option<&'a BTreeMap<String, String>>,
}

/// Run the deps command.
pub fn run(
    form_path: &Path,
    content_dir: &Path,
    ecosystem: &str,
    dev: bool,
    json: bool,
) -> Result<()> {
    let (content, form) = match load_inputs(form_path, content_dir) {
        Ok(inputs) => inputs,
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": e.to_string()
                    })
                );
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(2);
        }
    };

    let exporter = content.into_exporter();
    let manager = exporter.package_manager();

    let dependencies = manager.runtime_dependencies(&form, ecosystem, &BTreeMap::new());
    let dev_dependencies = dev.then(|| manager.dev_dependencies(&form, ecosystem));

    if json {
        let report = DepsReport {
            ok: true,
            ecosystem,
            dependencies: &dependencies,
            dev_dependencies: dev_dependencies.as_ref(),
        };
        println!("{}", serde_json::to_string(&report).into_diagnostic()?);
    } else {
        println!("Dependencies ({}):", dependencies.len());
        for (name, range) in &dependencies {
            println!("  {name} {range}");
        }
        if let Some(dev_deps) = &dev_dependencies {
            println!();
            println!("Dev dependencies ({}):", dev_deps.len());
            for (name, range) in dev_deps {
                println!("  {name} {range}");
            }
        }
    }

    Ok(())
}

fn load_inputs(
    form_path: &Path,
    content_dir: &Path,
) -> Result<(LoadedContent, FormConfig), ContentError> {
    let content = LoadedContent::load(content_dir)?;
    let form = content::load_form(form_path)?;
    Ok((content, form))
}
