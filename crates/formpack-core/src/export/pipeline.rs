//! End-to-end export assembly.
//!
//! [`Exporter`] wires the stages together: template seeding, adapter source
//! selection, package.json rewriting with patch assembly, and app-config
//! generation. It owns no I/O; callers hand it already-loaded content and
//! write the resulting [`FileMap`] out themselves.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::info;

use crate::config::{AdapterConfigCache, AdapterConfigTable, ExportOptions, RendererConfig};
use crate::error::ExportError;
use crate::filemap::{FileContent, FileMap};
use crate::form::{FormConfig, NetworkConfig};

use super::app_config::{generate_app_config, JsonFormatter, PrettyFormatter};
use super::assembler::AdapterAssembler;
use super::deps::PackageManager;
use super::manifest::ExportManifest;
use super::patches::PatchStore;

/// Output path of the rewritten project manifest.
const PACKAGE_JSON_PATH: &str = "package.json";
/// Output path of the annotated example config.
const EXAMPLE_CONFIG_PATH: &str = "app.config.json.example";
/// Output path of the active config.
const ACTIVE_CONFIG_PATH: &str = "app.config.json";

/// Base manifest used when the template set ships no package.json.
const DEFAULT_PACKAGE_JSON: &str = r#"{
  "name": "",
  "private": true,
  "version": "0.1.0",
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "tsc -b && vite build",
    "preview": "vite preview"
  },
  "dependencies": {},
  "devDependencies": {}
}
"#;

/// Everything one export produces.
#[derive(Debug)]
pub struct ExportOutput {
    /// The complete project tree, ready to write out.
    pub files: FileMap,
    /// Machine-readable summary of the run.
    pub manifest: ExportManifest,
}

/// Assembles standalone projects from loaded content.
///
/// One instance serves every export in a process; the adapter registry and
/// config cache warm up on first use and are shared after that.
pub struct Exporter {
    package_manager: PackageManager,
    assembler: AdapterAssembler,
    patch_store: PatchStore,
    templates: BTreeMap<String, FileContent>,
    formatter: Box<dyn JsonFormatter + Send + Sync>,
}

impl Exporter {
    #[must_use]
    pub fn new(
        renderer: RendererConfig,
        adapter_configs: AdapterConfigTable,
        sources: BTreeMap<String, String>,
        patches: BTreeMap<String, String>,
        templates: BTreeMap<String, FileContent>,
    ) -> Self {
        Self {
            package_manager: PackageManager::new(
                renderer,
                AdapterConfigCache::new(adapter_configs),
            ),
            assembler: AdapterAssembler::new(sources),
            patch_store: PatchStore::new(patches),
            templates,
            formatter: Box::new(PrettyFormatter),
        }
    }

    /// Swap the JSON formatter used for generated config documents.
    #[must_use]
    pub fn with_formatter(mut self, formatter: Box<dyn JsonFormatter + Send + Sync>) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn package_manager(&self) -> &PackageManager {
        &self.package_manager
    }

    /// Ecosystem ids this content set can export.
    pub async fn ecosystems(&self) -> Vec<String> {
        self.assembler.ecosystems().await
    }

    /// Whether `ecosystem` can be exported.
    pub async fn supports(&self, ecosystem: &str) -> bool {
        self.assembler.supports(ecosystem).await
    }

    /// Assemble one export.
    ///
    /// Stages run in a fixed order; the later a stage runs, the higher its
    /// authority over contested paths. The rewritten package.json lands
    /// last, so no template or adapter file can clobber it.
    ///
    /// # Errors
    /// Fails on unsupported ecosystems, missing shared sources, an
    /// unparseable adapter index, or an invalid template package.json.
    /// Everything else degrades with a warning instead.
    pub async fn export(
        &self,
        form: &FormConfig,
        network: &NetworkConfig,
        options: &ExportOptions,
    ) -> Result<ExportOutput, ExportError> {
        let mut files = FileMap::new();

        for (path, content) in &self.templates {
            files.insert(path.clone(), content.clone());
        }

        self.assembler
            .files_for(&network.ecosystem, &mut files)
            .await?;

        let base = self
            .templates
            .get(PACKAGE_JSON_PATH)
            .and_then(FileContent::as_text)
            .unwrap_or(DEFAULT_PACKAGE_JSON);
        let (package_json, patch_outcome) = self.package_manager.update_package_json(
            base,
            form,
            &network.ecosystem,
            options,
            &self.patch_store,
            &mut files,
        )?;

        let configs = generate_app_config(network, form, self.formatter.as_ref());
        files.insert(EXAMPLE_CONFIG_PATH, configs.example.into());
        if let Some(active) = configs.active {
            files.insert(ACTIVE_CONFIG_PATH, active.into());
        }

        let doc: Value = serde_json::from_str(&package_json).unwrap_or(Value::Null);
        files.insert(PACKAGE_JSON_PATH, package_json.into());

        let mut manifest = ExportManifest::new(
            self.package_manager.project_name(form, options),
            network.ecosystem.clone(),
            network.id.clone(),
            options.env.as_str().to_string(),
        );
        manifest.file_count = files.len();
        manifest.dependency_count = count_section(&doc, "dependencies");
        manifest.dev_dependency_count = count_section(&doc, "devDependencies");
        manifest.patches = patch_outcome
            .records
            .iter()
            .map(|record| record.dependency.clone())
            .collect();
        manifest.skipped_patches = patch_outcome.skipped;
        manifest.fingerprint = files.fingerprint();

        info!(
            project = %manifest.project_name,
            ecosystem = %manifest.ecosystem,
            env = %manifest.env,
            files = manifest.file_count,
            "export assembled"
        );
        Ok(ExportOutput { files, manifest })
    }
}

fn count_section(doc: &Value, key: &str) -> usize {
    doc.get(key).and_then(Value::as_object).map_or(0, Map::len)
}
