//! Content directory loading.
//!
//! The exporter core works on in-memory tables; this module walks a content
//! directory on disk and builds those tables:
//!
//! ```text
//! <content-dir>/
//!   renderer.config.json                 renderer + field-type dependencies
//!   adapters/index.ts                    multi-ecosystem adapter index
//!   adapters/<eco>/adapter.config.json   per-ecosystem dependencies (optional)
//!   adapters/<eco>/adapter.ts            primary adapter source
//!   lib/*.ts                             shared sources
//!   patches/*.patch                      pnpm patch files
//!   templates/**                         static project skeleton
//! ```

use formpack_core::config::{AdapterConfigTable, RendererConfig};
use formpack_core::filemap::FileContent;
use formpack_core::form::{FormConfig, NetworkConfig};
use formpack_core::Exporter;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading content or form inputs from disk.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Everything a content directory contributes to the exporter.
#[derive(Debug)]
pub struct LoadedContent {
    pub renderer: RendererConfig,
    pub adapter_configs: AdapterConfigTable,
    pub sources: BTreeMap<String, String>,
    pub patches: BTreeMap<String, String>,
    pub templates: BTreeMap<String, FileContent>,
}

impl LoadedContent {
    /// Load a content directory.
    ///
    /// `renderer.config.json` is required; everything else is collected
    /// opportunistically so a minimal content set still loads.
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        let renderer_path = dir.join("renderer.config.json");
        let renderer_text = read_text(&renderer_path)?;
        let renderer =
            RendererConfig::from_json(&renderer_text).map_err(|source| ContentError::Parse {
                path: renderer_path,
                source,
            })?;

        let adapter_configs = load_adapter_configs(dir)?;
        let sources = load_sources(dir)?;
        let patches = load_patches(dir)?;
        let templates = load_templates(dir)?;

        debug!(
            adapters = adapter_configs.len(),
            sources = sources.len(),
            patches = patches.len(),
            templates = templates.len(),
            "loaded content directory"
        );

        Ok(Self {
            renderer,
            adapter_configs,
            sources,
            patches,
            templates,
        })
    }

    /// Hand the loaded tables to an exporter.
    #[must_use]
    pub fn into_exporter(self) -> Exporter {
        Exporter::new(
            self.renderer,
            self.adapter_configs,
            self.sources,
            self.patches,
            self.templates,
        )
    }
}

/// Read a form config from a JSON file.
pub fn load_form(path: &Path) -> Result<FormConfig, ContentError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a network config from a JSON file.
pub fn load_network(path: &Path) -> Result<NetworkConfig, ContentError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect `adapters/<eco>/adapter.config.json` files, keyed by ecosystem id.
///
/// The raw JSON text is kept as-is; the core parses and validates lazily so
/// one malformed config degrades that ecosystem instead of failing the load.
fn load_adapter_configs(dir: &Path) -> Result<AdapterConfigTable, ContentError> {
    let mut configs = BTreeMap::new();

    for path in matched_files(dir, "adapters/*/adapter.config.json")? {
        let Some(ecosystem) = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
        else {
            continue;
        };
        configs.insert(ecosystem, read_text(&path)?);
    }

    Ok(configs)
}

/// Collect adapter and shared TypeScript sources, keyed root-relative.
fn load_sources(dir: &Path) -> Result<BTreeMap<String, String>, ContentError> {
    let mut sources = BTreeMap::new();

    for pattern in ["adapters/**/*.ts", "lib/*.ts"] {
        for path in matched_files(dir, pattern)? {
            sources.insert(relative_key(dir, &path), read_text(&path)?);
        }
    }

    Ok(sources)
}

/// Collect `patches/*.patch` files, keyed root-relative.
fn load_patches(dir: &Path) -> Result<BTreeMap<String, String>, ContentError> {
    let mut patches = BTreeMap::new();

    for path in matched_files(dir, "patches/*.patch")? {
        patches.insert(relative_key(dir, &path), read_text(&path)?);
    }

    Ok(patches)
}

/// Collect the static project skeleton, keyed relative to `templates/`.
///
/// Template files land in exported projects byte-for-byte, so anything that
/// is not valid UTF-8 is carried as binary.
fn load_templates(dir: &Path) -> Result<BTreeMap<String, FileContent>, ContentError> {
    let root = dir.join("templates");
    let mut templates = BTreeMap::new();

    for path in matched_files(dir, "templates/**/*")? {
        if !path.is_file() {
            continue;
        }
        let bytes = std::fs::read(&path).map_err(|source| ContentError::Read {
            path: path.clone(),
            source,
        })?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(err) => FileContent::Binary(err.into_bytes()),
        };
        templates.insert(relative_key(&root, &path), content);
    }

    Ok(templates)
}

/// Expand a glob pattern under `dir`, returning file paths.
fn matched_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ContentError> {
    let full_pattern = dir.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let entries = glob::glob(&pattern_str).map_err(|source| ContentError::Pattern {
        pattern: pattern_str.into_owned(),
        source,
    })?;

    Ok(entries.flatten().collect())
}

/// Key a path relative to `root`, with forward slashes on every platform.
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

fn read_text(path: &Path) -> Result<String, ContentError> {
    std::fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn seed_content(dir: &Path) {
        write(
            dir,
            "renderer.config.json",
            r#"{
                "coreDependencies": { "react": "^18.2.0" },
                "fieldDependencies": {},
                "publishedVersions": { "@formpack/renderer": "1.0.0" }
            }"#,
        );
        write(
            dir,
            "adapters/evm/adapter.config.json",
            r#"{ "dependencies": { "runtime": { "viem": "^2.21.0" }, "dev": {} } }"#,
        );
        write(dir, "adapters/evm/adapter.ts", "export class EvmAdapter {}\n");
        write(dir, "adapters/index.ts", "// index\n");
        write(dir, "lib/contract-schema.ts", "export interface Abi {}\n");
        write(dir, "patches/viem.patch", "--- a/x\n+++ b/x\n");
        write(dir, "templates/package.json", "{\"name\":\"seed\"}\n");
        write(dir, "templates/src/main.tsx", "render();\n");
    }

    #[test]
    fn test_load_collects_every_table() {
        let dir = tempfile::tempdir().unwrap();
        seed_content(dir.path());

        let content = LoadedContent::load(dir.path()).unwrap();

        assert_eq!(
            content.renderer.core_dependencies.get("react"),
            Some(&"^18.2.0".to_string())
        );
        assert!(content.adapter_configs.contains_key("evm"));
        assert!(content.sources.contains_key("adapters/evm/adapter.ts"));
        assert!(content.sources.contains_key("adapters/index.ts"));
        assert!(content.sources.contains_key("lib/contract-schema.ts"));
        assert!(content.patches.contains_key("patches/viem.patch"));
        assert!(content.templates.contains_key("package.json"));
        assert!(content.templates.contains_key("src/main.tsx"));
    }

    #[test]
    fn test_load_requires_renderer_config() {
        let dir = tempfile::tempdir().unwrap();

        let err = LoadedContent::load(dir.path()).unwrap_err();

        assert!(matches!(err, ContentError::Read { .. }));
        assert!(err.to_string().contains("renderer.config.json"));
    }

    #[test]
    fn test_load_form_reports_parse_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "form.json", "{ not json");

        let err = load_form(&dir.path().join("form.json")).unwrap_err();

        assert!(matches!(err, ContentError::Parse { .. }));
        assert!(err.to_string().contains("form.json"));
    }

    #[test]
    fn test_load_form_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "form.json",
            r#"{
                "functionId": "transfer",
                "contractAddress": "0xabc",
                "fields": [{ "name": "to", "type": "address" }]
            }"#,
        );

        let form = load_form(&dir.path().join("form.json")).unwrap();

        assert_eq!(form.function_id, "transfer");
        assert_eq!(form.fields.len(), 1);
        assert_eq!(form.fields[0].field_type, "address");
    }
}
