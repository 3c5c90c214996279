//! package.json rewriting for exported projects.
//!
//! The project template ships a neutral package.json; this module turns it
//! into the manifest of one concrete export. The base document is parsed,
//! merged into, and re-serialized; it is never edited textually. Every
//! mutation happens on the parsed tree, so a field the template author added
//! by hand survives untouched unless a computed value replaces it.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::{Env, ExportOptions};
use crate::error::ExportError;
use crate::filemap::FileMap;
use crate::form::FormConfig;

use super::deps::{is_published_package, PackageManager};
use super::patches::{assemble_patches, PatchOutcome, PatchRecord, PatchStore};
use super::version::resolve_version;

/// Maintenance scripts stamped into every exported project.
const HELPER_SCRIPTS: &[(&str, &str)] = &[
    (
        "update-renderer",
        "pnpm update \"@formpack/renderer\" \"@formpack/types\" \"@formpack/adapter-*\" --latest",
    ),
    ("check-deps", "pnpm outdated"),
];

impl PackageManager {
    /// Rewrite a template package.json for one export.
    ///
    /// Steps, in order:
    /// 1. set identity fields (name, description, author, license)
    /// 2. merge computed runtime and dev dependency maps into the document
    /// 3. rewrite self-published package versions for the target environment,
    ///    collecting `pnpm.overrides` entries for packed tarball installs
    /// 4. stamp the helper scripts
    /// 5. assemble declared source patches (skipped for local exports, where
    ///    the monorepo root already applies them) and inject the
    ///    `pnpm.patchedDependencies` block
    ///
    /// Returns the serialized document and the patch outcome. Patch files
    /// land in `files`; the document itself is the caller's to place.
    ///
    /// # Errors
    /// [`crate::error::codes::EXPORT_PACKAGE_JSON_INVALID`] when the base
    /// document is not a JSON object.
    pub fn update_package_json(
        &self,
        base: &str,
        form: &FormConfig,
        ecosystem: &str,
        options: &ExportOptions,
        patch_store: &PatchStore,
        files: &mut FileMap,
    ) -> Result<(String, PatchOutcome), ExportError> {
        let mut doc: Value = serde_json::from_str(base).map_err(|e| {
            ExportError::package_json_invalid(format!("template package.json is not valid JSON: {e}"))
        })?;
        let Some(root) = doc.as_object_mut() else {
            return Err(ExportError::package_json_invalid(
                "template package.json must be a JSON object",
            ));
        };

        self.set_identity(root, form, options);

        let runtime = self.runtime_dependencies(form, ecosystem, &options.dependencies);
        merge_section(root, "dependencies", &runtime);
        let dev = self.dev_dependencies(form, ecosystem);
        merge_section(root, "devDependencies", &dev);

        let overrides = self.apply_version_strategy(root, options);
        stamp_helper_scripts(root);

        let mut outcome = PatchOutcome::default();
        if options.env != Env::Local {
            if let Some(config) = self.adapter_config(ecosystem) {
                if config.has_patches() {
                    outcome = assemble_patches(
                        ecosystem,
                        &config,
                        patch_store,
                        options.env,
                        &options.packed_tarballs,
                        files,
                    );
                }
            }
        }
        inject_pnpm_entries(root, &outcome.records, &overrides);

        let mut text = serde_json::to_string_pretty(&doc)
            .map_err(|e| ExportError::package_json_invalid(format!("serialization failed: {e}")))?;
        text.push('\n');
        Ok((text, outcome))
    }

    fn set_identity(&self, root: &mut Map<String, Value>, form: &FormConfig, options: &ExportOptions) {
        root.insert(
            "name".to_string(),
            Value::String(self.project_name(form, options)),
        );
        let description = options
            .description
            .clone()
            .unwrap_or_else(|| format!("Transaction form for {}", form.function_id));
        root.insert("description".to_string(), Value::String(description));
        if let Some(author) = &options.author {
            root.insert("author".to_string(), Value::String(author.clone()));
        }
        if let Some(license) = &options.license {
            root.insert("license".to_string(), Value::String(license.clone()));
        }
    }

    /// Rewrite every self-published dependency for the target environment.
    ///
    /// Returns the `pnpm.overrides` entries packed exports need. A published
    /// package with no recorded version keeps its declared range.
    fn apply_version_strategy(
        &self,
        root: &mut Map<String, Value>,
        options: &ExportOptions,
    ) -> Vec<(String, String)> {
        let mut overrides = Vec::new();

        for section in ["dependencies", "devDependencies"] {
            let Some(Value::Object(deps)) = root.get_mut(section) else {
                continue;
            };
            for (name, range) in deps.iter_mut() {
                if !is_published_package(name) {
                    continue;
                }
                let Some(published) = self.renderer().published_versions.get(name) else {
                    warn!(
                        package = %name,
                        "no published version recorded; leaving declared range"
                    );
                    continue;
                };
                *range = Value::String(resolve_version(
                    name,
                    published,
                    options.env,
                    &options.packed_tarballs,
                ));
                if options.env == Env::Packed {
                    if let Some(path) = options.packed_tarballs.get(name) {
                        overrides.push((name.clone(), format!("file:{path}")));
                    }
                }
            }
        }

        overrides
    }
}

/// Merge computed entries into a package.json section, creating it on
/// demand. Existing entries for other packages survive; same-named entries
/// are replaced.
fn merge_section(root: &mut Map<String, Value>, section: &str, merged: &BTreeMap<String, String>) {
    if merged.is_empty() && !root.contains_key(section) {
        return;
    }
    ensure_object(root, section);
    if let Some(Value::Object(target)) = root.get_mut(section) {
        for (name, range) in merged {
            target.insert(name.clone(), Value::String(range.clone()));
        }
    }
}

fn stamp_helper_scripts(root: &mut Map<String, Value>) {
    ensure_object(root, "scripts");
    if let Some(Value::Object(scripts)) = root.get_mut("scripts") {
        for (name, command) in HELPER_SCRIPTS {
            scripts.insert((*name).to_string(), Value::String((*command).to_string()));
        }
    }
}

fn inject_pnpm_entries(
    root: &mut Map<String, Value>,
    patched: &[PatchRecord],
    overrides: &[(String, String)],
) {
    if patched.is_empty() && overrides.is_empty() {
        return;
    }
    ensure_object(root, "pnpm");
    let Some(Value::Object(pnpm)) = root.get_mut("pnpm") else {
        return;
    };

    if !patched.is_empty() {
        ensure_object(pnpm, "patchedDependencies");
        if let Some(Value::Object(map)) = pnpm.get_mut("patchedDependencies") {
            for record in patched {
                map.insert(record.dependency.clone(), Value::String(record.path.clone()));
            }
        }
    }

    if !overrides.is_empty() {
        ensure_object(pnpm, "overrides");
        if let Some(Value::Object(map)) = pnpm.get_mut("overrides") {
            for (name, spec) in overrides {
                map.insert(name.clone(), Value::String(spec.clone()));
            }
        }
    }
}

/// Make `root[key]` an object, replacing scalar junk with a warning.
fn ensure_object(root: &mut Map<String, Value>, key: &str) {
    let needs_reset = match root.get(key) {
        None => true,
        Some(value) if value.is_object() => false,
        Some(_) => {
            warn!(key, "package.json field is not an object; replacing");
            true
        }
    };
    if needs_reset {
        root.insert(key.to_string(), Value::Object(Map::new()));
    }
}
