//! Dependency merging across configuration sources.
//!
//! Exported projects pull dependencies from four places. Merging happens in
//! ascending precedence order, so a later source overwrites the version range
//! of an earlier one for the same package name:
//!
//! 1. renderer core dependencies
//! 2. per-field-type dependencies for every type the form uses
//! 3. ecosystem adapter dependencies (plus the project's own published
//!    packages for that ecosystem)
//! 4. explicit caller overrides

use std::collections::BTreeMap;
use std::sync::Arc;

use formpack_util::case::slugify;

use crate::config::{AdapterConfig, AdapterConfigCache, ExportOptions, RendererConfig};
use crate::form::FormConfig;

use super::version::caret_range;

/// Published rendering package every export depends on.
pub const RENDERER_PACKAGE: &str = "@formpack/renderer";
/// Published shared-types package.
pub const TYPES_PACKAGE: &str = "@formpack/types";
/// Prefix of the per-ecosystem adapter packages.
pub const ADAPTER_PACKAGE_PREFIX: &str = "@formpack/adapter-";

/// Published adapter package name for an ecosystem id.
#[must_use]
pub fn adapter_package_name(ecosystem: &str) -> String {
    format!("{ADAPTER_PACKAGE_PREFIX}{ecosystem}")
}

/// Whether `package` is one of the project's own published packages.
#[must_use]
pub fn is_published_package(package: &str) -> bool {
    package == RENDERER_PACKAGE
        || package == TYPES_PACKAGE
        || package.starts_with(ADAPTER_PACKAGE_PREFIX)
}

/// Computes merged dependency maps and rewrites exported package.json files.
///
/// Owns the static renderer declarations and the adapter-config cache; one
/// instance serves every export in a process.
#[derive(Debug)]
pub struct PackageManager {
    renderer: RendererConfig,
    adapters: AdapterConfigCache,
}

impl PackageManager {
    #[must_use]
    pub fn new(renderer: RendererConfig, adapters: AdapterConfigCache) -> Self {
        Self { renderer, adapters }
    }

    #[must_use]
    pub fn renderer(&self) -> &RendererConfig {
        &self.renderer
    }

    /// Cached adapter config for an ecosystem, if it declares one.
    #[must_use]
    pub fn adapter_config(&self, ecosystem: &str) -> Option<Arc<AdapterConfig>> {
        self.adapters.get(ecosystem)
    }

    /// Merged runtime dependency map for one form export.
    ///
    /// Unknown ecosystems contribute nothing: the merge still succeeds with
    /// core and field-type dependencies only. Output is sorted by package
    /// name (`BTreeMap`), so serialization is deterministic.
    #[must_use]
    pub fn runtime_dependencies(
        &self,
        form: &FormConfig,
        ecosystem: &str,
        overrides: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut deps = self.renderer.core_dependencies.clone();

        for field_type in form.distinct_field_types() {
            if let Some(field_deps) = self.renderer.field_dependencies.get(&field_type) {
                merge_into(&mut deps, &field_deps.runtime_dependencies);
            }
        }

        if let Some(config) = self.adapters.get(ecosystem) {
            merge_into(&mut deps, &config.dependencies.runtime);
        }
        self.insert_published_packages(&mut deps, ecosystem);

        merge_into(&mut deps, overrides);
        deps
    }

    /// Merged dev dependency map for one form export.
    ///
    /// The renderer declares no core dev dependencies (the project template
    /// carries the toolchain), so only field-type and adapter sources apply.
    #[must_use]
    pub fn dev_dependencies(&self, form: &FormConfig, ecosystem: &str) -> BTreeMap<String, String> {
        let mut deps = BTreeMap::new();

        for field_type in form.distinct_field_types() {
            if let Some(field_deps) = self.renderer.field_dependencies.get(&field_type) {
                merge_into(&mut deps, &field_deps.dev_dependencies);
            }
        }

        if let Some(config) = self.adapters.get(ecosystem) {
            merge_into(&mut deps, &config.dependencies.dev);
        }

        deps
    }

    /// Project name for one export: caller override or a slug of the
    /// function id.
    #[must_use]
    pub fn project_name(&self, form: &FormConfig, options: &ExportOptions) -> String {
        options
            .project_name
            .clone()
            .unwrap_or_else(|| format!("{}-form", slugify(&form.function_id)))
    }

    /// Add the types and adapter packages for a known ecosystem.
    ///
    /// An ecosystem counts as known when its adapter package has a published
    /// version; ecosystems without one (including typos) add nothing here.
    fn insert_published_packages(&self, deps: &mut BTreeMap<String, String>, ecosystem: &str) {
        let adapter_package = adapter_package_name(ecosystem);
        let Some(adapter_version) = self.renderer.published_versions.get(&adapter_package) else {
            return;
        };

        if let Some(types_version) = self.renderer.published_versions.get(TYPES_PACKAGE) {
            deps.insert(TYPES_PACKAGE.to_string(), caret_range(types_version));
        }
        deps.insert(adapter_package, caret_range(adapter_version));
    }
}

/// Last write wins: entries from `source` overwrite same-named entries in
/// `target`.
fn merge_into(target: &mut BTreeMap<String, String>, source: &BTreeMap<String, String>) {
    for (name, range) in source {
        target.insert(name.clone(), range.clone());
    }
}
