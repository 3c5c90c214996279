//! Export configuration sources and per-invocation options.
//!
//! Three kinds of configuration feed an export:
//! - [`RendererConfig`]: the static dependency declarations shipped with the
//!   rendering package (core deps, per-field-type deps, published versions).
//! - [`AdapterConfig`]: per-ecosystem dependency and patch declarations,
//!   loaded on demand through [`AdapterConfigCache`].
//! - [`ExportOptions`]: caller choices for one export invocation.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Extra packages a single field type pulls into exported projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDependencies {
    #[serde(default)]
    pub runtime_dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
}

/// Static dependency declarations shipped with the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererConfig {
    /// Packages every exported project needs.
    #[serde(default)]
    pub core_dependencies: BTreeMap<String, String>,
    /// Extra packages per field type id.
    #[serde(default)]
    pub field_dependencies: BTreeMap<String, FieldDependencies>,
    /// Released registry versions of the project's own published packages.
    #[serde(default)]
    pub published_versions: BTreeMap<String, String>,
}

impl RendererConfig {
    /// Parse a renderer config document.
    ///
    /// Published versions that are not valid semver are dropped with a
    /// warning; version rewriting later treats those packages as unpublished.
    ///
    /// # Errors
    /// Returns the underlying serde error if the document is not valid JSON
    /// or does not match the expected shape.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(text)?;
        config.sanitize_published_versions();
        Ok(config)
    }

    fn sanitize_published_versions(&mut self) {
        self.published_versions.retain(|package, version| {
            match semver::Version::parse(version) {
                Ok(_) => true,
                Err(e) => {
                    warn!(
                        package = %package,
                        version = %version,
                        error = %e,
                        "published version is not valid semver; dropping entry"
                    );
                    false
                }
            }
        });
    }
}

/// Dependency declarations for one ecosystem adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdapterDependencies {
    #[serde(default)]
    pub runtime: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev: BTreeMap<String, String>,
}

/// Per-ecosystem export declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    #[serde(default)]
    pub dependencies: AdapterDependencies,
    /// Map of `"package@version"` to patch file name, for ecosystem SDK
    /// packages that need source patches in exported projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patched_dependencies: Option<BTreeMap<String, String>>,
}

impl AdapterConfig {
    /// Whether this adapter declares any source patches.
    #[must_use]
    pub fn has_patches(&self) -> bool {
        self.patched_dependencies
            .as_ref()
            .is_some_and(|p| !p.is_empty())
    }
}

/// Raw adapter-config JSON per ecosystem id, as discovered by the caller.
pub type AdapterConfigTable = BTreeMap<String, String>;

/// Parse-once cache over [`AdapterConfigTable`].
///
/// Both outcomes are cached: a parsed config, and `None` for ecosystems whose
/// config is absent or fails validation. Repeated lookups for the same
/// ecosystem never re-parse, so the warning for a broken config is logged
/// once per process.
#[derive(Debug, Default)]
pub struct AdapterConfigCache {
    raw: AdapterConfigTable,
    entries: RwLock<HashMap<String, Option<Arc<AdapterConfig>>>>,
}

impl AdapterConfigCache {
    #[must_use]
    pub fn new(raw: AdapterConfigTable) -> Self {
        Self {
            raw,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Load (or recall) the adapter config for an ecosystem.
    ///
    /// `None` means "no special dependencies or patches": the ecosystem
    /// either declares no config or declares one that does not validate.
    #[must_use]
    pub fn get(&self, ecosystem: &str) -> Option<Arc<AdapterConfig>> {
        if let Some(cached) = self.entries.read().unwrap().get(ecosystem) {
            return cached.clone();
        }

        let loaded = self.load(ecosystem);
        self.entries
            .write()
            .unwrap()
            .insert(ecosystem.to_string(), loaded.clone());
        loaded
    }

    /// Whether a lookup (positive or negative) has been cached for `ecosystem`.
    #[must_use]
    pub fn is_cached(&self, ecosystem: &str) -> bool {
        self.entries.read().unwrap().contains_key(ecosystem)
    }

    fn load(&self, ecosystem: &str) -> Option<Arc<AdapterConfig>> {
        let text = match self.raw.get(ecosystem) {
            Some(text) => text,
            None => {
                debug!(ecosystem, "no adapter config declared");
                return None;
            }
        };

        match serde_json::from_str::<AdapterConfig>(text) {
            Ok(config) => Some(Arc::new(config)),
            Err(e) => {
                warn!(
                    ecosystem,
                    error = %e,
                    "adapter config failed validation; treating as no special dependencies"
                );
                None
            }
        }
    }
}

/// Deployment environment an export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    /// Development export linked into the monorepo workspace.
    Local,
    /// Export installing from locally packed tarballs.
    Packed,
    /// Export installing published registry versions.
    #[default]
    Production,
}

impl Env {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Packed => "packed",
            Self::Production => "production",
        }
    }
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "packed" => Ok(Self::Packed),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "unknown environment '{other}' (expected local, packed, or production)"
            )),
        }
    }
}

/// Caller choices for one export invocation.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Target environment.
    pub env: Env,
    /// Project name override; defaults to a slug of the function id.
    pub project_name: Option<String>,
    /// Description override.
    pub description: Option<String>,
    /// Author recorded in package.json.
    pub author: Option<String>,
    /// License recorded in package.json.
    pub license: Option<String>,
    /// Explicit dependency overrides; these win over every merged source.
    pub dependencies: BTreeMap<String, String>,
    /// Tarball path per published package name, for packed exports.
    pub packed_tarballs: BTreeMap<String, String>,
}

impl ExportOptions {
    #[must_use]
    pub fn new(env: Env) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    /// Set the project name.
    #[must_use]
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Set the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the license.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Add a dependency override.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.dependencies.insert(name.into(), range.into());
        self
    }

    /// Register a packed tarball for a published package.
    #[must_use]
    pub fn with_packed_tarball(
        mut self,
        package: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.packed_tarballs.insert(package.into(), path.into());
        self
    }
}
