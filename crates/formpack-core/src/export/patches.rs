//! Source patch assembly for ecosystem SDK dependencies.
//!
//! Some ecosystem SDKs ship bugs the adapters patch around. Adapter configs
//! declare `"package@version" -> patch file name`; this module copies the
//! referenced patch files into the export and produces the entries the
//! package.json `pnpm.patchedDependencies` block needs.
//!
//! A declared patch whose file cannot be found is skipped with a warning.
//! One missing patch must not sink an otherwise valid export.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AdapterConfig, Env};
use crate::filemap::FileMap;

/// Directory inside exported projects that holds patch files.
const PATCH_DIR: &str = "patches";

/// Discovered patch file contents, keyed by their content-set path.
#[derive(Debug, Clone, Default)]
pub struct PatchStore {
    entries: BTreeMap<String, String>,
}

impl PatchStore {
    #[must_use]
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Find patch content by file name.
    ///
    /// Adapter configs declare bare file names while the store is keyed by
    /// discovery paths, so matching compares the final path segment.
    #[must_use]
    pub fn find(&self, file_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(path, _)| {
                path.as_str() == file_name || path.ends_with(&format!("/{file_name}"))
            })
            .map(|(_, content)| content.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One assembled patch, ready for the pnpm config block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchRecord {
    /// `pnpm.patchedDependencies` key. Usually the declared
    /// `"package@version"`; packed exports of a tarball-installed package
    /// use the bare package name instead, since the tarball install carries
    /// no registry version for the key to pin.
    pub dependency: String,
    /// Output-relative path of the copied patch file.
    pub path: String,
}

/// Result of assembling one adapter's patches.
#[derive(Debug, Clone, Default)]
pub struct PatchOutcome {
    /// Entries to inject into `pnpm.patchedDependencies`.
    pub records: Vec<PatchRecord>,
    /// Patch file names that were declared but not found.
    pub skipped: Vec<String>,
}

/// Copy an adapter's declared patches into `files`.
///
/// Additive only: pre-existing entries are never overwritten. Two declared
/// dependencies may share one patch file; the second copy is skipped and
/// both still get a record.
#[must_use]
pub fn assemble_patches(
    ecosystem: &str,
    config: &AdapterConfig,
    store: &PatchStore,
    env: Env,
    tarballs: &BTreeMap<String, String>,
    files: &mut FileMap,
) -> PatchOutcome {
    let mut outcome = PatchOutcome::default();
    let Some(declared) = &config.patched_dependencies else {
        return outcome;
    };

    for (dependency_key, patch_name) in declared {
        let Some(content) = store.find(patch_name) else {
            warn!(
                ecosystem,
                dependency = %dependency_key,
                patch = %patch_name,
                "declared patch file not found; skipping"
            );
            outcome.skipped.push(patch_name.clone());
            continue;
        };

        let output_path = format!("{PATCH_DIR}/{patch_name}");
        if !files.insert_new(output_path.clone(), content.into()) {
            debug!(path = %output_path, "patch already staged; keeping existing entry");
        }

        outcome.records.push(PatchRecord {
            dependency: patched_dependency_key(dependency_key, env, tarballs),
            path: output_path,
        });
    }

    outcome
}

/// Rewrite a `"package@version"` key for the target environment.
///
/// Packed exports install the package from a tarball, so the pinned version
/// in the key would never match; pnpm then wants the bare package name.
fn patched_dependency_key(key: &str, env: Env, tarballs: &BTreeMap<String, String>) -> String {
    if env != Env::Packed {
        return key.to_string();
    }
    let (name, _) = split_dependency_key(key);
    if tarballs.contains_key(name) {
        name.to_string()
    } else {
        key.to_string()
    }
}

/// Split `"package@version"` into name and version, handling scoped names
/// (`"@scope/pkg@1.2.3"`).
fn split_dependency_key(key: &str) -> (&str, Option<&str>) {
    match key.rfind('@') {
        Some(0) | None => (key, None),
        Some(idx) => (&key[..idx], Some(&key[idx + 1..])),
    }
}
