//! Version strategy for the project's own published packages.
//!
//! Exported projects depend on the renderer, the shared types, and one
//! ecosystem adapter package. What version specifier those dependencies get
//! is purely a function of the target environment.

use std::collections::BTreeMap;

use tracing::warn;

use crate::config::Env;

/// Workspace protocol specifier used for monorepo-linked exports.
pub const WORKSPACE_SPEC: &str = "workspace:*";

/// Caret range for a published version.
#[must_use]
pub fn caret_range(version: &str) -> String {
    format!("^{version}")
}

/// Resolve the dependency specifier for one self-published package.
///
/// # Rules
/// - `local`: always `workspace:*`, regardless of published version
/// - `packed`: `file:<tarball>` from the registered tarball map; a missing
///   tarball falls back to the production specifier with a warning
/// - `production`: `^<published_version>`
///
/// Pure apart from the fallback warning: identical arguments always produce
/// identical output, and nothing is read from the environment.
#[must_use]
pub fn resolve_version(
    package: &str,
    published_version: &str,
    env: Env,
    tarballs: &BTreeMap<String, String>,
) -> String {
    match env {
        Env::Local => WORKSPACE_SPEC.to_string(),
        Env::Packed => match tarballs.get(package) {
            Some(path) => format!("file:{path}"),
            None => {
                warn!(
                    package,
                    "no packed tarball registered; falling back to published version"
                );
                caret_range(published_version)
            }
        },
        Env::Production => caret_range(published_version),
    }
}
