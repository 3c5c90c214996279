//! Export summary manifest.
//!
//! A machine-readable record of what one export produced, for CLI output
//! and for callers that archive or diff exports.

use serde::Serialize;

use crate::version::MANIFEST_SCHEMA_VERSION;

/// Summary of one export run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    /// Manifest format version.
    pub schema_version: u32,
    /// Final project name written to package.json.
    pub project_name: String,
    /// Ecosystem the export targets.
    pub ecosystem: String,
    /// Network id the export targets.
    pub network: String,
    /// Environment the export was resolved for.
    pub env: String,
    /// Number of files in the output tree.
    pub file_count: usize,
    /// Number of runtime dependencies in the final package.json.
    pub dependency_count: usize,
    /// Number of dev dependencies in the final package.json.
    pub dev_dependency_count: usize,
    /// `pnpm.patchedDependencies` keys applied to the project.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<String>,
    /// Declared patch files that were missing from the content set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_patches: Vec<String>,
    /// BLAKE3 fingerprint over every output path and byte.
    pub fingerprint: String,
}

impl ExportManifest {
    /// Empty manifest shell with the current schema version; the pipeline
    /// fills in the counts.
    #[must_use]
    pub fn new(project_name: String, ecosystem: String, network: String, env: String) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            project_name,
            ecosystem,
            network,
            env,
            file_count: 0,
            dependency_count: 0,
            dev_dependency_count: 0,
            patches: Vec::new(),
            skipped_patches: Vec::new(),
            fingerprint: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serializes_camel_case() {
        let mut manifest = ExportManifest::new(
            "transfer-form".to_string(),
            "evm".to_string(),
            "ethereum-mainnet".to_string(),
            "production".to_string(),
        );
        manifest.file_count = 12;
        manifest.fingerprint = "abc123".to_string();

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["schemaVersion"], MANIFEST_SCHEMA_VERSION);
        assert_eq!(json["projectName"], "transfer-form");
        assert_eq!(json["fileCount"], 12);
        // Empty patch lists are omitted
        assert!(json.get("patches").is_none());
        assert!(json.get("skippedPatches").is_none());
    }

    #[test]
    fn test_manifest_includes_patches_when_present() {
        let mut manifest = ExportManifest::new(
            "x".to_string(),
            "stellar".to_string(),
            "stellar-testnet".to_string(),
            "packed".to_string(),
        );
        manifest.patches.push("some-sdk@1.2.3".to_string());
        manifest.skipped_patches.push("missing.patch".to_string());

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["patches"][0], "some-sdk@1.2.3");
        assert_eq!(json["skippedPatches"][0], "missing.patch");
    }
}
