use std::fmt::Write;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version for the export manifest format.
/// Bump this when changing the manifest shape in a way consumers must detect.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("formpack {VERSION}");

    if let Some(hash) = option_env!("FORMPACK_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_empty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_version_string_contains_version() {
        let vs = version_string();
        assert!(vs.contains(VERSION));
        assert!(vs.starts_with("formpack "));
    }

    #[test]
    fn test_manifest_schema_version_positive() {
        const { assert!(MANIFEST_SCHEMA_VERSION > 0) };
    }
}
