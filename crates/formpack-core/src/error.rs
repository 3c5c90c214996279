//! Export pipeline error types.

use std::fmt;

/// Export error codes.
pub mod codes {
    pub const EXPORT_CORE_SOURCE_MISSING: &str = "EXPORT_CORE_SOURCE_MISSING";
    pub const EXPORT_UNSUPPORTED_ECOSYSTEM: &str = "EXPORT_UNSUPPORTED_ECOSYSTEM";
    pub const EXPORT_PACKAGE_JSON_INVALID: &str = "EXPORT_PACKAGE_JSON_INVALID";
    pub const EXPORT_INDEX_PARSE_FAILED: &str = "EXPORT_INDEX_PARSE_FAILED";
}

/// Export pipeline error.
///
/// Only unrecoverable conditions surface here; degraded inputs (missing
/// patch files, invalid adapter configs, formatter failures) are logged
/// and worked around instead.
#[derive(Debug)]
pub struct ExportError {
    code: &'static str,
    message: String,
}

impl ExportError {
    /// Create a new error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a missing shared-source error.
    #[must_use]
    pub fn core_source_missing(path: &str) -> Self {
        Self::new(
            codes::EXPORT_CORE_SOURCE_MISSING,
            format!("Required shared source missing from content set: {path}"),
        )
    }

    /// Create an unsupported ecosystem error.
    #[must_use]
    pub fn unsupported_ecosystem(ecosystem: &str) -> Self {
        Self::new(
            codes::EXPORT_UNSUPPORTED_ECOSYSTEM,
            format!("No adapter sources registered for ecosystem: {ecosystem}"),
        )
    }

    /// Create a package.json invalid error.
    pub fn package_json_invalid(msg: impl Into<String>) -> Self {
        Self::new(codes::EXPORT_PACKAGE_JSON_INVALID, msg)
    }

    /// Create an adapter index parse error.
    pub fn index_parse_failed(msg: impl Into<String>) -> Self {
        Self::new(codes::EXPORT_INDEX_PARSE_FAILED, msg)
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ExportError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        let err = ExportError::unsupported_ecosystem("dogecoin");
        assert_eq!(err.code(), codes::EXPORT_UNSUPPORTED_ECOSYSTEM);
        assert!(err.to_string().contains(codes::EXPORT_UNSUPPORTED_ECOSYSTEM));
        assert!(err.to_string().contains("dogecoin"));
    }

    #[test]
    fn test_error_names_the_missing_source() {
        let err = ExportError::core_source_missing("lib/contract-schema.ts");
        assert_eq!(err.code(), codes::EXPORT_CORE_SOURCE_MISSING);
        assert!(err.message().contains("lib/contract-schema.ts"));
    }

    #[test]
    fn test_error_codes_uppercase() {
        let all_codes = [
            codes::EXPORT_CORE_SOURCE_MISSING,
            codes::EXPORT_UNSUPPORTED_ECOSYSTEM,
            codes::EXPORT_PACKAGE_JSON_INVALID,
            codes::EXPORT_INDEX_PARSE_FAILED,
        ];

        for code in all_codes {
            assert!(
                code.chars().all(|c| c.is_uppercase() || c == '_'),
                "Error code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }
}
