//! Identifier case conversion for generated code and package names.

/// Convert an identifier to PascalCase.
///
/// Segments are split on `-`, `_`, and whitespace; the first ASCII letter of
/// each segment is uppercased. Used to derive adapter class names from
/// ecosystem ids (`"evm"` becomes `"Evm"`, `"my-chain"` becomes `"MyChain"`).
#[must_use]
pub fn pascal_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for segment in input.split(|c: char| c == '-' || c == '_' || c.is_whitespace()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Convert free-form text to a package-name slug.
///
/// Lowercases the input and collapses every run of characters that are not
/// ASCII alphanumerics into a single `-`, trimming leading and trailing
/// separators. The result is safe to use as (part of) an npm package name.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_sep = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case_single_segment() {
        assert_eq!(pascal_case("evm"), "Evm");
        assert_eq!(pascal_case("stellar"), "Stellar");
    }

    #[test]
    fn test_pascal_case_multi_segment() {
        assert_eq!(pascal_case("my-chain"), "MyChain");
        assert_eq!(pascal_case("my_chain id"), "MyChainId");
    }

    #[test]
    fn test_pascal_case_empty() {
        assert_eq!(pascal_case(""), "");
        assert_eq!(pascal_case("--"), "");
    }

    #[test]
    fn test_slugify_camel_case_function_id() {
        assert_eq!(slugify("transferFrom"), "transferfrom");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("safe Transfer__From!"), "safe-transfer-from");
    }

    #[test]
    fn test_slugify_trims_separators() {
        assert_eq!(slugify("--mint--"), "mint");
        assert_eq!(slugify(""), "");
    }
}
