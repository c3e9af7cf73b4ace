//! Ref-name validation following git's naming rules.

use crate::error::{RefError, RefResult};

/// Characters git forbids anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Validate a branch or tag name, returning `Ok(())` if acceptable.
///
/// # Examples
///
/// ```
/// use gitgraph_refs::validate_ref_name;
///
/// assert!(validate_ref_name("main").is_ok());
/// assert!(validate_ref_name("feature/auth").is_ok());
/// assert!(validate_ref_name("bad..name").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> RefResult<()> {
    let reason = if name.is_empty() {
        Some("must not be empty".to_string())
    } else if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        Some(format!("contains forbidden character {ch:?}"))
    } else if name.contains("..") {
        Some("must not contain '..'".to_string())
    } else if name.contains("@{") {
        Some("must not contain '@{'".to_string())
    } else if name.contains("//") {
        Some("must not contain consecutive slashes".to_string())
    } else if name.starts_with(['.', '/']) || name.ends_with(['.', '/']) {
        Some("must not start or end with '.' or '/'".to_string())
    } else if name.ends_with(".lock") {
        Some("must not end with '.lock'".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RefError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_nested_names_are_valid() {
        for name in ["main", "develop", "feature/auth", "release/v1.2", "v1.0.0"] {
            assert!(validate_ref_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn invalid_names_are_rejected() {
        for name in [
            "",
            "bad..name",
            "has space",
            "tab\tname",
            "caret^",
            "colon:name",
            "glob*",
            "ends.lock",
            ".hidden",
            "trailing/",
            "a//b",
            "ref@{1}",
        ] {
            assert!(
                matches!(validate_ref_name(name), Err(RefError::InvalidName { .. })),
                "{name:?} should be rejected"
            );
        }
    }
}
