//! Thumbnail key validation.
//!
//! Keys are derived from source file names, which come straight off the
//! filesystem. A key must stay a bare file name: no separators, no traversal
//! components, nothing that could address outside the cache root.

use crate::error::{ErrorKind, Result};

/// Validates that `key` is a bare file name usable inside a cache root.
///
/// # Examples
///
/// ```
/// use vitrine_store::validate_key;
///
/// assert!(validate_key("beach.jpg").is_ok());
/// assert!(validate_key("../escape.jpg").is_err());
/// assert!(validate_key("nested/beach.jpg").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate(key: &str) -> Result<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains('\0')
    {
        exn::bail!(ErrorKind::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_file_names() {
        assert_eq!(validate("beach.jpg").unwrap(), "beach.jpg");
        assert_eq!(validate("clip.tar.jpg").unwrap(), "clip.tar.jpg");
        // Hidden files are still bare names.
        assert_eq!(validate(".hidden.png").unwrap(), ".hidden.png");
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for key in ["", " ", ".", "..", "a/b.jpg", "a\\b.jpg", "..\\up.jpg", "nul\0.jpg"] {
            assert!(validate(key).is_err(), "key {key:?} should be rejected");
        }
    }
}
