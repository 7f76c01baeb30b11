//! Alias rules
//!
//! TigerStyle: Purely local checks, evaluated before any remote call.

use crate::constants::{ALIAS_BYTES_MAX, RESERVED_ALIASES};
use crate::error::{QdbError, Result};

/// Whether `alias` is reserved for the store's own use.
#[must_use]
pub fn is_reserved(alias: &str) -> bool {
    RESERVED_ALIASES.contains(&alias)
}

/// Reject empty and oversized aliases.
///
/// # Errors
/// Returns `InvalidArgument` when the alias is empty or too long.
pub fn validate(alias: &str) -> Result<()> {
    if alias.is_empty() {
        return Err(QdbError::InvalidArgument("alias cannot be empty".to_string()));
    }
    if alias.len() > ALIAS_BYTES_MAX {
        return Err(QdbError::InvalidArgument(format!(
            "alias {} bytes exceeds max {}",
            alias.len(),
            ALIAS_BYTES_MAX
        )));
    }
    Ok(())
}

/// Checks for aliases about to be mutated: reserved first, then shape.
///
/// # Errors
/// Returns `ReservedAlias` or `InvalidArgument`.
pub fn validate_mutable(alias: &str) -> Result<()> {
    if is_reserved(alias) {
        return Err(QdbError::reserved_alias(alias));
    }
    validate(alias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_reserved() {
        assert!(is_reserved("qdb"));
        assert!(!is_reserved("qdbx"));
        assert!(!is_reserved("QDB"));
    }

    #[test]
    fn test_validate_mutable_order() {
        assert_eq!(
            validate_mutable("qdb").unwrap_err().kind(),
            ErrorKind::ReservedAlias
        );
        assert_eq!(
            validate_mutable("").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(validate_mutable("foo").is_ok());
    }

    #[test]
    fn test_length_limit() {
        assert!(validate(&"a".repeat(ALIAS_BYTES_MAX)).is_ok());
        assert!(validate(&"a".repeat(ALIAS_BYTES_MAX + 1)).is_err());
    }
}
