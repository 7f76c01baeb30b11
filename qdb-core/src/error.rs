//! Error taxonomy
//!
//! TigerStyle: One flat error enum, the hierarchy lives in [`ErrorKind`].
//!
//! ```text
//! Precondition  ClosedConnection, AliasNotFound, ReservedAlias,
//!               IncompatibleType, InvalidArgument
//! RemoteSystem  RemoteSystem, Connection
//!   └─ UnexpectedReply
//! ```
//!
//! Callers match on the variant, or ask [`QdbError::is`] when they care
//! about the tier rather than the exact failure.

use crate::entry::EntryType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QdbError>;

// =============================================================================
// Error
// =============================================================================

/// Every failure an operation can report.
#[derive(Debug, thiserror::Error)]
pub enum QdbError {
    /// Operation attempted after the connection was closed.
    #[error("connection is closed")]
    ClosedConnection,

    /// The alias does not exist remotely (or has expired).
    #[error("alias not found: {alias}")]
    AliasNotFound {
        /// Offending alias
        alias: String,
    },

    /// Mutation attempted against an alias reserved by the store.
    #[error("alias is reserved: {alias}")]
    ReservedAlias {
        /// Offending alias
        alias: String,
    },

    /// The alias holds an entry of another type.
    #[error("incompatible type for alias {alias}: expected {expected}, found {actual}")]
    IncompatibleType {
        /// Offending alias
        alias: String,
        /// Type the operation needs
        expected: EntryType,
        /// Type the alias actually holds
        actual: EntryType,
    },

    /// Argument rejected before reaching the store.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The endpoint could not be reached.
    #[error("cannot connect to {endpoint}: {reason}")]
    Connection {
        /// Endpoint that was dialled
        endpoint: String,
        /// Transport-level reason
        reason: String,
    },

    /// The remote host failed on its own account.
    #[error("remote system error: {message}")]
    RemoteSystem {
        /// Message reported by the remote host
        message: String,
    },

    /// The remote reply could not be interpreted.
    #[error("unexpected reply: {message}")]
    UnexpectedReply {
        /// What was wrong with the reply
        message: String,
        /// Decoder failure, when there was one
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl QdbError {
    /// Build an `AliasNotFound` error.
    pub fn alias_not_found(alias: impl Into<String>) -> Self {
        Self::AliasNotFound {
            alias: alias.into(),
        }
    }

    /// Build a `ReservedAlias` error.
    pub fn reserved_alias(alias: impl Into<String>) -> Self {
        Self::ReservedAlias {
            alias: alias.into(),
        }
    }

    /// Build a `RemoteSystem` error.
    pub fn remote_system(message: impl Into<String>) -> Self {
        Self::RemoteSystem {
            message: message.into(),
        }
    }

    /// Build an `UnexpectedReply` error without a decoder cause.
    pub fn unexpected_reply(message: impl Into<String>) -> Self {
        Self::UnexpectedReply {
            message: message.into(),
            source: None,
        }
    }

    /// The flat kind tag of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClosedConnection => ErrorKind::ClosedConnection,
            Self::AliasNotFound { .. } => ErrorKind::AliasNotFound,
            Self::ReservedAlias { .. } => ErrorKind::ReservedAlias,
            Self::IncompatibleType { .. } => ErrorKind::IncompatibleType,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::RemoteSystem { .. } => ErrorKind::RemoteSystem,
            Self::UnexpectedReply { .. } => ErrorKind::UnexpectedReply,
        }
    }

    /// Whether this error is-a `kind`, following the taxonomy.
    ///
    /// `UnexpectedReply` is a `RemoteSystem` error, so
    /// `err.is(ErrorKind::RemoteSystem)` holds for both.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind().is_a(kind)
    }

    /// The tier this error belongs to.
    #[must_use]
    pub fn tier(&self) -> ErrorTier {
        self.kind().tier()
    }
}

// =============================================================================
// Kinds and tiers
// =============================================================================

/// Flat error kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`QdbError::ClosedConnection`]
    ClosedConnection,
    /// See [`QdbError::AliasNotFound`]
    AliasNotFound,
    /// See [`QdbError::ReservedAlias`]
    ReservedAlias,
    /// See [`QdbError::IncompatibleType`]
    IncompatibleType,
    /// See [`QdbError::InvalidArgument`]
    InvalidArgument,
    /// See [`QdbError::Connection`]
    Connection,
    /// See [`QdbError::RemoteSystem`]
    RemoteSystem,
    /// See [`QdbError::UnexpectedReply`]
    UnexpectedReply,
}

impl ErrorKind {
    /// The parent kind, if this kind specialises another one.
    #[must_use]
    pub fn parent(self) -> Option<ErrorKind> {
        match self {
            Self::UnexpectedReply | Self::Connection => Some(Self::RemoteSystem),
            _ => None,
        }
    }

    /// Whether `self` equals `other` or specialises it.
    #[must_use]
    pub fn is_a(self, other: ErrorKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Tier of this kind.
    #[must_use]
    pub fn tier(self) -> ErrorTier {
        match self {
            Self::ClosedConnection
            | Self::AliasNotFound
            | Self::ReservedAlias
            | Self::IncompatibleType
            | Self::InvalidArgument => ErrorTier::Precondition,
            Self::Connection | Self::RemoteSystem => ErrorTier::RemoteSystem,
            Self::UnexpectedReply => ErrorTier::Protocol,
        }
    }
}

/// Coarse classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTier {
    /// Deterministic precondition failure
    Precondition,
    /// The remote host's own environment failed
    RemoteSystem,
    /// The remote reply could not be interpreted
    Protocol,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_reply_is_remote_system() {
        let err = QdbError::unexpected_reply("truncated frame");
        assert_eq!(err.kind(), ErrorKind::UnexpectedReply);
        assert!(err.is(ErrorKind::UnexpectedReply));
        assert!(err.is(ErrorKind::RemoteSystem));
        assert_eq!(err.tier(), ErrorTier::Protocol);
    }

    #[test]
    fn test_remote_system_is_not_unexpected_reply() {
        let err = QdbError::remote_system("out of memory");
        assert!(err.is(ErrorKind::RemoteSystem));
        assert!(!err.is(ErrorKind::UnexpectedReply));
        assert_eq!(err.tier(), ErrorTier::RemoteSystem);
    }

    #[test]
    fn test_precondition_kinds() {
        let errors = [
            QdbError::ClosedConnection,
            QdbError::alias_not_found("a"),
            QdbError::reserved_alias("qdb"),
            QdbError::IncompatibleType {
                alias: "a".to_string(),
                expected: EntryType::HashSet,
                actual: EntryType::Blob,
            },
            QdbError::InvalidArgument("empty alias".to_string()),
        ];
        for err in &errors {
            assert_eq!(err.tier(), ErrorTier::Precondition, "{err}");
            assert!(!err.is(ErrorKind::RemoteSystem), "{err}");
        }
    }

    #[test]
    fn test_connection_is_remote_system() {
        let err = QdbError::Connection {
            endpoint: "127.0.0.1:1".to_string(),
            reason: "refused".to_string(),
        };
        assert!(err.is(ErrorKind::RemoteSystem));
        assert!(!err.is(ErrorKind::UnexpectedReply));
    }

    #[test]
    fn test_display_messages() {
        let err = QdbError::IncompatibleType {
            alias: "foo".to_string(),
            expected: EntryType::HashSet,
            actual: EntryType::Blob,
        };
        assert_eq!(
            err.to_string(),
            "incompatible type for alias foo: expected hash_set, found blob"
        );
        assert_eq!(QdbError::ClosedConnection.to_string(), "connection is closed");
    }
}
