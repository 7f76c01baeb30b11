//! Transport - The native call surface
//!
//! TigerStyle: Abstract transport with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Cluster / entries / Node                      │
//! │        (local preconditions, Status → QdbError mapping)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Connector + Transport traits                 │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │   SimCluster    │           │ native library  │
//! │   (testing)     │           │ (per Platform)  │
//! └─────────────────┘           └─────────────────┘
//! ```
//!
//! Every call is synchronous: request in, value or [`Status`] out.

mod platform;
mod sim;

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::constants::{HOST_DEFAULT, PORT_DEFAULT, URI_SCHEME};
use crate::entry::EntryType;
use crate::error::QdbError;
use crate::expiry::ExpiryTime;

pub use platform::{Arch, OsFamily, Platform};
pub use sim::{Fault, SimCluster, SimEntry, SimSnapshot, SimTransport};

/// Result of a single remote call.
pub type CallResult<T> = std::result::Result<T, Status>;

// =============================================================================
// Status
// =============================================================================

/// Failure codes reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The alias does not exist
    AliasNotFound,
    /// The alias is reserved
    ReservedAlias,
    /// The alias holds another entry type
    IncompatibleType {
        /// Type the call needed
        expected: EntryType,
        /// Type actually stored
        actual: EntryType,
    },
    /// The request carried an argument the store rejects
    InvalidArgument(String),
    /// The session was closed
    ConnectionClosed,
    /// The endpoint refused or could not be reached
    ConnectionRefused(String),
    /// The remote host failed
    System(String),
    /// The reply could not be decoded
    UnexpectedReply(String),
}

impl Status {
    /// Map to the public error, attaching endpoint and alias context.
    #[must_use]
    pub fn into_error(self, endpoint: &Endpoint, alias: &str) -> QdbError {
        match self {
            Self::AliasNotFound => QdbError::alias_not_found(alias),
            Self::ReservedAlias => QdbError::reserved_alias(alias),
            Self::IncompatibleType { expected, actual } => QdbError::IncompatibleType {
                alias: alias.to_string(),
                expected,
                actual,
            },
            Self::InvalidArgument(message) => QdbError::InvalidArgument(message),
            Self::ConnectionClosed => QdbError::ClosedConnection,
            Self::ConnectionRefused(reason) => QdbError::Connection {
                endpoint: endpoint.to_string(),
                reason,
            },
            Self::System(message) => QdbError::remote_system(message),
            Self::UnexpectedReply(message) => QdbError::unexpected_reply(message),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AliasNotFound => write!(f, "alias not found"),
            Self::ReservedAlias => write!(f, "reserved alias"),
            Self::IncompatibleType { expected, actual } => {
                write!(f, "incompatible type (expected {expected}, found {actual})")
            }
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::ConnectionClosed => write!(f, "connection closed"),
            Self::ConnectionRefused(reason) => write!(f, "connection refused: {reason}"),
            Self::System(message) => write!(f, "system error: {message}"),
            Self::UnexpectedReply(message) => write!(f, "unexpected reply: {message}"),
        }
    }
}

// =============================================================================
// Endpoint
// =============================================================================

/// A daemon address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name or IP address
    pub host: String,
    /// Listening port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint.
    ///
    /// # Panics
    /// Panics if host is empty.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        assert!(!host.is_empty(), "host cannot be empty");
        Self { host, port }
    }

    /// Parse `qdb://host:port`, `host:port` or `host`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a malformed URI.
    pub fn parse(uri: &str) -> Result<Self, QdbError> {
        let rest = uri.strip_prefix(URI_SCHEME).unwrap_or(uri);
        if rest.is_empty() || rest.contains("://") || rest.contains('/') {
            return Err(QdbError::InvalidArgument(format!("invalid uri: {uri:?}")));
        }

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    QdbError::InvalidArgument(format!("invalid port in uri: {uri:?}"))
                })?;
                (host, port)
            }
            None => (rest, PORT_DEFAULT),
        };

        let host = if host.is_empty() { HOST_DEFAULT } else { host };
        Ok(Self::new(host, port))
    }
}

impl FromStr for Endpoint {
    type Err = QdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Opens transport sessions.
pub trait Connector: Send + Sync {
    /// Open a session to `endpoint`.
    ///
    /// # Errors
    /// `Status::ConnectionRefused` when the endpoint cannot be reached.
    fn connect(&self, endpoint: &Endpoint) -> CallResult<Box<dyn Transport>>;
}

/// One live session to the cluster.
///
/// Implementations must be safe to call from several threads at once and
/// must fail with `Status::ConnectionClosed` after [`Transport::close`].
pub trait Transport: Send + Sync {
    /// Type of the entry stored under `alias`, or `None`.
    fn entry_type(&self, alias: &str) -> CallResult<Option<EntryType>>;

    /// Read the expiry of an existing entry.
    fn get_expiry(&self, alias: &str) -> CallResult<ExpiryTime>;

    /// Set the expiry of an existing entry.
    fn set_expiry(&self, alias: &str, expiry: ExpiryTime) -> CallResult<()>;

    /// Remove an entry of any type.
    fn remove(&self, alias: &str) -> CallResult<()>;

    /// Create or overwrite a blob.
    fn blob_put(&self, alias: &str, content: &[u8], expiry: ExpiryTime) -> CallResult<()>;

    /// Read a blob.
    fn blob_get(&self, alias: &str) -> CallResult<Bytes>;

    /// Add to a hash set, creating it if needed. True if newly added.
    fn hset_insert(&self, alias: &str, content: &[u8]) -> CallResult<bool>;

    /// Remove from a hash set. True if it was present.
    fn hset_erase(&self, alias: &str, content: &[u8]) -> CallResult<bool>;

    /// Membership test on a hash set.
    fn hset_contains(&self, alias: &str, content: &[u8]) -> CallResult<bool>;

    /// Raw configuration document of the node at `endpoint`.
    fn node_config(&self, endpoint: &Endpoint) -> CallResult<String>;

    /// End the session.
    fn close(&self);
}

// =============================================================================
// Tests
// =============================================================================
