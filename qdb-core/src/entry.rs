//! Entries - Client handles on named remote objects
//!
//! TigerStyle: Entries borrow their [`Cluster`] and own nothing remote.
//! Every operation re-validates its preconditions; nothing is cached.
//!
//! # Precondition order
//!
//! ```text
//! reads / expiry:  closed → alias shape → remote (AliasNotFound)
//! mutations:       reserved → alias shape → closed → remote (IncompatibleType)
//! ```

use serde::{Deserialize, Serialize};

use crate::alias;
use crate::connection::Cluster;
use crate::error::Result;
use crate::expiry::ExpiryTime;

// =============================================================================
// Entry Type
// =============================================================================

/// The type tag of a remote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Opaque binary content
    Blob,
    /// Set of opaque binary members
    HashSet,
}

impl EntryType {
    /// Get string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::HashSet => "hash_set",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Expirable
// =============================================================================

/// Capabilities shared by every entry kind.
pub trait Expirable {
    /// The alias this entry is bound to.
    fn alias(&self) -> &str;

    /// The connection this entry routes through.
    fn cluster(&self) -> &Cluster;

    /// Read the remote expiry.
    ///
    /// # Errors
    /// `ClosedConnection`, then `InvalidArgument`, then `AliasNotFound`.
    fn expiry_time(&self) -> Result<ExpiryTime> {
        let cluster = self.cluster();
        cluster.ensure_open()?;
        alias::validate(self.alias())?;
        cluster.call("get_expiry", self.alias(), |t| t.get_expiry(self.alias()))
    }

    /// Set the remote expiry. Visible to the next `expiry_time` read.
    ///
    /// # Errors
    /// `ClosedConnection`, then `InvalidArgument`, then `AliasNotFound`.
    /// An expiry that has already passed is `InvalidArgument` and leaves
    /// the entry untouched.
    fn set_expiry_time(&self, expiry: ExpiryTime) -> Result<()> {
        let cluster = self.cluster();
        cluster.ensure_open()?;
        alias::validate(self.alias())?;
        cluster.call("set_expiry", self.alias(), |t| {
            t.set_expiry(self.alias(), expiry)
        })
    }

    /// Remove the remote entry, whatever its type.
    ///
    /// # Errors
    /// `ReservedAlias`, `InvalidArgument`, `ClosedConnection`, then
    /// `AliasNotFound`.
    fn remove(&self) -> Result<()> {
        alias::validate_mutable(self.alias())?;
        self.cluster()
            .call("remove", self.alias(), |t| t.remove(self.alias()))
    }
}

// =============================================================================
// ExpirableEntry
// =============================================================================

/// An entry of unknown type.
///
/// Useful for expiry and removal when the caller does not care what
/// the alias holds.
#[derive(Debug, Clone)]
pub struct ExpirableEntry<'c> {
    cluster: &'c Cluster,
    alias: String,
}

impl<'c> ExpirableEntry<'c> {
    pub(crate) fn new(cluster: &'c Cluster, alias: String) -> Self {
        Self { cluster, alias }
    }

    /// Whether the alias currently exists remotely.
    ///
    /// # Errors
    /// `ClosedConnection`, `InvalidArgument`, or a remote failure.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.entry_type()?.is_some())
    }

    /// Type of the remote entry, or `None` if the alias is free.
    ///
    /// # Errors
    /// `ClosedConnection`, `InvalidArgument`, or a remote failure.
    pub fn entry_type(&self) -> Result<Option<EntryType>> {
        self.cluster.ensure_open()?;
        alias::validate(&self.alias)?;
        self.cluster
            .call("entry_type", &self.alias, |t| t.entry_type(&self.alias))
    }
}

impl Expirable for ExpirableEntry<'_> {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn cluster(&self) -> &Cluster {
        self.cluster
    }
}
