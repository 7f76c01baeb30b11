//! HashSet - A remote set of opaque byte strings
//!
//! Members are compared by exact binary equality. The set is created by
//! its first insert.

use crate::alias;
use crate::connection::Cluster;
use crate::entry::{EntryType, Expirable};
use crate::error::Result;

/// Handle on a hash set entry.
#[derive(Debug, Clone)]
pub struct HashSet<'c> {
    cluster: &'c Cluster,
    alias: String,
}

impl<'c> HashSet<'c> {
    pub(crate) fn new(cluster: &'c Cluster, alias: String) -> Self {
        Self { cluster, alias }
    }

    /// Add `content`. Returns true iff it was not already a member.
    ///
    /// # Errors
    /// `ReservedAlias` (checked first, locally), `InvalidArgument`,
    /// `ClosedConnection`, then `IncompatibleType` if the alias holds
    /// another type. No mutation happens on error.
    pub fn insert(&self, content: &[u8]) -> Result<bool> {
        alias::validate_mutable(&self.alias)?;
        self.cluster.call("hset_insert", &self.alias, |t| {
            t.hset_insert(&self.alias, content)
        })
    }

    /// Remove `content`. Returns true iff it was a member.
    ///
    /// # Errors
    /// As [`HashSet::insert`], plus `AliasNotFound` if the set does not exist.
    pub fn erase(&self, content: &[u8]) -> Result<bool> {
        alias::validate_mutable(&self.alias)?;
        self.cluster.call("hset_erase", &self.alias, |t| {
            t.hset_erase(&self.alias, content)
        })
    }

    /// Whether `content` is a member.
    ///
    /// # Errors
    /// `ClosedConnection`, `InvalidArgument`, `AliasNotFound`, or
    /// `IncompatibleType`.
    pub fn contains(&self, content: &[u8]) -> Result<bool> {
        self.cluster.ensure_open()?;
        alias::validate(&self.alias)?;
        self.cluster.call("hset_contains", &self.alias, |t| {
            t.hset_contains(&self.alias, content)
        })
    }

    /// The type tag this handle expects.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::HashSet
    }
}

impl Expirable for HashSet<'_> {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn cluster(&self) -> &Cluster {
        self.cluster
    }
}
