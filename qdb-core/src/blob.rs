//! Blob - Opaque binary content under an alias

use bytes::Bytes;

use crate::alias;
use crate::connection::Cluster;
use crate::entry::{EntryType, Expirable};
use crate::error::Result;
use crate::expiry::ExpiryTime;

/// Handle on a blob entry.
#[derive(Debug, Clone)]
pub struct Blob<'c> {
    cluster: &'c Cluster,
    alias: String,
}

impl<'c> Blob<'c> {
    pub(crate) fn new(cluster: &'c Cluster, alias: String) -> Self {
        Self { cluster, alias }
    }

    /// Create or overwrite the blob, without expiry.
    ///
    /// # Errors
    /// `ReservedAlias`, `InvalidArgument`, `ClosedConnection`, then
    /// `IncompatibleType` if the alias holds another type.
    pub fn put(&self, content: &[u8]) -> Result<()> {
        self.put_with_expiry(content, ExpiryTime::Never)
    }

    /// Create or overwrite the blob with an expiry.
    ///
    /// # Errors
    /// See [`Blob::put`]. `InvalidArgument` if `expiry` has already passed.
    pub fn put_with_expiry(&self, content: &[u8], expiry: ExpiryTime) -> Result<()> {
        alias::validate_mutable(&self.alias)?;
        self.cluster.call("blob_put", &self.alias, |t| {
            t.blob_put(&self.alias, content, expiry)
        })
    }

    /// Read the blob content.
    ///
    /// # Errors
    /// `ClosedConnection`, `InvalidArgument`, `AliasNotFound`, or
    /// `IncompatibleType`.
    pub fn get(&self) -> Result<Bytes> {
        self.cluster.ensure_open()?;
        alias::validate(&self.alias)?;
        self.cluster
            .call("blob_get", &self.alias, |t| t.blob_get(&self.alias))
    }

    /// The type tag this handle expects.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::Blob
    }
}

impl Expirable for Blob<'_> {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn cluster(&self) -> &Cluster {
        self.cluster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, QdbError};
    use crate::transport::{Endpoint, SimCluster};

    fn connect(sim: &SimCluster) -> Cluster {
        Cluster::connect("qdb://127.0.0.1:2836", sim).unwrap()
    }

    fn sim() -> SimCluster {
        SimCluster::single(Endpoint::new("127.0.0.1", 2836))
    }

    #[test]
    fn test_put_get_overwrite() {
        let sim = sim();
        let cluster = connect(&sim);
        let blob = cluster.blob("b");

        blob.put(b"first").unwrap();
        assert_eq!(blob.get().unwrap(), Bytes::from_static(b"first"));

        blob.put(b"second").unwrap();
        assert_eq!(blob.get().unwrap(), Bytes::from_static(b"second"));
    }

    #[test]
    fn test_get_missing() {
        let sim = sim();
        let cluster = connect(&sim);
        let err = cluster.blob("missing").get().unwrap_err();
        assert!(matches!(err, QdbError::AliasNotFound { ref alias } if alias == "missing"));
    }

    #[test]
    fn test_put_over_hash_set_is_incompatible() {
        let sim = sim();
        let cluster = connect(&sim);
        cluster.hash_set("s").insert(b"x").unwrap();

        let err = cluster.blob("s").put(b"x").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IncompatibleType);
        assert!(cluster.hash_set("s").contains(b"x").unwrap());
    }

    #[test]
    fn test_put_reserved_even_when_closed() {
        let sim = sim();
        let cluster = connect(&sim);
        cluster.close();
        let err = cluster.blob("qdb").put(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReservedAlias);
    }

    #[test]
    fn test_put_with_expiry_round_trip() {
        let sim = sim();
        let cluster = connect(&sim);
        let blob = cluster.blob("b");
        let expiry = ExpiryTime::minutes_from_now(5).unwrap();

        blob.put_with_expiry(b"v", expiry).unwrap();

        assert_eq!(blob.expiry_time().unwrap(), expiry);
    }
}
