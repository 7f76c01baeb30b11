//! Cluster - The connection handle
//!
//! TigerStyle: One explicit state word, read before every remote call.
//!
//! ```text
//! connect() ──► Open ──close()──► Closed (terminal)
//! ```
//!
//! There is no value of [`Cluster`] before `connect` succeeds, so the
//! uninitialized state is unrepresentable. The state is an atomic so a
//! `close` on one thread is seen by every other thread's next call.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::blob::Blob;
use crate::config::ClientConfig;
use crate::entry::ExpirableEntry;
use crate::error::{QdbError, Result};
use crate::hash_set::HashSet;
use crate::node::Node;
use crate::transport::{CallResult, Connector, Endpoint, Status, Transport};

// =============================================================================
// State
// =============================================================================

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Remote operations are allowed.
    Open,
    /// Terminal. Every operation fails with `ClosedConnection`.
    Closed,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            STATE_OPEN => Self::Open,
            _ => Self::Closed,
        }
    }
}

const STATE_OPEN: u8 = 1;
const STATE_CLOSED: u8 = 2;

// =============================================================================
// Cluster
// =============================================================================

/// A live session to a cluster.
///
/// Entries and nodes created from it borrow it; they stay usable as values
/// after [`Cluster::close`], but every call they make fails.
pub struct Cluster {
    endpoint: Endpoint,
    state: AtomicU8,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Cluster {
    /// Connect to the daemon at `uri` (`qdb://host:port`).
    ///
    /// # Errors
    /// `InvalidArgument` for a malformed URI, `Connection` when the
    /// endpoint cannot be reached.
    pub fn connect(uri: &str, connector: &dyn Connector) -> Result<Self> {
        let endpoint = Endpoint::parse(uri)?;
        Self::connect_endpoint(endpoint, connector)
    }

    /// Connect using a [`ClientConfig`].
    ///
    /// # Errors
    /// See [`Cluster::connect`].
    pub fn connect_with_config(config: &ClientConfig, connector: &dyn Connector) -> Result<Self> {
        Self::connect_endpoint(config.endpoint()?, connector)
    }

    /// Connect to an already-parsed endpoint.
    ///
    /// # Errors
    /// `Connection` when the endpoint cannot be reached.
    pub fn connect_endpoint(endpoint: Endpoint, connector: &dyn Connector) -> Result<Self> {
        let transport = connector.connect(&endpoint).map_err(|status| {
            let reason = match status {
                Status::ConnectionRefused(reason) => reason,
                other => other.to_string(),
            };
            tracing::debug!(endpoint = %endpoint, reason = %reason, "connect failed");
            QdbError::Connection {
                endpoint: endpoint.to_string(),
                reason,
            }
        })?;

        tracing::info!(endpoint = %endpoint, "connected");
        Ok(Self {
            endpoint,
            state: AtomicU8::new(STATE_OPEN),
            transport,
        })
    }

    /// Endpoint this connection was opened against.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether [`Cluster::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == ConnectionState::Closed
    }

    /// Close the connection. Later calls are no-ops.
    pub fn close(&self) {
        let previous = self.state.swap(STATE_CLOSED, Ordering::AcqRel);
        if previous == STATE_CLOSED {
            tracing::debug!(endpoint = %self.endpoint, "close on closed connection");
            return;
        }
        self.transport.close();
        tracing::info!(endpoint = %self.endpoint, "connection closed");
    }

    /// Handle on `alias` without a type.
    #[must_use]
    pub fn entry(&self, alias: impl Into<String>) -> ExpirableEntry<'_> {
        ExpirableEntry::new(self, alias.into())
    }

    /// Handle on the blob stored under `alias`.
    #[must_use]
    pub fn blob(&self, alias: impl Into<String>) -> Blob<'_> {
        Blob::new(self, alias.into())
    }

    /// Handle on the hash set stored under `alias`.
    #[must_use]
    pub fn hash_set(&self, alias: impl Into<String>) -> HashSet<'_> {
        HashSet::new(self, alias.into())
    }

    /// View of the node listening at `uri`.
    ///
    /// # Errors
    /// `InvalidArgument` for a malformed URI.
    pub fn node(&self, uri: &str) -> Result<Node<'_>> {
        Ok(Node::new(self, Endpoint::parse(uri)?))
    }

    /// Fail with `ClosedConnection` once closed.
    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(QdbError::ClosedConnection);
        }
        Ok(())
    }

    /// Issue one remote call on behalf of `alias`.
    pub(crate) fn call<T>(
        &self,
        op: &'static str,
        alias: &str,
        f: impl FnOnce(&dyn Transport) -> CallResult<T>,
    ) -> Result<T> {
        self.ensure_open()?;
        tracing::debug!(op, alias = %alias, "remote call");
        f(self.transport.as_ref()).map_err(|status| {
            tracing::debug!(op, alias = %alias, status = %status, "remote call failed");
            status.into_error(&self.endpoint, alias)
        })
    }
}

impl Drop for Cluster {
    fn drop(&mut self) {
        self.close();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Expirable;
    use crate::error::ErrorKind;
    use crate::transport::SimCluster;

    fn sim() -> SimCluster {
        SimCluster::single(Endpoint::new("127.0.0.1", 2836))
    }

    #[test]
    fn test_connect_and_close() {
        let sim = sim();
        let cluster = Cluster::connect("qdb://127.0.0.1:2836", &sim).unwrap();
        assert_eq!(cluster.state(), ConnectionState::Open);

        cluster.close();
        assert_eq!(cluster.state(), ConnectionState::Closed);

        // idempotent
        cluster.close();
        assert!(cluster.is_closed());
    }

    #[test]
    fn test_connect_refused() {
        let sim = sim();
        let err = Cluster::connect("qdb://127.0.0.1:1", &sim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.is(ErrorKind::RemoteSystem));
        assert!(err.to_string().contains("127.0.0.1:1"));
    }

    #[test]
    fn test_connect_bad_uri() {
        let sim = sim();
        let err = Cluster::connect("http://nowhere", &sim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_close_visible_across_threads() {
        let sim = sim();
        let cluster = Cluster::connect("qdb://127.0.0.1:2836", &sim).unwrap();
        cluster.blob("k").put(b"v").unwrap();

        std::thread::scope(|s| {
            s.spawn(|| cluster.close()).join().unwrap();
            let reader = s.spawn(|| cluster.blob("k").expiry_time());
            let err = reader.join().unwrap().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ClosedConnection);
        });
    }

    #[test]
    fn test_debug_does_not_leak_transport() {
        let sim = sim();
        let cluster = Cluster::connect("127.0.0.1:2836", &sim).unwrap();
        let debug = format!("{cluster:?}");
        assert!(debug.contains("Open"));
        assert!(debug.contains("127.0.0.1"));
    }
}
