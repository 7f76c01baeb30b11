//! SimCluster - In-memory cluster for testing
//!
//! TigerStyle: Deterministic stand-in for the native library.
//!
//! - Every connection made through one `SimCluster` sees the same entries
//! - Expiry is evaluated lazily against an injectable [`Clock`]
//! - Faults can be queued to make the next calls fail
//! - State can be snapshotted and restored as JSON

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{CallResult, Connector, Endpoint, Status, Transport};
use crate::alias::is_reserved;
use crate::clock::{Clock, SystemClock};
use crate::entry::EntryType;
use crate::error::QdbError;
use crate::expiry::ExpiryTime;

// =============================================================================
// Stored state
// =============================================================================

/// Content of a stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SimContent {
    Blob { content: Vec<u8> },
    HashSet { members: BTreeSet<Vec<u8>> },
}

impl SimContent {
    fn entry_type(&self) -> EntryType {
        match self {
            Self::Blob { .. } => EntryType::Blob,
            Self::HashSet { .. } => EntryType::HashSet,
        }
    }
}

/// A stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEntry {
    content: SimContent,
    expiry: ExpiryTime,
}

/// Serializable image of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Node endpoints as `host:port`
    pub nodes: Vec<String>,
    /// Entries by alias
    pub entries: BTreeMap<String, SimEntry>,
}

/// A failure to inject into upcoming remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The remote host reports a system error.
    System(String),
    /// The remote host answers with bytes that do not decode.
    GarbledReply,
}

#[derive(Debug, Default)]
struct SimState {
    entries: BTreeMap<String, SimEntry>,
    faults: VecDeque<Fault>,
}

impl SimState {
    /// Entry under `alias`, purging it first if it has expired.
    fn live(&mut self, alias: &str, clock: &dyn Clock) -> Option<&mut SimEntry> {
        let expired = self
            .entries
            .get(alias)
            .is_some_and(|entry| entry.expiry.has_passed(clock.now()));
        if expired {
            tracing::debug!(alias = %alias, "purging expired entry");
            self.entries.remove(alias);
        }
        self.entries.get_mut(alias)
    }
}

// =============================================================================
// SimCluster
// =============================================================================

#[derive(Debug)]
struct SimInner {
    nodes: Vec<Endpoint>,
    clock: Arc<dyn Clock>,
    state: Mutex<SimState>,
}

/// An in-memory cluster. Cloning yields another handle to the same cluster.
#[derive(Debug, Clone)]
pub struct SimCluster {
    inner: Arc<SimInner>,
}

impl SimCluster {
    /// Create a cluster with the given nodes, using wall-clock time.
    ///
    /// # Panics
    /// Panics if `nodes` is empty.
    #[must_use]
    pub fn new(nodes: Vec<Endpoint>) -> Self {
        Self::with_clock(nodes, Arc::new(SystemClock))
    }

    /// Create a single-node cluster.
    #[must_use]
    pub fn single(endpoint: Endpoint) -> Self {
        Self::new(vec![endpoint])
    }

    /// Create a cluster driven by `clock`.
    ///
    /// # Panics
    /// Panics if `nodes` is empty.
    #[must_use]
    pub fn with_clock(nodes: Vec<Endpoint>, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(nodes, clock, BTreeMap::new())
    }

    /// Restore a cluster from a snapshot.
    ///
    /// Unparseable node addresses are skipped with a warning.
    ///
    /// # Errors
    /// `InvalidArgument` if no node address in the snapshot parses.
    pub fn from_snapshot(snapshot: SimSnapshot, clock: Arc<dyn Clock>) -> Result<Self, QdbError> {
        let nodes: Vec<Endpoint> = snapshot
            .nodes
            .iter()
            .filter_map(|node| match Endpoint::parse(node) {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    tracing::warn!(node = %node, error = %e, "skipping node in snapshot");
                    None
                }
            })
            .collect();
        if nodes.is_empty() {
            return Err(QdbError::InvalidArgument(format!(
                "snapshot has no usable node among {:?}",
                snapshot.nodes
            )));
        }
        Ok(Self::from_parts(nodes, clock, snapshot.entries))
    }

    fn from_parts(
        nodes: Vec<Endpoint>,
        clock: Arc<dyn Clock>,
        entries: BTreeMap<String, SimEntry>,
    ) -> Self {
        // Precondition
        assert!(!nodes.is_empty(), "cluster needs at least one node");

        Self {
            inner: Arc::new(SimInner {
                nodes,
                clock,
                state: Mutex::new(SimState {
                    entries,
                    faults: VecDeque::new(),
                }),
            }),
        }
    }

    /// Node endpoints.
    #[must_use]
    pub fn nodes(&self) -> &[Endpoint] {
        &self.inner.nodes
    }

    /// Make the next `count` remote calls fail with `fault`.
    pub fn inject_fault(&self, fault: Fault, count: usize) {
        let mut state = self.state();
        state
            .faults
            .extend(std::iter::repeat(fault).take(count));
    }

    /// Number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        let now = self.inner.clock.now();
        self.state()
            .entries
            .values()
            .filter(|entry| !entry.expiry.has_passed(now))
            .count()
    }

    /// Whether a live entry exists under `alias`.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.state().live(alias, self.inner.clock.as_ref()).is_some()
    }

    /// Capture the current state, dropping expired entries.
    #[must_use]
    pub fn snapshot(&self) -> SimSnapshot {
        let now = self.inner.clock.now();
        let entries = self
            .state()
            .entries
            .iter()
            .filter(|(_, entry)| !entry.expiry.has_passed(now))
            .map(|(alias, entry)| (alias.clone(), entry.clone()))
            .collect();
        SimSnapshot {
            nodes: self.inner.nodes.iter().map(ToString::to_string).collect(),
            entries,
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` against the state unless a fault is pending.
    fn call<T>(
        &self,
        op: impl FnOnce(&mut SimState, &dyn Clock) -> CallResult<T>,
    ) -> CallResult<T> {
        let mut state = self.state();
        if let Some(fault) = state.faults.pop_front() {
            tracing::trace!(fault = ?fault, "injecting fault");
            return Err(match fault {
                Fault::System(message) => Status::System(message),
                Fault::GarbledReply => Status::UnexpectedReply("garbled reply".to_string()),
            });
        }
        op(&mut state, self.inner.clock.as_ref())
    }

    fn node_config(&self, endpoint: &Endpoint) -> CallResult<String> {
        let mut state = self.state();
        if let Some(fault) = state.faults.pop_front() {
            return match fault {
                Fault::System(message) => Err(Status::System(message)),
                // Truncated document: the decoder on the client side must reject it.
                Fault::GarbledReply => Ok(r#"{"local":{"network":{"listen_on":"#.to_string()),
            };
        }
        drop(state);

        if !self.inner.nodes.contains(endpoint) {
            return Err(Status::System(format!("unknown node {endpoint}")));
        }
        let document = serde_json::json!({
            "local": {
                "network": {
                    "listen_on": endpoint.to_string(),
                    "server_sessions": 64,
                },
                "depot": { "root": "db" },
            },
            "global": {
                "cluster": { "nodes": self.inner.nodes.len() },
            },
        });
        Ok(document.to_string())
    }
}

impl Connector for SimCluster {
    fn connect(&self, endpoint: &Endpoint) -> CallResult<Box<dyn Transport>> {
        if !self.inner.nodes.contains(endpoint) {
            return Err(Status::ConnectionRefused(format!(
                "no daemon listening on {endpoint}"
            )));
        }
        Ok(Box::new(SimTransport {
            cluster: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

// =============================================================================
// SimTransport
// =============================================================================

/// One session against a [`SimCluster`].
#[derive(Debug)]
pub struct SimTransport {
    cluster: SimCluster,
    closed: AtomicBool,
}

impl SimTransport {
    fn ensure_open(&self) -> CallResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Status::ConnectionClosed);
        }
        Ok(())
    }

    fn ensure_mutable(alias: &str) -> CallResult<()> {
        if is_reserved(alias) {
            return Err(Status::ReservedAlias);
        }
        Ok(())
    }
}

/// Reject an expiry that has already passed on the cluster clock.
fn expect_future(expiry: ExpiryTime, clock: &dyn Clock) -> CallResult<()> {
    if expiry.has_passed(clock.now()) {
        return Err(Status::InvalidArgument(format!(
            "expiry {expiry} is not in the future"
        )));
    }
    Ok(())
}

fn expect_type(entry: &SimEntry, expected: EntryType) -> CallResult<()> {
    let actual = entry.content.entry_type();
    if actual != expected {
        return Err(Status::IncompatibleType { expected, actual });
    }
    Ok(())
}

impl Transport for SimTransport {
    fn entry_type(&self, alias: &str) -> CallResult<Option<EntryType>> {
        self.ensure_open()?;
        self.cluster.call(|state, clock| {
            Ok(state
                .live(alias, clock)
                .map(|entry| entry.content.entry_type()))
        })
    }

    fn get_expiry(&self, alias: &str) -> CallResult<ExpiryTime> {
        self.ensure_open()?;
        self.cluster.call(|state, clock| {
            state
                .live(alias, clock)
                .map(|entry| entry.expiry)
                .ok_or(Status::AliasNotFound)
        })
    }

    fn set_expiry(&self, alias: &str, expiry: ExpiryTime) -> CallResult<()> {
        self.ensure_open()?;
        Self::ensure_mutable(alias)?;
        self.cluster.call(|state, clock| {
            let entry = state.live(alias, clock).ok_or(Status::AliasNotFound)?;
            expect_future(expiry, clock)?;
            entry.expiry = expiry;
            Ok(())
        })
    }

    fn remove(&self, alias: &str) -> CallResult<()> {
        self.ensure_open()?;
        Self::ensure_mutable(alias)?;
        self.cluster.call(|state, clock| {
            state.live(alias, clock).ok_or(Status::AliasNotFound)?;
            state.entries.remove(alias);
            Ok(())
        })
    }

    fn blob_put(&self, alias: &str, content: &[u8], expiry: ExpiryTime) -> CallResult<()> {
        self.ensure_open()?;
        Self::ensure_mutable(alias)?;
        self.cluster.call(|state, clock| {
            if let Some(entry) = state.live(alias, clock) {
                expect_type(entry, EntryType::Blob)?;
            }
            expect_future(expiry, clock)?;
            state.entries.insert(
                alias.to_string(),
                SimEntry {
                    content: SimContent::Blob {
                        content: content.to_vec(),
                    },
                    expiry,
                },
            );
            Ok(())
        })
    }

    fn blob_get(&self, alias: &str) -> CallResult<Bytes> {
        self.ensure_open()?;
        self.cluster.call(|state, clock| {
            let entry = state.live(alias, clock).ok_or(Status::AliasNotFound)?;
            match &entry.content {
                SimContent::Blob { content } => Ok(Bytes::copy_from_slice(content)),
                other => Err(Status::IncompatibleType {
                    expected: EntryType::Blob,
                    actual: other.entry_type(),
                }),
            }
        })
    }

    fn hset_insert(&self, alias: &str, content: &[u8]) -> CallResult<bool> {
        self.ensure_open()?;
        Self::ensure_mutable(alias)?;
        self.cluster.call(|state, clock| {
            if state.live(alias, clock).is_none() {
                state.entries.insert(
                    alias.to_string(),
                    SimEntry {
                        content: SimContent::HashSet {
                            members: BTreeSet::new(),
                        },
                        expiry: ExpiryTime::Never,
                    },
                );
            }
            let entry = state.live(alias, clock).ok_or(Status::AliasNotFound)?;
            match &mut entry.content {
                SimContent::HashSet { members } => Ok(members.insert(content.to_vec())),
                other => Err(Status::IncompatibleType {
                    expected: EntryType::HashSet,
                    actual: other.entry_type(),
                }),
            }
        })
    }

    fn hset_erase(&self, alias: &str, content: &[u8]) -> CallResult<bool> {
        self.ensure_open()?;
        Self::ensure_mutable(alias)?;
        self.cluster.call(|state, clock| {
            let entry = state.live(alias, clock).ok_or(Status::AliasNotFound)?;
            match &mut entry.content {
                SimContent::HashSet { members } => Ok(members.remove(content)),
                other => Err(Status::IncompatibleType {
                    expected: EntryType::HashSet,
                    actual: other.entry_type(),
                }),
            }
        })
    }

    fn hset_contains(&self, alias: &str, content: &[u8]) -> CallResult<bool> {
        self.ensure_open()?;
        self.cluster.call(|state, clock| {
            let entry = state.live(alias, clock).ok_or(Status::AliasNotFound)?;
            match &entry.content {
                SimContent::HashSet { members } => Ok(members.contains(content)),
                other => Err(Status::IncompatibleType {
                    expected: EntryType::HashSet,
                    actual: other.entry_type(),
                }),
            }
        })
    }

    fn node_config(&self, endpoint: &Endpoint) -> CallResult<String> {
        self.ensure_open()?;
        self.cluster.node_config(endpoint)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use chrono::Duration;

    fn endpoint() -> Endpoint {
        Endpoint::new("127.0.0.1", 2836)
    }

    fn session(cluster: &SimCluster) -> Box<dyn Transport> {
        cluster.connect(&endpoint()).unwrap()
    }

    #[test]
    fn test_connect_unknown_endpoint_refused() {
        let cluster = SimCluster::single(endpoint());
        let result = cluster.connect(&Endpoint::new("127.0.0.1", 9999));
        assert!(matches!(result, Err(Status::ConnectionRefused(_))));
    }

    #[test]
    fn test_sessions_share_state() {
        let cluster = SimCluster::single(endpoint());
        let a = session(&cluster);
        let b = session(&cluster);

        a.blob_put("k", b"v", ExpiryTime::Never).unwrap();

        assert_eq!(b.blob_get("k").unwrap(), Bytes::from_static(b"v"));
        assert_eq!(b.entry_type("k").unwrap(), Some(EntryType::Blob));
    }

    #[test]
    fn test_closed_session_fails() {
        let cluster = SimCluster::single(endpoint());
        let t = session(&cluster);
        t.close();
        assert_eq!(t.blob_get("k"), Err(Status::ConnectionClosed));
        assert_eq!(t.node_config(&endpoint()), Err(Status::ConnectionClosed));
    }

    #[test]
    fn test_hset_rejects_blob_without_mutation() {
        let cluster = SimCluster::single(endpoint());
        let t = session(&cluster);
        t.blob_put("foo", b"x", ExpiryTime::Never).unwrap();

        let result = t.hset_insert("foo", b"x");

        assert_eq!(
            result,
            Err(Status::IncompatibleType {
                expected: EntryType::HashSet,
                actual: EntryType::Blob,
            })
        );
        assert_eq!(t.blob_get("foo").unwrap(), Bytes::from_static(b"x"));
    }

    #[test]
    fn test_expired_entries_are_purged() {
        let clock = SimClock::at_ms(1_000_000);
        let cluster = SimCluster::with_clock(vec![endpoint()], Arc::new(clock.clone()));
        let t = session(&cluster);
        let expiry = ExpiryTime::after(clock.now(), Duration::seconds(10)).unwrap();
        t.blob_put("k", b"v", expiry).unwrap();

        clock.advance_secs(9);
        assert!(cluster.contains("k"));

        clock.advance_secs(1);
        assert_eq!(t.blob_get("k"), Err(Status::AliasNotFound));
        assert_eq!(cluster.entry_count(), 0);
    }

    #[test]
    fn test_faults_are_consumed_in_order() {
        let cluster = SimCluster::single(endpoint());
        let t = session(&cluster);
        cluster.inject_fault(Fault::System("disk full".to_string()), 1);
        cluster.inject_fault(Fault::GarbledReply, 1);

        assert_eq!(
            t.entry_type("k"),
            Err(Status::System("disk full".to_string()))
        );
        assert!(matches!(t.entry_type("k"), Err(Status::UnexpectedReply(_))));
        assert_eq!(t.entry_type("k"), Ok(None));
    }

    #[test]
    fn test_reserved_alias_rejected_remotely() {
        let cluster = SimCluster::single(endpoint());
        let t = session(&cluster);
        assert_eq!(t.hset_insert("qdb", b"x"), Err(Status::ReservedAlias));
        assert_eq!(
            t.blob_put("qdb", b"x", ExpiryTime::Never),
            Err(Status::ReservedAlias)
        );
        assert_eq!(cluster.entry_count(), 0);
    }

    #[test]
    fn test_snapshot_restore() {
        let cluster = SimCluster::single(endpoint());
        let t = session(&cluster);
        t.blob_put("b", b"blob", ExpiryTime::Never).unwrap();
        t.hset_insert("s", b"one").unwrap();

        let json = serde_json::to_string(&cluster.snapshot()).unwrap();
        let snapshot: SimSnapshot = serde_json::from_str(&json).unwrap();
        let restored = SimCluster::from_snapshot(snapshot, Arc::new(SystemClock)).unwrap();
        let t = session(&restored);

        assert_eq!(t.blob_get("b").unwrap(), Bytes::from_static(b"blob"));
        assert!(t.hset_contains("s", b"one").unwrap());
        assert_eq!(restored.nodes(), &[endpoint()]);
    }

    #[test]
    fn test_node_config_document() {
        let cluster = SimCluster::single(endpoint());
        let t = session(&cluster);
        let document = t.node_config(&endpoint()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(doc["local"]["network"]["listen_on"], "127.0.0.1:2836");
    }

    #[test]
    fn test_past_expiry_rejected_without_mutation() {
        let clock = SimClock::at_ms(1_000_000);
        let cluster = SimCluster::with_clock(vec![endpoint()], Arc::new(clock.clone()));
        let t = session(&cluster);
        let future = ExpiryTime::after(clock.now(), Duration::seconds(10)).unwrap();
        t.blob_put("k", b"v", future).unwrap();

        let now = ExpiryTime::at(clock.now());
        assert!(matches!(t.set_expiry("k", now), Err(Status::InvalidArgument(_))));
        assert!(matches!(
            t.blob_put("k", b"w", now),
            Err(Status::InvalidArgument(_))
        ));

        assert_eq!(t.get_expiry("k"), Ok(future));
        assert_eq!(t.blob_get("k").unwrap(), Bytes::from_static(b"v"));
    }

    #[test]
    fn test_snapshot_without_usable_nodes_is_rejected() {
        let snapshot: SimSnapshot =
            serde_json::from_str(r#"{"nodes":["host:port"],"entries":{}}"#).unwrap();
        let err = SimCluster::from_snapshot(snapshot, Arc::new(SystemClock)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }
}
