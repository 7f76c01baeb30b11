//! qdb Core - Typed entries over a cluster connection
//!
//! TigerStyle client model for a distributed key-value store: a
//! connection handle, typed entry handles bound to aliases, expiry, and
//! a flat error taxonomy. The store itself sits behind the
//! [`transport::Transport`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Blob / HashSet / ExpirableEntry │  Node    │
//! ├─────────────────────────────────────────────┤
//! │  Cluster (Open → Closed)                    │
//! ├─────────────────────────────────────────────┤
//! │  Transport: SimCluster │ native library     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use qdb_core::{Cluster, Endpoint, ErrorKind, Expirable, ExpiryTime, SimCluster};
//!
//! let sim = SimCluster::single(Endpoint::new("127.0.0.1", 2836));
//! let cluster = Cluster::connect("qdb://127.0.0.1:2836", &sim).unwrap();
//!
//! let set = cluster.hash_set("bar");
//! assert!(set.insert(b"Y").unwrap());
//! assert!(!set.insert(b"Y").unwrap());
//!
//! let expiry = ExpiryTime::minutes_from_now(5).unwrap();
//! set.set_expiry_time(expiry).unwrap();
//! assert_eq!(set.expiry_time().unwrap(), expiry);
//!
//! cluster.close();
//! let err = set.expiry_time().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ClosedConnection);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alias;
pub mod blob;
pub mod clock;
pub mod config;
pub mod connection;
pub mod constants;
pub mod entry;
pub mod error;
pub mod expiry;
#[cfg(feature = "fixture")]
pub mod fixture;
pub mod hash_set;
pub mod node;
pub mod transport;

// Re-export common types
pub use blob::Blob;
pub use clock::{Clock, SimClock, SystemClock};
pub use config::ClientConfig;
pub use connection::{Cluster, ConnectionState};
pub use entry::{EntryType, Expirable, ExpirableEntry};
pub use error::{ErrorKind, ErrorTier, QdbError, Result};
pub use expiry::ExpiryTime;
pub use hash_set::HashSet;
pub use node::{Node, NodeConfig};
pub use transport::{
    Connector, Endpoint, Fault, Platform, SimCluster, SimSnapshot, Status, Transport,
};
