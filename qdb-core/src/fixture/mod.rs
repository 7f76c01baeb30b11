//! Test fixtures
//!
//! TigerStyle: Test data is generated, never hand-picked, and every seed
//! is logged so a failure can be replayed.
//!
//! ```bash
//! QDB_TEST_SEED=12345 cargo test
//! QDB_DAEMON_PATH=/opt/qdb/bin/qdbd cargo test
//! ```

mod content;
mod daemon;

pub use content::{unique_alias, ContentGenerator};
pub use daemon::{DaemonConfig, DaemonProcess};
