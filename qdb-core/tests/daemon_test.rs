//! Daemon fixture against a real daemon binary
//!
//! Skipped unless `QDB_DAEMON_PATH` points at an executable.

use std::time::Duration;

use qdb_core::constants::DAEMON_PATH_ENV_VAR;
use qdb_core::fixture::{DaemonConfig, DaemonProcess};
use qdb_core::Endpoint;

/// Skip test if no daemon available.
macro_rules! require_daemon {
    () => {
        match std::env::var(DAEMON_PATH_ENV_VAR) {
            Ok(path) if !path.is_empty() => path,
            _ => {
                eprintln!("Skipping test: {} not set", DAEMON_PATH_ENV_VAR);
                return;
            }
        }
    };
}

#[test]
fn test_daemon_starts_and_stops() {
    let _path = require_daemon!();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = DaemonConfig::from_env()
        .listen_on(&Endpoint::new("127.0.0.1", 2836))
        .settle(Duration::from_secs(1));
    let mut daemon = DaemonProcess::start(&config).expect("daemon should start");
    assert!(daemon.is_running().unwrap());

    daemon.stop().unwrap();
    assert!(!daemon.is_running().unwrap());
}
