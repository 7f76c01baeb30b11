//! Daemon process fixture
//!
//! Starts a cluster daemon for integration tests and stops it on drop.
//! Both transitions wait a fixed settle delay, since the daemon gives no
//! readiness signal.

use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use crate::constants::{DAEMON_NAME_DEFAULT, DAEMON_PATH_ENV_VAR, DAEMON_SETTLE_MS_DEFAULT};
use crate::transport::{Endpoint, Platform};

/// How to launch the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Executable to run
    pub executable: PathBuf,
    /// Arguments passed to it
    pub args: Vec<String>,
    /// Wait after start and after stop
    pub settle: Duration,
}

impl DaemonConfig {
    /// Launch `executable` with no arguments and the default settle delay.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            settle: Duration::from_millis(DAEMON_SETTLE_MS_DEFAULT),
        }
    }

    /// Executable from `QDB_DAEMON_PATH`, or the platform's default name
    /// (looked up on `PATH`) with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(DAEMON_PATH_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::new(path),
            _ => {
                let name = Platform::current().map_or_else(
                    || DAEMON_NAME_DEFAULT.to_string(),
                    |p| p.daemon_executable_name(),
                );
                tracing::warn!(
                    env_var = DAEMON_PATH_ENV_VAR,
                    default = %name,
                    "daemon path not set, using default executable name"
                );
                Self::new(name)
            }
        }
    }

    /// Ask the daemon to listen on `endpoint`.
    #[must_use]
    pub fn listen_on(mut self, endpoint: &Endpoint) -> Self {
        self.args.push(format!("--address={endpoint}"));
        self
    }

    /// Append a raw argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Override the settle delay.
    #[must_use]
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// A running daemon. Stopped when dropped.
#[derive(Debug)]
pub struct DaemonProcess {
    child: Option<Child>,
    settle: Duration,
}

impl DaemonProcess {
    /// Spawn the daemon and wait for it to settle.
    ///
    /// # Errors
    /// Fails if the executable cannot be spawned, or if it exits before
    /// the settle delay has passed.
    pub fn start(config: &DaemonConfig) -> io::Result<Self> {
        tracing::info!(
            executable = %config.executable.display(),
            args = ?config.args,
            "starting daemon"
        );
        let mut child = Command::new(&config.executable)
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        std::thread::sleep(config.settle);

        if let Some(status) = child.try_wait()? {
            return Err(io::Error::other(format!(
                "daemon exited during startup: {status}"
            )));
        }

        Ok(Self {
            child: Some(child),
            settle: config.settle,
        })
    }

    /// Whether the process is still alive.
    ///
    /// # Errors
    /// Fails if the process status cannot be queried.
    pub fn is_running(&mut self) -> io::Result<bool> {
        match self.child.as_mut() {
            Some(child) => Ok(child.try_wait()?.is_none()),
            None => Ok(false),
        }
    }

    /// Kill the daemon and wait for it to settle. Idempotent.
    ///
    /// # Errors
    /// Fails if the process cannot be reaped.
    pub fn stop(&mut self) -> io::Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if child.try_wait()?.is_none() {
            child.kill()?;
        }
        let status = child.wait()?;
        tracing::info!(status = %status, "daemon stopped");
        std::thread::sleep(self.settle);
        Ok(())
    }
}

impl Drop for DaemonProcess {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "failed to stop daemon");
        }
    }
}
