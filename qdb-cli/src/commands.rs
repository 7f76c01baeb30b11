//! Subcommands and their execution against a connected cluster.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use qdb_core::{Cluster, Expirable, ExpiryTime, Platform, QdbError};

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Blob operations
    Blob {
        #[command(subcommand)]
        action: BlobAction,
    },
    /// Hash set operations
    Hset {
        #[command(subcommand)]
        action: HsetAction,
    },
    /// Read or set the expiry of an entry
    Expiry {
        #[command(subcommand)]
        action: ExpiryAction,
    },
    /// Remove an entry of any type
    Remove {
        /// Alias to remove
        alias: String,
    },
    /// Node introspection
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Show the native library selected for this platform
    Platform,
}

/// `blob` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BlobAction {
    /// Create or overwrite a blob
    Put {
        /// Alias to write
        alias: String,
        /// Content (UTF-8)
        content: String,
    },
    /// Print a blob
    Get {
        /// Alias to read
        alias: String,
    },
}

/// `hset` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HsetAction {
    /// Add a member; prints whether it was new
    Insert {
        /// Set alias
        alias: String,
        /// Member (UTF-8)
        content: String,
    },
    /// Remove a member; prints whether it was present
    Erase {
        /// Set alias
        alias: String,
        /// Member (UTF-8)
        content: String,
    },
    /// Print whether a member is present
    Contains {
        /// Set alias
        alias: String,
        /// Member (UTF-8)
        content: String,
    },
}

/// `expiry` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ExpiryAction {
    /// Print the expiry of an entry
    Get {
        /// Alias to inspect
        alias: String,
    },
    /// Set the expiry of an entry
    Set {
        /// Alias to update
        alias: String,
        /// Expire this many seconds from now
        #[arg(long, conflicts_with_all = ["at", "never"])]
        seconds: Option<i64>,
        /// Expire at an RFC 3339 instant
        #[arg(long, conflicts_with = "never")]
        at: Option<String>,
        /// Never expire
        #[arg(long)]
        never: bool,
    },
}

/// `node` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    /// Print the configured listening port of a node
    Port {
        /// Node URI, `qdb://host:port`
        uri: String,
    },
}

/// Run `command` and return what should be printed.
///
/// # Errors
/// Any [`QdbError`] raised by the operation.
pub fn execute(command: &Commands, cluster: &Cluster) -> Result<String, QdbError> {
    match command {
        Commands::Blob { action } => match action {
            BlobAction::Put { alias, content } => {
                cluster.blob(alias.as_str()).put(content.as_bytes())?;
                Ok("ok".to_string())
            }
            BlobAction::Get { alias } => {
                let content = cluster.blob(alias.as_str()).get()?;
                Ok(String::from_utf8_lossy(&content).into_owned())
            }
        },
        Commands::Hset { action } => {
            let result = match action {
                HsetAction::Insert { alias, content } => {
                    cluster.hash_set(alias.as_str()).insert(content.as_bytes())?
                }
                HsetAction::Erase { alias, content } => {
                    cluster.hash_set(alias.as_str()).erase(content.as_bytes())?
                }
                HsetAction::Contains { alias, content } => {
                    cluster.hash_set(alias.as_str()).contains(content.as_bytes())?
                }
            };
            Ok(result.to_string())
        }
        Commands::Expiry { action } => match action {
            ExpiryAction::Get { alias } => {
                Ok(cluster.entry(alias.as_str()).expiry_time()?.to_string())
            }
            ExpiryAction::Set {
                alias,
                seconds,
                at,
                never,
            } => {
                let expiry = parse_expiry(*seconds, at.as_deref(), *never)?;
                cluster.entry(alias.as_str()).set_expiry_time(expiry)?;
                Ok(expiry.to_string())
            }
        },
        Commands::Remove { alias } => {
            cluster.entry(alias.as_str()).remove()?;
            Ok("ok".to_string())
        }
        Commands::Node { action } => match action {
            NodeAction::Port { uri } => Ok(cluster.node(uri)?.port()?.to_string()),
        },
        Commands::Platform => Ok(match Platform::current() {
            Some(platform) => format!("{platform} {}", platform.library_path().display()),
            None => "unsupported platform".to_string(),
        }),
    }
}

/// Turn the `expiry set` flags into an [`ExpiryTime`].
fn parse_expiry(
    seconds: Option<i64>,
    at: Option<&str>,
    never: bool,
) -> Result<ExpiryTime, QdbError> {
    if never {
        return Ok(ExpiryTime::Never);
    }
    if let Some(seconds) = seconds {
        return ExpiryTime::seconds_from_now(seconds).ok_or_else(|| {
            QdbError::InvalidArgument(format!("expiry of {seconds} seconds is out of range"))
        });
    }
    if let Some(at) = at {
        let instant = DateTime::parse_from_rfc3339(at)
            .map_err(|e| QdbError::InvalidArgument(format!("invalid instant {at:?}: {e}")))?;
        return Ok(ExpiryTime::at(instant.with_timezone(&Utc)));
    }
    Err(QdbError::InvalidArgument(
        "one of --seconds, --at or --never is required".to_string(),
    ))
}
