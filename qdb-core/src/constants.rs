//! Constants
//!
//! TigerStyle: Every limit is named, with units in the name.

// =============================================================================
// Aliases
// =============================================================================

/// Aliases reserved for the store itself. Mutations against them always fail.
pub const RESERVED_ALIASES: &[&str] = &["qdb"];

/// Maximum alias length in bytes
pub const ALIAS_BYTES_MAX: usize = 1024;

/// Prefix used by generated test aliases
pub const ALIAS_GENERATED_PREFIX: &str = "alias_";

// =============================================================================
// Endpoints
// =============================================================================

/// URI scheme accepted by [`crate::Endpoint::parse`]
pub const URI_SCHEME: &str = "qdb://";

/// Default daemon listening port
pub const PORT_DEFAULT: u16 = 2836;

/// Default daemon host
pub const HOST_DEFAULT: &str = "127.0.0.1";

/// Default cluster URI
pub const URI_DEFAULT: &str = "qdb://127.0.0.1:2836";

/// Environment variable holding the cluster URI
pub const URI_ENV_VAR: &str = "QDB_URI";

// =============================================================================
// Time
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1000;

/// Maximum single advance of a simulated clock (one day)
pub const SIM_TIME_ADVANCE_MS_MAX: u64 = 86_400_000;

// =============================================================================
// Fixtures
// =============================================================================

/// Environment variable holding the daemon executable path
pub const DAEMON_PATH_ENV_VAR: &str = "QDB_DAEMON_PATH";

/// Daemon executable name used when the environment variable is unset
pub const DAEMON_NAME_DEFAULT: &str = "qdbd";

/// Delay after starting or stopping the daemon before it is considered settled
pub const DAEMON_SETTLE_MS_DEFAULT: u64 = 3000;

/// Environment variable holding the seed for generated test content
pub const TEST_SEED_ENV_VAR: &str = "QDB_TEST_SEED";

/// Seed used for generated test content when none is configured
pub const TEST_SEED_DEFAULT: u64 = 0x5EED;

/// Maximum size of generated test content in bytes
pub const CONTENT_GENERATED_BYTES_MAX: usize = 64 * 1024;
