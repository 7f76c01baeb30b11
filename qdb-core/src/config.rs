//! Client configuration
//!
//! TigerStyle: Defaults are constants; the environment overrides them.

use serde::{Deserialize, Serialize};

use crate::constants::{URI_DEFAULT, URI_ENV_VAR};
use crate::error::{QdbError, Result};
use crate::transport::Endpoint;

/// How to reach the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Cluster URI, `qdb://host:port`
    #[serde(default = "default_uri")]
    pub uri: String,
}

fn default_uri() -> String {
    URI_DEFAULT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { uri: default_uri() }
    }
}

impl ClientConfig {
    /// Configuration for an explicit URI.
    #[must_use]
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Read `QDB_URI`, falling back to the default URI.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(URI_ENV_VAR) {
            Ok(uri) if !uri.is_empty() => Self { uri },
            _ => Self::default(),
        }
    }

    /// Decode from a JSON document.
    ///
    /// # Errors
    /// `InvalidArgument` if the document does not decode.
    pub fn from_json(document: &str) -> Result<Self> {
        serde_json::from_str(document)
            .map_err(|e| QdbError::InvalidArgument(format!("invalid client config: {e}")))
    }

    /// The endpoint named by `uri`.
    ///
    /// # Errors
    /// `InvalidArgument` for a malformed URI.
    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PORT_DEFAULT;

    #[test]
    fn test_default_endpoint() {
        let endpoint = ClientConfig::default().endpoint().unwrap();
        assert_eq!(endpoint.port, PORT_DEFAULT);
        assert_eq!(endpoint.host, "127.0.0.1");
    }

    #[test]
    fn test_from_json_defaults_missing_uri() {
        assert_eq!(ClientConfig::from_json("{}").unwrap(), ClientConfig::default());
        let config = ClientConfig::from_json(r#"{"uri":"qdb://db1:3000"}"#).unwrap();
        assert_eq!(config.endpoint().unwrap(), Endpoint::new("db1", 3000));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(ClientConfig::from_json("[").is_err());
    }
}
