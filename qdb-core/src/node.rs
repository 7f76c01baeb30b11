//! Node - Read-only view of one cluster endpoint
//!
//! The node's configuration arrives as a JSON document. It is fetched on
//! first use and kept for the lifetime of the [`Node`] value only. A
//! document that does not decode is an `UnexpectedReply`.

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::connection::Cluster;
use crate::error::{QdbError, Result};
use crate::transport::Endpoint;

// =============================================================================
// Configuration document
// =============================================================================

/// Decoded node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// Settings local to this node
    pub local: LocalConfig,
}

/// The `local` section of a node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalConfig {
    /// Network settings
    pub network: NetworkConfig,
    /// Storage settings
    #[serde(default)]
    pub depot: DepotConfig,
}

/// The `local.network` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// `host:port` the daemon listens on
    pub listen_on: String,
    /// Maximum concurrent client sessions
    #[serde(default)]
    pub server_sessions: u32,
}

/// The `local.depot` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DepotConfig {
    /// Storage root directory
    #[serde(default)]
    pub root: String,
}

impl NodeConfig {
    /// Decode a configuration document.
    ///
    /// # Errors
    /// `UnexpectedReply` if the document is not valid configuration JSON.
    pub fn from_json(document: &str) -> Result<Self> {
        serde_json::from_str(document).map_err(|e| QdbError::UnexpectedReply {
            message: format!("invalid node configuration: {e}"),
            source: Some(e),
        })
    }

    /// The endpoint the daemon listens on.
    ///
    /// # Errors
    /// `UnexpectedReply` if `listen_on` is not an address.
    pub fn listen_on(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.local.network.listen_on).map_err(|_| {
            QdbError::unexpected_reply(format!(
                "invalid listen_on in node configuration: {:?}",
                self.local.network.listen_on
            ))
        })
    }
}

// =============================================================================
// Node
// =============================================================================

/// A cluster node as seen through a connection.
#[derive(Debug)]
pub struct Node<'c> {
    cluster: &'c Cluster,
    endpoint: Endpoint,
    config: OnceCell<NodeConfig>,
}

impl<'c> Node<'c> {
    pub(crate) fn new(cluster: &'c Cluster, endpoint: Endpoint) -> Self {
        Self {
            cluster,
            endpoint,
            config: OnceCell::new(),
        }
    }

    /// The endpoint this view was created for.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Configuration of the node.
    ///
    /// # Errors
    /// `ClosedConnection`, a remote failure, or `UnexpectedReply`.
    pub fn config(&self) -> Result<&NodeConfig> {
        self.cluster.ensure_open()?;
        self.config.get_or_try_init(|| {
            let endpoint = self.endpoint.to_string();
            let document = self
                .cluster
                .call("node_config", &endpoint, |t| t.node_config(&self.endpoint))?;
            NodeConfig::from_json(&document)
        })
    }

    /// The port the node listens on, as configured on the node.
    ///
    /// # Errors
    /// See [`Node::config`].
    pub fn port(&self) -> Result<u16> {
        Ok(self.config()?.listen_on()?.port)
    }
}
