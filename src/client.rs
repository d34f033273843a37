//! The root of the resource tree.

use std::sync::Arc;

use crate::api::{HttpTransport, PatCredential, ResourceNode, Transport};
use crate::build::Build;
use crate::config::ClientConfig;
use crate::distributed_task::DistributedTask;
use crate::error::{AdoResult, ApiResult};
use crate::git::Git;
use crate::pipelines::Pipelines;
use crate::wit::Wit;

/// Azure DevOps client.
///
/// Cheap to clone: the configuration and transport are shared. Every accessor
/// returns a fresh endpoint value positioned one level deeper in the tree.
///
/// # Example
///
/// ```rust,no_run
/// use ado_rest::{Client, ClientConfig};
/// use ado_rest::build::DefinitionsParameters;
/// use secrecy::SecretString;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new(
///     "my-org",
///     "my-project",
///     SecretString::from("my-pat".to_string()),
/// )?;
/// let client = Client::new(config)?;
///
/// let definitions = client
///     .build()
///     .definitions()
///     .list_all(&DefinitionsParameters::default())
///     .await?;
/// println!("Found {} build definitions", definitions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    node: ResourceNode,
}

impl Client {
    /// Creates a client that talks HTTPS through `reqwest`.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let credential = PatCredential::new(config.pat().clone());
        let transport = HttpTransport::new(&credential)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client on top of any [`Transport`].
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            node: ResourceNode::root(Arc::new(config), transport),
        }
    }

    /// Creates a client from `AZURE_DEVOPS_*` environment variables.
    pub fn from_env() -> AdoResult<Self> {
        let config = ClientConfig::from_env()?;
        Ok(Self::new(config)?)
    }

    pub fn config(&self) -> &ClientConfig {
        self.node.config()
    }

    /// The root node (no path segments).
    pub fn node(&self) -> &ResourceNode {
        &self.node
    }

    /// Build API.
    pub fn build(&self) -> Build {
        self.node.child()
    }

    /// Git API.
    pub fn git(&self) -> Git {
        self.node.child()
    }

    /// Pipelines API.
    pub fn pipelines(&self) -> Pipelines {
        self.node.child()
    }

    /// Distributed task API.
    pub fn distributed_task(&self) -> DistributedTask {
        self.node.child()
    }

    /// Work item tracking API.
    pub fn wit(&self) -> Wit {
        self.node.child()
    }
}
