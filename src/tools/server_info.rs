use async_trait::async_trait;
use serde_json::Value as J;

use crate::core::operation::{Operation, OperationKind, OperationRequest, OperationSpec};
use crate::core::registry::Registry;
use crate::domain::ServerDescriptor;

pub const SERVER_INFO_URI: &str = "jetson://info";
pub const DEFAULT_SERVER_NAME: &str = "Jetson MCP Server";
pub const DEFAULT_DESCRIPTION: &str =
    "MCP Server for monitoring and controlling a Jetson board (using Streamable HTTP/SSE).";

/// Static identity half of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub server_name: String,
    pub version: String,
    pub description: String,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: DEFAULT_DESCRIPTION.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerInfoResource {
    identity: ServerIdentity,
}

impl ServerInfoResource {
    pub fn new(identity: ServerIdentity) -> Self {
        Self { identity }
    }

    /// Capabilities come from the live registry, tools only, in registration order.
    pub fn describe(&self, registry: &Registry) -> ServerDescriptor {
        ServerDescriptor {
            server_name: self.identity.server_name.clone(),
            version: self.identity.version.clone(),
            description: self.identity.description.clone(),
            capabilities: registry
                .names(OperationKind::Tool)
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl OperationSpec for ServerInfoResource {
    fn name(&self) -> &'static str {
        SERVER_INFO_URI
    }
    fn kind(&self) -> OperationKind {
        OperationKind::Resource
    }
    fn description(&self) -> &'static str {
        "Provides basic information about the Jetson MCP server."
    }
    fn mime_type(&self) -> Option<&'static str> {
        Some("application/json")
    }
}

#[async_trait]
impl Operation for ServerInfoResource {
    async fn call(&self, req: OperationRequest<'_>) -> Result<J, String> {
        tracing::info!("Executing get_jetson_info resource...");
        serde_json::to_value(self.describe(req.registry)).map_err(|e| e.to_string())
    }
}
