use async_trait::async_trait;
use serde::Serialize;

use crate::core::registry::Registry;

/// Tools are action-like, resources are read-only descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Tool,
    Resource,
}

/// Minimal metadata every operation must expose.
pub trait OperationSpec {
    /// Tool name, or URI for resources.
    fn name(&self) -> &'static str;
    fn kind(&self) -> OperationKind;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }
    fn mime_type(&self) -> Option<&'static str> {
        None
    }
}

/// What a handler gets to see for one invocation.
#[derive(Clone, Copy)]
pub struct OperationRequest<'a> {
    pub arguments: &'a serde_json::Value,
    pub registry: &'a Registry,
}

/// Operation = Spec + handler.
///
/// Handlers are expected to fold environmental failures into their payload and
/// only return `Err` for protocol-level problems.
#[async_trait]
pub trait Operation: OperationSpec + Send + Sync {
    async fn call(&self, request: OperationRequest<'_>) -> Result<serde_json::Value, String>;
}
