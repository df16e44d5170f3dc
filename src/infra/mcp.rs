//! MCP server integration (Streamable HTTP + stdio) for the Jetson operations.
//!
//! - Tools and resources come from the [`Dispatcher`], not from macro routers
//! - Mounts the Streamable HTTP service (POST frames, GET SSE) at `/mcp`
//! - Supports stdio mode when `MODE=stdio`

use std::sync::Arc;

use rmcp::{
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation,
        JsonObject, ListResourcesResult, ListToolsResult, PaginatedRequestParam, RawResource,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities,
        ServerInfo, Tool,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use rmcp::transport::streamable_http_server::tower::{
    StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::Value as JsonValue;

pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;

use crate::core::dispatch::{Dispatcher, Response};
use crate::core::error::DispatchError;
use crate::core::operation::OperationKind;
use crate::core::registry::OperationMeta;
use crate::tools::server_info::ServerIdentity;

/// The MCP server handler. Every request goes through the shared dispatcher.
#[derive(Clone)]
pub struct JetsonSvc {
    dispatcher: Dispatcher,
    identity: Arc<ServerIdentity>,
}

impl JetsonSvc {
    pub fn new(dispatcher: Dispatcher, identity: ServerIdentity) -> Self {
        Self {
            dispatcher,
            identity: Arc::new(identity),
        }
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .list(OperationKind::Tool)
            .into_iter()
            .map(to_mcp_tool)
            .collect()
    }

    pub fn resources(&self) -> Vec<rmcp::model::Resource> {
        self.dispatcher
            .list(OperationKind::Resource)
            .into_iter()
            .map(|meta| {
                RawResource {
                    description: Some(meta.description.to_owned()),
                    mime_type: meta.mime_type.map(str::to_owned),
                    ..RawResource::new(meta.name, meta.name)
                }
                .no_annotation()
            })
            .collect()
    }

    pub async fn call_operation(&self, name: &str, arguments: Option<JsonObject>) -> Result<CallToolResult, McpError> {
        let args = arguments.map(JsonValue::Object).unwrap_or(JsonValue::Null);
        let resp = self
            .dispatcher
            .dispatch_kind(OperationKind::Tool, name, &args)
            .await
            .map_err(to_mcp_error)?;
        Ok(to_call_result(resp))
    }

    pub async fn read_operation(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let resp = self
            .dispatcher
            .dispatch_kind(OperationKind::Resource, uri, &JsonValue::Null)
            .await
            .map_err(|e| match e {
                DispatchError::OperationNotFound(uri) => {
                    McpError::resource_not_found(format!("unknown resource: {uri}"), None)
                }
                other => to_mcp_error(other),
            })?;
        let text = match resp.body {
            JsonValue::String(s) => s,
            other => other.to_string(),
        };
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

impl ServerHandler for JetsonSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: self.identity.server_name.clone(),
                version: self.identity.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some(self.identity.description.clone()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, "call_tool invoked");
        self.call_operation(&request.name, request.arguments).await
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resources()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        tracing::debug!(uri = %request.uri, "read_resource invoked");
        self.read_operation(&request.uri).await
    }
}

fn to_mcp_tool(meta: OperationMeta) -> Tool {
    let schema = match meta.input_schema {
        JsonValue::Object(obj) => obj,
        _ => JsonObject::new(),
    };
    Tool::new(meta.name, meta.description, Arc::new(schema))
}

/// Strings become text content; structured payloads also go to `structuredContent`.
fn to_call_result(resp: Response) -> CallToolResult {
    match resp.body {
        JsonValue::String(s) => CallToolResult::success(vec![Content::text(s)]),
        other => CallToolResult::structured(other),
    }
}

fn to_mcp_error(e: DispatchError) -> McpError {
    match e {
        DispatchError::OperationNotFound(_) => {
            McpError::new(ErrorCode::METHOD_NOT_FOUND, e.to_string(), None)
        }
        DispatchError::Handler(msg) => McpError::internal_error(msg, None),
    }
}

/// Run MCP over stdin/stdout until the peer disconnects.
pub async fn serve_stdio(svc: JetsonSvc) -> anyhow::Result<()> {
    let running = svc.serve(rmcp::transport::stdio()).await?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "stdio session ended");
    Ok(())
}

pub fn make_streamable_http_service(
    svc: JetsonSvc,
    session_mgr: Arc<LocalSessionManager>,
) -> StreamableHttpService<JetsonSvc, LocalSessionManager> {
    let cfg = StreamableHttpServerConfig::default();
    tracing::debug!(stateful_mode = %cfg.stateful_mode, keep_alive = ?cfg.sse_keep_alive, "StreamableHttpServerConfig");
    StreamableHttpService::new(move || Ok(svc.clone()), session_mgr, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandResult;
    use crate::tools::hw_info::BOOT_CONTROL_CMD;
    use crate::tools::sw_info::{JETPACK_RELEASE_CMD, LINUX_VERSION_CMD};
    use crate::tools::testing::ScriptedExecutor;

    fn svc() -> JetsonSvc {
        let exec = Arc::new(ScriptedExecutor::new([
            (BOOT_CONTROL_CMD, CommandResult::success(BOOT_CONTROL_CMD, "BOARDID=3767\n")),
            (JETPACK_RELEASE_CMD, CommandResult::not_found(JETPACK_RELEASE_CMD, "", 1)),
            (LINUX_VERSION_CMD, CommandResult::success(LINUX_VERSION_CMD, "Linux version 5.10.0\n")),
        ]));
        let identity = ServerIdentity::default();
        let reg = crate::tools::build_registry(exec, identity.clone()).unwrap();
        JetsonSvc::new(Dispatcher::new(reg), identity)
    }

    #[test]
    fn lists_registered_tools_and_resources() {
        let s = svc();
        let names: Vec<String> = s.tools().iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, vec!["get_jetson_hw_info", "get_jetson_sw_info"]);
        let uris: Vec<String> = s.resources().iter().map(|r| r.raw.uri.clone()).collect();
        assert_eq!(uris, vec!["jetson://info"]);
    }

    #[tokio::test]
    async fn hw_tool_returns_text_content() {
        let res = svc().call_operation("get_jetson_hw_info", None).await.unwrap();
        assert_ne!(res.is_error, Some(true));
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["content"][0]["text"], "BOARDID=3767");
    }

    #[tokio::test]
    async fn sw_tool_returns_structured_content() {
        let res = svc().call_operation("get_jetson_sw_info", None).await.unwrap();
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["structuredContent"]["jetpack_release"], "Error: File not found");
        assert_eq!(v["structuredContent"]["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_method_not_found() {
        let err = svc().call_operation("nope", None).await.unwrap_err();
        assert_eq!(err.code.0, ErrorCode::METHOD_NOT_FOUND.0);
    }

    #[tokio::test]
    async fn resource_name_is_not_a_tool() {
        let err = svc().call_operation("jetson://info", None).await.unwrap_err();
        assert_eq!(err.code.0, ErrorCode::METHOD_NOT_FOUND.0);
    }

    #[tokio::test]
    async fn reads_info_resource_as_json_text() {
        let res = svc().read_operation("jetson://info").await.unwrap();
        let v = serde_json::to_value(&res.contents[0]).unwrap();
        let body: JsonValue = serde_json::from_str(v["text"].as_str().unwrap()).unwrap();
        assert_eq!(body["capabilities"], serde_json::json!(["get_jetson_hw_info", "get_jetson_sw_info"]));
    }

    #[tokio::test]
    async fn unknown_resource_is_resource_not_found() {
        let err = svc().read_operation("jetson://missing").await.unwrap_err();
        assert_eq!(err.code.0, ErrorCode::RESOURCE_NOT_FOUND.0);
    }

    #[test]
    fn info_advertises_tools_and_resources() {
        let info = svc().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert_eq!(info.server_info.name, "Jetson MCP Server");
    }

    #[test]
    fn streamable_http_service_builds() {
        let session_mgr = Arc::new(LocalSessionManager::default());
        let _svc = make_streamable_http_service(svc(), session_mgr);
    }
}
