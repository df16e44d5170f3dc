use axum::{
    routing::{any_service, get, post},
    Router,
};
use std::sync::Arc;

use crate::core::dispatch::Dispatcher;
use crate::infra::mcp::{self, JetsonSvc, LocalSessionManager};
use crate::tools::server_info::ServerIdentity;

/// `/healthz`, streamable MCP at `/mcp`, plain JSON-RPC at `/rpc`.
pub fn build_app(dispatcher: Dispatcher, identity: ServerIdentity) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let svc = JetsonSvc::new(dispatcher.clone(), identity);
    let mcp_service = mcp::make_streamable_http_service(svc, session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
        .route("/rpc", post(crate::api::rpc::http))
        .with_state(dispatcher)
}
