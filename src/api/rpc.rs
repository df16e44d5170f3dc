use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::Json;
use serde_json::{json, Value as J};

use crate::core::dispatch::Dispatcher;
use crate::core::error::DispatchError;
use crate::core::mcp::{
    RpcReq, RpcResp, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND,
};
use crate::core::operation::OperationKind;
use crate::infra::http::json as http_json;

fn initialize(d: &Dispatcher) -> J {
    let tools = d.registry().names(OperationKind::Tool);
    let resources = d.registry().names(OperationKind::Resource);
    json!({
        "serverInfo": { "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") },
        "capabilities": { "tools": tools, "resources": resources }
    })
}

fn tools_list(d: &Dispatcher) -> J {
    let tools: Vec<J> = d
        .list(OperationKind::Tool)
        .into_iter()
        .map(|t| json!({ "name": t.name, "description": t.description, "inputSchema": t.input_schema }))
        .collect();
    json!({ "tools": tools })
}

fn resources_list(d: &Dispatcher) -> J {
    let resources: Vec<J> = d
        .list(OperationKind::Resource)
        .into_iter()
        .map(|r| json!({ "uri": r.name, "name": r.name, "description": r.description, "mimeType": r.mime_type }))
        .collect();
    json!({ "resources": resources })
}

enum CallError {
    BadParams(String),
    Dispatch(DispatchError),
}

async fn call(d: &Dispatcher, kind: OperationKind, key: &str, params: &J) -> Result<J, CallError> {
    let name = params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CallError::BadParams(format!("missing {key}")))?;
    let args = params.get("arguments").unwrap_or(&J::Null);
    d.dispatch_kind(kind, name, args)
        .await
        .map(|resp| resp.body)
        .map_err(CallError::Dispatch)
}

fn reply(id: J, res: Result<J, CallError>) -> RpcResp {
    match res {
        Ok(out) => http_json::ok(id, out).0,
        Err(CallError::BadParams(msg)) => http_json::error(id, INVALID_PARAMS, msg).0,
        Err(CallError::Dispatch(e)) => {
            let resp = http_json::from_dispatch_error(id, e).0;
            tracing::warn!(response = ?resp, "dispatch error response");
            resp
        }
    }
}

/// Returns `None` for notifications, which get no reply.
pub async fn handle(d: &Dispatcher, req: RpcReq) -> Option<RpcResp> {
    if req.jsonrpc != JSONRPC_VERSION {
        let id = req.id.unwrap_or(J::Null);
        let msg = format!("unsupported jsonrpc version: {}", req.jsonrpc);
        return Some(http_json::error(id, INVALID_REQUEST, msg).0);
    }
    let notification = req.is_notification();
    let resp = route(d, req).await;
    if notification {
        tracing::debug!(response = ?resp, "dropping reply to notification");
        return None;
    }
    Some(resp)
}

async fn route(d: &Dispatcher, req: RpcReq) -> RpcResp {
    let id = req.id.clone().unwrap_or(J::Null);
    match req.method.as_str() {
        "initialize" => http_json::ok(id, initialize(d)).0,
        "shutdown" => http_json::ok(id, J::Null).0,
        "tools.list" | "tools/list" => http_json::ok(id, tools_list(d)).0,
        "resources.list" | "resources/list" => http_json::ok(id, resources_list(d)).0,
        "tools.call" | "tools/call" => {
            reply(id, call(d, OperationKind::Tool, "name", &req.params).await)
        }
        "resources.read" | "resources/read" => {
            reply(id, call(d, OperationKind::Resource, "uri", &req.params).await)
        }
        _ => http_json::error(id, METHOD_NOT_FOUND, format!("unknown method: {}", req.method)).0,
    }
}

// HTTP handler
pub async fn http(
    State(d): State<Dispatcher>,
    body: Result<Json<RpcReq>, JsonRejection>,
) -> HttpResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejecting malformed request");
            return (
                StatusCode::BAD_REQUEST,
                http_json::parse_error(format!("parse error: {rejection}")),
            )
                .into_response();
        }
    };
    tracing::debug!(method = %req.method, id = ?req.id, "HTTP handler invoked");
    match handle(&d, req).await {
        Some(resp) => {
            tracing::debug!(response = ?resp, "HTTP handler completed");
            Json(resp).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}
