use axum::Json;

use crate::core::error::DispatchError;
use crate::core::mcp::{err as rpc_err, ok as rpc_ok, RpcResp};
use crate::core::mcp::{APPLICATION_ERROR, METHOD_NOT_FOUND, PARSE_ERROR};

pub fn ok(id: serde_json::Value, result: serde_json::Value) -> Json<RpcResp> {
    Json(rpc_ok(id, result))
}

pub fn error(id: serde_json::Value, code: i32, message: impl Into<String>) -> Json<RpcResp> {
    Json(rpc_err(id, code, message, None))
}

pub fn parse_error(message: impl Into<String>) -> Json<RpcResp> {
    error(serde_json::Value::Null, PARSE_ERROR, message)
}

/// Unknown operations are a caller mismatch (-32601); handler failures are
/// application errors (-32000).
pub fn from_dispatch_error(id: serde_json::Value, err: DispatchError) -> Json<RpcResp> {
    let code = match err {
        DispatchError::OperationNotFound(_) => METHOD_NOT_FOUND,
        DispatchError::Handler(_) => APPLICATION_ERROR,
    };
    error(id, code, err.to_string())
}
