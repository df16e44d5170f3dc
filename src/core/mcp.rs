//! JSON-RPC envelope shared by the plain `/rpc` endpoint and its tests.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as J;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const INVALID_PARAMS: i32 = -32602;
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Application error, used when a handler reports a protocol-level failure.
pub const APPLICATION_ERROR: i32 = -32000;

#[derive(Deserialize, Debug)]
pub struct RpcReq {
    pub jsonrpc: String,
    /// `None` when the member is absent (a notification); `Some(Null)` for `"id": null`.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<J>,
    pub method: String,
    #[serde(default)]
    pub params: J,
}

impl RpcReq {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<J>, D::Error> {
    J::deserialize(d).map(Some)
}

#[derive(Serialize, Debug, Clone)]
pub struct RpcResp {
    pub jsonrpc: &'static str,
    pub id: J,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErr>,
}

#[derive(Serialize, Debug, Clone)]
pub struct RpcErr {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<J>,
}

pub fn ok(id: J, result: J) -> RpcResp {
    RpcResp { jsonrpc: "2.0", id, result: Some(result), error: None }
}
pub fn err(id: J, code: i32, msg: impl Into<String>, data: Option<J>) -> RpcResp {
    RpcResp { jsonrpc: "2.0", id, result: None, error: Some(RpcErr { code, message: msg.into(), data }) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_omits_error_field() {
        let s = serde_json::to_value(ok(json!(1), json!("x"))).unwrap();
        assert_eq!(s["result"], "x");
        assert!(s.get("error").is_none());
    }

    #[test]
    fn request_without_params_defaults_to_null() {
        let r: RpcReq = serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#).unwrap();
        assert_eq!(r.id, Some(json!(7)));
        assert!(r.params.is_null());
    }

    #[test]
    fn absent_id_is_a_notification_but_null_id_is_not() {
        let n: RpcReq = serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(n.is_notification());
        let r: RpcReq = serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"tools/list"}"#).unwrap();
        assert_eq!(r.id, Some(J::Null));
    }
}
