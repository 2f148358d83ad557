//! JSON-RPC 2.0 envelope shared by the native HTTP transport and the
//! browser-side fetch transport.

use bb_types::{Address, TxReceipt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CallRequest, ProviderError, SendRequest};

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            method: method.to_owned(),
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    pub fn into_result(self) -> Result<Value, ProviderError> {
        if let Some(err) = self.error {
            return Err(ProviderError::Node {
                code: err.code,
                message: err.message,
            });
        }
        self.result
            .ok_or_else(|| ProviderError::Decode("response carries neither result nor error".into()))
    }
}

/// Positional payload of a `ballot_call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallParams {
    pub to: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl From<&CallRequest> for CallParams {
    fn from(req: &CallRequest) -> Self {
        Self {
            to: req.to.0.clone(),
            method: req.method.clone(),
            args: req.args.clone(),
        }
    }
}

/// Positional payload of a `ballot_send` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendParams {
    pub to: String,
    pub method: String,
    pub args: Vec<Value>,
    pub from: String,
}

impl From<&SendRequest> for SendParams {
    fn from(req: &SendRequest) -> Self {
        Self {
            to: req.to.0.clone(),
            method: req.method.clone(),
            args: req.args.clone(),
            from: req.from.0.clone(),
        }
    }
}

/// Some nodes answer failed requests with a non-2xx status but still put a
/// proper JSON-RPC error object in the body. Surface that error when present.
pub fn failure_from_body(method: &str, status: u16, body: &str) -> ProviderError {
    if let Ok(parsed) = serde_json::from_str::<RpcResponse>(body) {
        if let Some(err) = parsed.error {
            return ProviderError::Node {
                code: err.code,
                message: err.message,
            };
        }
    }
    ProviderError::Transport(format!("{method} returned HTTP {status}: {body}"))
}

pub fn decode_address(method: &str, value: Value) -> Result<Address, ProviderError> {
    match value.as_str() {
        Some(addr) => Ok(Address(addr.to_owned())),
        None => Err(ProviderError::Decode(format!(
            "{method} result is not an address string"
        ))),
    }
}

pub fn decode_accounts(method: &str, value: Value) -> Result<Vec<Address>, ProviderError> {
    let entries = value
        .as_array()
        .ok_or_else(|| ProviderError::Decode(format!("{method} result is not an array")))?;
    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(|addr| Address(addr.to_owned()))
                .ok_or_else(|| {
                    ProviderError::Decode(format!("{method} result holds a non-string entry"))
                })
        })
        .collect()
}

pub fn decode_receipt(method: &str, value: Value) -> Result<TxReceipt, ProviderError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::Decode(format!("{method} receipt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_version_and_positional_params() {
        let req = RpcRequest::new(
            7,
            crate::methods::CALL,
            vec![json!({"to": "0x51", "method": "voteTopic", "args": []})],
        );
        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(wire["jsonrpc"], "2.0");
        assert_eq!(wire["id"], 7);
        assert_eq!(wire["method"], "ballot_call");
        assert_eq!(wire["params"][0]["method"], "voteTopic");
    }

    #[test]
    fn response_error_takes_precedence_over_result() {
        let resp: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":null,"error":{"code":-32601,"message":"no such method"}}"#,
        )
        .unwrap();
        match resp.into_result() {
            Err(ProviderError::Node { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "no such method");
            }
            other => panic!("expected node error, got {other:?}"),
        }
    }

    #[test]
    fn empty_response_is_a_decode_error() {
        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(matches!(resp.into_result(), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn http_failure_prefers_embedded_rpc_error() {
        let err = failure_from_body(
            "ballot_send",
            500,
            r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32000,"message":"revert"}}"#,
        );
        assert!(matches!(err, ProviderError::Node { code: -32000, .. }));

        let err = failure_from_body("ballot_send", 502, "bad gateway");
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn send_params_carry_the_sender() {
        let req = SendRequest {
            to: Address("0x51".to_owned()),
            method: "vote".to_owned(),
            args: vec![json!(2)],
            from: Address("0xAA".to_owned()),
        };
        let wire = serde_json::to_value(SendParams::from(&req)).unwrap();
        assert_eq!(wire["to"], "0x51");
        assert_eq!(wire["from"], "0xAA");
        assert_eq!(wire["args"], json!([2]));
    }

    #[test]
    fn receipt_decode_reports_the_method() {
        let err = decode_receipt("ballot_send", serde_json::json!({"status": "0x01"})).unwrap_err();
        match err {
            ProviderError::Decode(detail) => assert!(detail.starts_with("ballot_send")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
