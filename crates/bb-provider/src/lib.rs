use async_trait::async_trait;
use bb_types::{Address, TxReceipt};
use serde_json::Value;
use thiserror::Error;

pub mod mock;
pub mod rpc;

/// Method names shared by every transport. The browser wallet bridge and the
/// dev-node HTTP client marshal the same capability set through these.
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const COINBASE: &str = "eth_coinbase";
    pub const CALL: &str = "ballot_call";
    pub const SEND: &str = "ballot_send";
}

#[derive(Debug, Clone)]
pub struct CallRequest {
    pub to: Address,
    pub method: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct SendRequest {
    pub to: Address,
    pub method: String,
    pub args: Vec<Value>,
    pub from: Address,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no provider is reachable")]
    Unavailable,
    #[error("account access denied by the wallet")]
    AccessDenied,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Gateway to whatever chain endpoint the page is running against.
///
/// `call` is a free read against contract state. `send` submits a
/// state-mutating transaction and resolves once the node hands back a
/// receipt.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Provider {
    fn label(&self) -> &str;
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;
    async fn coinbase(&self) -> Result<Address, ProviderError>;
    async fn call(&self, req: CallRequest) -> Result<Value, ProviderError>;
    async fn send(&self, req: SendRequest) -> Result<TxReceipt, ProviderError>;
}
