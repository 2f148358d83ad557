//! Connection bootstrap and browser-side transports.
//!
//! An injected wallet (`window.ethereum`) is preferred when the page runs
//! under one; otherwise requests go straight to the local dev node over
//! `fetch`. Both speak the same JSON-RPC envelope as the native client.

use std::cell::Cell;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use bb_provider::rpc::{self, CallParams, RpcRequest, RpcResponse, SendParams};
use bb_provider::{CallRequest, Provider, ProviderError, SendRequest, methods};
use bb_session::Connection;
use bb_types::{Address, TxReceipt};

use crate::dom;

pub const LOCAL_NODE_ENDPOINT: &str = "http://localhost:7545";

#[wasm_bindgen]
extern "C" {
    /// Injected EIP-1193 wallet object (`window.ethereum`).
    pub type InjectedEthereum;

    #[wasm_bindgen(method, catch)]
    fn request(this: &InjectedEthereum, args: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

pub fn detect_injected() -> Option<InjectedEthereum> {
    let window = web_sys::window()?;
    let raw = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str("ethereum")).ok()?;
    if raw.is_undefined() || raw.is_null() {
        return None;
    }
    Some(raw.unchecked_into())
}

/// Builds the page's connection: the injected wallet when one is present,
/// the fixed local dev node otherwise.
pub async fn bootstrap() -> Result<Connection, ProviderError> {
    if let Some(ethereum) = detect_injected() {
        let provider = WalletProvider::new(ethereum);
        let accounts = provider.request_accounts().await?;
        return Ok(Connection {
            account: accounts.into_iter().next(),
            provider: Arc::new(provider),
        });
    }
    Ok(Connection {
        provider: Arc::new(FetchProvider::new(LOCAL_NODE_ENDPOINT)),
        account: None,
    })
}

fn js_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn transport(method: &str, err: &JsValue) -> ProviderError {
    ProviderError::Transport(format!("{method}: {}", js_text(err)))
}

// ── Injected wallet ──

#[derive(Serialize)]
struct RequestArgs<'a> {
    method: &'a str,
    params: &'a [Value],
}

pub struct WalletProvider {
    ethereum: InjectedEthereum,
}

impl WalletProvider {
    pub fn new(ethereum: InjectedEthereum) -> Self {
        Self { ethereum }
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        // Params must cross the bridge as plain objects, not JS Maps, or the
        // wallet serializes them to nothing.
        let args = RequestArgs {
            method,
            params: &params,
        }
        .serialize(&Serializer::json_compatible())
        .map_err(|e| ProviderError::Decode(format!("{method} args: {e}")))?;

        // A synchronous throw means the injected object is not a working
        // EIP-1193 provider at all.
        let promise = self
            .ethereum
            .request(&args)
            .map_err(|_| ProviderError::Unavailable)?;
        let settled = JsFuture::from(promise)
            .await
            .map_err(|e| bridge_error(method, &e))?;
        serde_wasm_bindgen::from_value(settled)
            .map_err(|e| ProviderError::Decode(format!("{method} result: {e}")))
    }
}

// A rejected account request is the user saying no.
fn bridge_error(method: &str, err: &JsValue) -> ProviderError {
    if method == methods::REQUEST_ACCOUNTS {
        return ProviderError::AccessDenied;
    }
    ProviderError::Transport(format!("{method} rejected: {}", js_text(err)))
}

#[async_trait(?Send)]
impl Provider for WalletProvider {
    fn label(&self) -> &str {
        "injected-wallet"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let value = self.request(methods::REQUEST_ACCOUNTS, Vec::new()).await?;
        rpc::decode_accounts(methods::REQUEST_ACCOUNTS, value)
    }

    async fn coinbase(&self) -> Result<Address, ProviderError> {
        // Wallets may not serve eth_coinbase; their account list is the
        // fallback source of truth.
        if let Ok(value) = self.request(methods::COINBASE, Vec::new()).await {
            if value.as_str().is_some() {
                return rpc::decode_address(methods::COINBASE, value);
            }
        }
        let value = self.request(methods::ACCOUNTS, Vec::new()).await?;
        rpc::decode_accounts(methods::ACCOUNTS, value)?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("wallet exposes no accounts".into()))
    }

    async fn call(&self, req: CallRequest) -> Result<Value, ProviderError> {
        let params = serde_json::to_value(CallParams::from(&req))
            .map_err(|e| ProviderError::Decode(format!("{} params: {e}", methods::CALL)))?;
        self.request(methods::CALL, vec![params]).await
    }

    async fn send(&self, req: SendRequest) -> Result<TxReceipt, ProviderError> {
        let params = serde_json::to_value(SendParams::from(&req))
            .map_err(|e| ProviderError::Decode(format!("{} params: {e}", methods::SEND)))?;
        let value = self.request(methods::SEND, vec![params]).await?;
        rpc::decode_receipt(methods::SEND, value)
    }
}

// ── Local dev node over fetch ──

pub struct FetchProvider {
    endpoint: String,
    next_id: Cell<u64>,
}

impl FetchProvider {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            next_id: Cell::new(1),
        }
    }

    async fn rpc(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let payload = serde_json::to_string(&RpcRequest::new(id, method, params))
            .map_err(|e| ProviderError::Decode(format!("{method} params: {e}")))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new().map_err(|e| transport(method, &e))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| transport(method, &e))?;
        opts.set_headers(&headers);
        opts.set_body(&JsValue::from_str(&payload));

        let request = Request::new_with_str_and_init(&self.endpoint, &opts)
            .map_err(|e| transport(method, &e))?;
        let resp_value = JsFuture::from(dom::window().fetch_with_request(&request))
            .await
            .map_err(|e| transport(method, &e))?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| ProviderError::Transport(format!("{method}: not a Response")))?;

        let text = JsFuture::from(resp.text().map_err(|e| transport(method, &e))?)
            .await
            .map_err(|e| transport(method, &e))?;
        let text = text.as_string().unwrap_or_default();

        if !resp.ok() {
            return Err(rpc::failure_from_body(method, resp.status(), &text));
        }

        let parsed: RpcResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Decode(format!("{method} response: {e}")))?;
        parsed.into_result()
    }
}

#[async_trait(?Send)]
impl Provider for FetchProvider {
    fn label(&self) -> &str {
        "local-node"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        // Dev nodes expose unlocked accounts, nothing to approve.
        let value = self.rpc(methods::ACCOUNTS, Vec::new()).await?;
        rpc::decode_accounts(methods::ACCOUNTS, value)
    }

    async fn coinbase(&self) -> Result<Address, ProviderError> {
        let value = self.rpc(methods::COINBASE, Vec::new()).await?;
        rpc::decode_address(methods::COINBASE, value)
    }

    async fn call(&self, req: CallRequest) -> Result<Value, ProviderError> {
        let params = serde_json::to_value(CallParams::from(&req))
            .map_err(|e| ProviderError::Decode(format!("{} params: {e}", methods::CALL)))?;
        self.rpc(methods::CALL, vec![params]).await
    }

    async fn send(&self, req: SendRequest) -> Result<TxReceipt, ProviderError> {
        let params = serde_json::to_value(SendParams::from(&req))
            .map_err(|e| ProviderError::Decode(format!("{} params: {e}", methods::SEND)))?;
        let value = self.rpc(methods::SEND, vec![params]).await?;
        rpc::decode_receipt(methods::SEND, value)
    }
}

/// Fetch a URL and return the body as a plain string.
pub async fn fetch_text(url: &str) -> Result<String, String> {
    let opts = RequestInit::new();
    opts.set_method("GET");

    let request = Request::new_with_str_and_init(url, &opts).map_err(|e| format!("{:?}", e))?;

    let window = dom::window();
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("fetch error: {:?}", e))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "not a Response".to_string())?;

    if !resp.ok() {
        return Err(format!("{} {}: {}", resp.status(), resp.status_text(), url));
    }

    let text = JsFuture::from(resp.text().map_err(|e| format!("{:?}", e))?)
        .await
        .map_err(|e| format!("text error: {:?}", e))?;

    Ok(text.as_string().unwrap_or_default())
}
