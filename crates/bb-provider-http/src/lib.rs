use async_trait::async_trait;
use bb_provider::rpc::{self, CallParams, RpcRequest, RpcResponse, SendParams};
use bb_provider::{CallRequest, Provider, ProviderError, SendRequest, methods};
use bb_types::{Address, TxReceipt};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

pub const DEV_NODE: &str = "dev-node";

/// Native JSON-RPC client for a local development node.
///
/// Reads `BALLOT_NODE_URL` from environment at construction time
/// (default: `http://localhost:7545`).
pub struct HttpProvider {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl Default for HttpProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("BALLOT_NODE_URL").ok())
            .unwrap_or_else(|| "http://localhost:7545".to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn rpc(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::new(id, method, params);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("{method} transport: {e}")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(rpc::failure_from_body(method, status.as_u16(), &text));
        }

        let parsed: RpcResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Decode(format!("{method} response: {e}")))?;
        parsed.into_result()
    }

    fn params_for<T: Serialize>(method: &str, payload: T) -> Result<Vec<Value>, ProviderError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| ProviderError::Decode(format!("{method} params: {e}")))?;
        Ok(vec![value])
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Provider for HttpProvider {
    fn label(&self) -> &str {
        DEV_NODE
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
        let params = Self::params_for(methods::CALL, CallParams::from(&req))?;
        self.rpc(methods::CALL, params).await
    }

    async fn send(&self, req: SendRequest) -> Result<TxReceipt, ProviderError> {
        let params = Self::params_for(methods::SEND, SendParams::from(&req))?;
        let value = self.rpc(methods::SEND, params).await?;
        let receipt = rpc::decode_receipt(methods::SEND, value)?;
        if !receipt.status.is_success() {
            warn!(
                "{} on {} came back with receipt status {}",
                req.method, req.to.0, receipt.status.0
            );
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_contract::{AbiEntry, ContractArtifact, NetworkEntry, VotingContract, ops};
    use bb_types::NetworkId;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn endpoint_is_normalized() {
        let provider = HttpProvider::new(Some("http://localhost:7545/".to_owned()));
        assert_eq!(provider.endpoint(), "http://localhost:7545");
        assert_eq!(provider.label(), DEV_NODE);
    }

    // Requires a running dev node with the Vote contract deployed. Skips
    // silently otherwise:
    //   TEST_NODE_URL=http://localhost:7545 cargo test -p bb-provider-http
    // TEST_CONTRACT_ADDRESS overrides the sample deployment address.
    #[tokio::test]
    async fn live_node_serves_account_and_contract_reads() -> anyhow::Result<()> {
        let Some(endpoint) = std::env::var("TEST_NODE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
        else {
            return Ok(());
        };

        let provider = HttpProvider::new(Some(endpoint));
        let accounts = provider.request_accounts().await?;
        let coinbase = provider.coinbase().await?;
        assert!(
            accounts.iter().any(|a| a.0 == coinbase.0),
            "coinbase should be one of the unlocked accounts"
        );

        let address = std::env::var("TEST_CONTRACT_ADDRESS")
            .unwrap_or_else(|_| "0x5091eB48585F0184F59B7cf62Ede3e2a9E2b305c".to_owned());
        let artifact = ContractArtifact {
            contract_name: "Vote".to_owned(),
            abi: ops::REQUIRED.iter().map(|op| AbiEntry::function(op)).collect(),
            networks: HashMap::from([("5777".to_owned(), NetworkEntry { address })]),
        };
        let contract = VotingContract::bind(
            &artifact,
            Arc::new(provider),
            &NetworkId("5777".to_owned()),
        )?;

        contract.vote_topic().await?;
        let count = contract.candidates_count().await?;
        for id in 1..=count {
            assert_eq!(contract.candidate(id).await?.id, id);
        }
        contract.has_voted(&coinbase).await?;
        Ok(())
    }
}
