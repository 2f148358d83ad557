//! In-memory provider with a tiny simulated voting contract behind it.
//! Drives the session and contract tests without a node.

use async_trait::async_trait;
use bb_types::{Address, Candidate, ReceiptStatus, TxReceipt};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::{CallRequest, Provider, ProviderError, SendRequest, methods};

#[derive(Default)]
pub struct InMemoryNode {
    state: Mutex<NodeState>,
}

#[derive(Default)]
struct NodeState {
    coinbase: Option<Address>,
    accounts: Vec<Address>,
    topic: String,
    candidates: Vec<Candidate>,
    voters: HashMap<String, bool>,
    send_status: Option<ReceiptStatus>,
    failing: HashSet<String>,
    counts: HashMap<String, usize>,
    sent: Vec<SendRequest>,
    next_tx: u64,
}

impl InMemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_coinbase(&self, addr: &str) {
        let mut state = self.state.lock().unwrap();
        state.coinbase = Some(Address(addr.to_owned()));
    }

    pub fn push_account(&self, addr: &str) {
        let mut state = self.state.lock().unwrap();
        state.accounts.push(Address(addr.to_owned()));
    }

    pub fn seed_topic(&self, topic: &str) {
        let mut state = self.state.lock().unwrap();
        state.topic = topic.to_owned();
    }

    pub fn seed_candidate(&self, name: &str, votes: u64) {
        let mut state = self.state.lock().unwrap();
        let id = state.candidates.len() as u64 + 1;
        state.candidates.push(Candidate {
            id,
            name: name.to_owned(),
            vote_count: votes,
        });
    }

    pub fn set_voter(&self, addr: &str, voted: bool) {
        let mut state = self.state.lock().unwrap();
        state.voters.insert(addr.to_owned(), voted);
    }

    /// Receipt status handed back by every following `send`. `None` restores
    /// the default confirmed status.
    pub fn set_send_status(&self, status: Option<ReceiptStatus>) {
        let mut state = self.state.lock().unwrap();
        state.send_status = status;
    }

    pub fn fail_on(&self, method: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing.insert(method.to_owned());
    }

    pub fn clear_failure(&self, method: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing.remove(method);
    }

    pub fn call_count(&self, method: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.counts.get(method).copied().unwrap_or(0)
    }

    pub fn sent(&self) -> Vec<SendRequest> {
        let state = self.state.lock().unwrap();
        state.sent.clone()
    }

    pub fn topic(&self) -> String {
        let state = self.state.lock().unwrap();
        state.topic.clone()
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        let state = self.state.lock().unwrap();
        state.candidates.clone()
    }

    pub fn has_voter(&self, addr: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.voters.get(addr).copied().unwrap_or(false)
    }

    fn begin(&self, method: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        *state.counts.entry(method.to_owned()).or_insert(0) += 1;
        if state.failing.contains(method) {
            if method == methods::REQUEST_ACCOUNTS {
                return Err(ProviderError::AccessDenied);
            }
            return Err(ProviderError::Node {
                code: -32000,
                message: format!("{method} failed"),
            });
        }
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Provider for InMemoryNode {
    fn label(&self) -> &str {
        "in-memory"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.begin(methods::REQUEST_ACCOUNTS)?;
        let state = self.state.lock().unwrap();
        Ok(state.accounts.clone())
    }

    async fn coinbase(&self) -> Result<Address, ProviderError> {
        self.begin(methods::COINBASE)?;
        let state = self.state.lock().unwrap();
        state.coinbase.clone().ok_or(ProviderError::Node {
            code: -32000,
            message: "coinbase unavailable".to_owned(),
        })
    }

    async fn call(&self, req: CallRequest) -> Result<Value, ProviderError> {
        self.begin(&req.method)?;
        let state = self.state.lock().unwrap();
        match req.method.as_str() {
            "voteTopic" => Ok(Value::String(state.topic.clone())),
            "candidatesCount" => Ok(json!(state.candidates.len() as u64)),
            "candidates" => {
                let id = req.args.first().and_then(Value::as_u64).unwrap_or(0);
                match state.candidates.iter().find(|c| c.id == id) {
                    Some(c) => Ok(json!([c.id, c.name, c.vote_count])),
                    // Solidity mappings hand back a zeroed entry for unknown keys.
                    None => Ok(json!([0, "", 0])),
                }
            }
            "voters" => {
                let addr = req.args.first().and_then(Value::as_str).unwrap_or("");
                Ok(json!(state.voters.get(addr).copied().unwrap_or(false)))
            }
            other => Err(ProviderError::Node {
                code: -32601,
                message: format!("unknown read {other}"),
            }),
        }
    }

    async fn send(&self, req: SendRequest) -> Result<TxReceipt, ProviderError> {
        self.begin(&req.method)?;
        let mut state = self.state.lock().unwrap();
        let status = state
            .send_status
            .clone()
            .unwrap_or_else(ReceiptStatus::success);

        if status.is_success() {
            match req.method.as_str() {
                "setVoteTopic" => {
                    state.topic = req
                        .args
                        .first()
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned();
                }
                "addNewCandidate" => {
                    let id = state.candidates.len() as u64 + 1;
                    let name = req
                        .args
                        .first()
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned();
                    state.candidates.push(Candidate {
                        id,
                        name,
                        vote_count: 0,
                    });
                }
                "vote" => {
                    let id = req.args.first().and_then(Value::as_u64).unwrap_or(0);
                    if let Some(candidate) = state.candidates.iter_mut().find(|c| c.id == id) {
                        candidate.vote_count += 1;
                        state.voters.insert(req.from.0.clone(), true);
                    }
                }
                other => {
                    return Err(ProviderError::Node {
                        code: -32601,
                        message: format!("unknown write {other}"),
                    });
                }
            }
        }

        state.next_tx += 1;
        let receipt = TxReceipt {
            transaction_hash: format!("0x{:064x}", state.next_tx),
            status,
        };
        state.sent.push(req);
        Ok(receipt)
    }
}
