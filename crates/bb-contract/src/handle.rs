//! Typed handle over the deployed voting contract. Reads come back as plain
//! values, writes resolve to the transaction receipt.

use bb_provider::{CallRequest, Provider, SendRequest};
use bb_types::{Address, Candidate, NetworkId, TxReceipt};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{ContractArtifact, ContractError, ops};

#[derive(Clone)]
pub struct VotingContract {
    name: String,
    address: Address,
    provider: Arc<dyn Provider>,
}

impl VotingContract {
    /// Resolves the deployment address for `network` and checks the artifact
    /// actually exposes every operation the page relies on.
    pub fn bind(
        artifact: &ContractArtifact,
        provider: Arc<dyn Provider>,
        network: &NetworkId,
    ) -> Result<Self, ContractError> {
        artifact.ensure_operations()?;
        let address = artifact
            .address_on(network)
            .ok_or_else(|| ContractError::NotDeployed {
                name: artifact.contract_name.clone(),
                network: network.0.clone(),
            })?;
        Ok(Self {
            name: artifact.contract_name.clone(),
            address,
            provider,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    async fn read(&self, method: &str, args: Vec<Value>) -> Result<Value, ContractError> {
        let value = self
            .provider
            .call(CallRequest {
                to: self.address.clone(),
                method: method.to_owned(),
                args,
            })
            .await?;
        Ok(value)
    }

    async fn write(
        &self,
        method: &str,
        args: Vec<Value>,
        from: &Address,
    ) -> Result<TxReceipt, ContractError> {
        let receipt = self
            .provider
            .send(SendRequest {
                to: self.address.clone(),
                method: method.to_owned(),
                args,
                from: from.clone(),
            })
            .await?;
        Ok(receipt)
    }

    pub async fn vote_topic(&self) -> Result<String, ContractError> {
        let value = self.read(ops::VOTE_TOPIC, Vec::new()).await?;
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| malformed(ops::VOTE_TOPIC, "expected a string"))
    }

    pub async fn candidates_count(&self) -> Result<u64, ContractError> {
        let value = self.read(ops::CANDIDATES_COUNT, Vec::new()).await?;
        value
            .as_u64()
            .ok_or_else(|| malformed(ops::CANDIDATES_COUNT, "expected an unsigned count"))
    }

    pub async fn candidate(&self, id: u64) -> Result<Candidate, ContractError> {
        let value = self.read(ops::CANDIDATES, vec![json!(id)]).await?;
        decode_candidate(&value)
    }

    pub async fn has_voted(&self, account: &Address) -> Result<bool, ContractError> {
        let value = self.read(ops::VOTERS, vec![json!(account.0)]).await?;
        value
            .as_bool()
            .ok_or_else(|| malformed(ops::VOTERS, "expected a boolean flag"))
    }

    pub async fn set_vote_topic(
        &self,
        topic: &str,
        from: &Address,
    ) -> Result<TxReceipt, ContractError> {
        self.write(ops::SET_VOTE_TOPIC, vec![json!(topic)], from)
            .await
    }

    pub async fn add_new_candidate(
        &self,
        name: &str,
        from: &Address,
    ) -> Result<TxReceipt, ContractError> {
        self.write(ops::ADD_NEW_CANDIDATE, vec![json!(name)], from)
            .await
    }

    pub async fn vote(
        &self,
        candidate_id: u64,
        from: &Address,
    ) -> Result<TxReceipt, ContractError> {
        self.write(ops::VOTE, vec![json!(candidate_id)], from).await
    }
}

fn malformed(method: &str, detail: &str) -> ContractError {
    ContractError::Malformed {
        method: method.to_owned(),
        detail: detail.to_owned(),
    }
}

// Contract structs arrive as positional tuples: [id, name, voteCount].
fn decode_candidate(value: &Value) -> Result<Candidate, ContractError> {
    let fields = value
        .as_array()
        .ok_or_else(|| malformed(ops::CANDIDATES, "expected a positional tuple"))?;
    let id = fields
        .first()
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed(ops::CANDIDATES, "tuple slot 0 is not an id"))?;
    let name = fields
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(ops::CANDIDATES, "tuple slot 1 is not a name"))?
        .to_owned();
    let vote_count = fields
        .get(2)
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed(ops::CANDIDATES, "tuple slot 2 is not a tally"))?;
    Ok(Candidate {
        id,
        name,
        vote_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_provider::mock::InMemoryNode;
    use crate::{AbiEntry, NetworkEntry};
    use std::collections::HashMap;

    const DEPLOYED_AT: &str = "0x5091eB48585F0184F59B7cf62Ede3e2a9E2b305c";

    fn artifact() -> ContractArtifact {
        ContractArtifact {
            contract_name: "Vote".to_owned(),
            abi: ops::REQUIRED.iter().map(|op| AbiEntry::function(op)).collect(),
            networks: HashMap::from([(
                "5777".to_owned(),
                NetworkEntry {
                    address: DEPLOYED_AT.to_owned(),
                },
            )]),
        }
    }

    fn bound(node: &Arc<InMemoryNode>) -> VotingContract {
        VotingContract::bind(
            &artifact(),
            node.clone() as Arc<dyn Provider>,
            &NetworkId("5777".to_owned()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reads_decode_into_typed_values() {
        let node = Arc::new(InMemoryNode::new());
        node.seed_topic("Best Pizza");
        node.seed_candidate("Pepperoni", 3);
        let contract = bound(&node);

        assert_eq!(contract.name(), "Vote");
        assert_eq!(contract.address().0, DEPLOYED_AT);
        assert_eq!(contract.vote_topic().await.unwrap(), "Best Pizza");
        assert_eq!(contract.candidates_count().await.unwrap(), 1);
        assert_eq!(
            contract.candidate(1).await.unwrap(),
            Candidate {
                id: 1,
                name: "Pepperoni".to_owned(),
                vote_count: 3,
            }
        );
        assert!(
            !contract
                .has_voted(&Address("0xAA".to_owned()))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn writes_carry_the_sender_to_the_provider() {
        let node = Arc::new(InMemoryNode::new());
        let contract = bound(&node);
        let from = Address("0xAA".to_owned());

        let receipt = contract.set_vote_topic("Best Pasta", &from).await.unwrap();
        assert!(receipt.status.is_success());
        assert_eq!(node.topic(), "Best Pasta");

        contract.add_new_candidate("Carbonara", &from).await.unwrap();
        contract.vote(1, &from).await.unwrap();
        assert!(node.has_voter("0xAA"));

        let sent = node.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|req| req.from.0 == "0xAA"));
        assert!(sent.iter().all(|req| req.to.0 == DEPLOYED_AT));
    }

    #[tokio::test]
    async fn binding_fails_off_network() {
        let node = Arc::new(InMemoryNode::new());
        let err = VotingContract::bind(
            &artifact(),
            node as Arc<dyn Provider>,
            &NetworkId("1".to_owned()),
        )
        .err()
        .unwrap();
        match err {
            ContractError::NotDeployed { name, network } => {
                assert_eq!(name, "Vote");
                assert_eq!(network, "1");
            }
            other => panic!("expected not-deployed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn binding_fails_on_truncated_abi() {
        let node = Arc::new(InMemoryNode::new());
        let mut artifact = artifact();
        artifact.abi.retain(|entry| entry.name != ops::VOTERS);
        let err = VotingContract::bind(
            &artifact,
            node as Arc<dyn Provider>,
            &NetworkId("5777".to_owned()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ContractError::MissingOperation { .. }));
    }

    #[tokio::test]
    async fn malformed_tuple_is_reported() {
        let err = decode_candidate(&serde_json::json!({"id": 1})).unwrap_err();
        assert!(matches!(err, ContractError::Malformed { .. }));

        let err = decode_candidate(&serde_json::json!([1, 2, 3])).unwrap_err();
        match err {
            ContractError::Malformed { method, detail } => {
                assert_eq!(method, "candidates");
                assert!(detail.contains("slot 1"));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }
}
