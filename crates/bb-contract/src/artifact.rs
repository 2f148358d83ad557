//! Build-artifact descriptor as emitted by contract toolchains: the contract
//! name, its ABI, and a per-network deployment map.

use bb_types::{Address, NetworkId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ContractError, ops};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractArtifact {
    #[serde(rename = "contractName")]
    pub contract_name: String,
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    #[serde(default)]
    pub networks: HashMap<String, NetworkEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub constant: bool,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub address: String,
}

impl AbiEntry {
    pub fn function(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: "function".to_owned(),
            constant: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

impl ContractArtifact {
    pub fn from_json(raw: &str) -> Result<Self, ContractError> {
        serde_json::from_str(raw).map_err(|e| ContractError::Artifact(e.to_string()))
    }

    /// Deployment address recorded for the given network, if any.
    pub fn address_on(&self, network: &NetworkId) -> Option<Address> {
        self.networks
            .get(&network.0)
            .map(|entry| Address(entry.address.clone()))
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.abi
            .iter()
            .any(|entry| entry.kind == "function" && entry.name == name)
    }

    pub fn ensure_operations(&self) -> Result<(), ContractError> {
        for op in ops::REQUIRED {
            if !self.has_operation(op) {
                return Err(ContractError::MissingOperation {
                    name: self.contract_name.clone(),
                    operation: op.to_owned(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"{
        "contractName": "Vote",
        "abi": [
            {"name": "voteTopic", "type": "function", "constant": true, "inputs": [], "outputs": [{"name": "", "type": "string"}]},
            {"name": "candidatesCount", "type": "function", "constant": true, "inputs": [], "outputs": [{"name": "", "type": "uint256"}]},
            {"name": "candidates", "type": "function", "constant": true, "inputs": [{"name": "", "type": "uint256"}], "outputs": []},
            {"name": "voters", "type": "function", "constant": true, "inputs": [{"name": "", "type": "address"}], "outputs": []},
            {"name": "setVoteTopic", "type": "function", "inputs": [{"name": "_topic", "type": "string"}], "outputs": []},
            {"name": "addNewCandidate", "type": "function", "inputs": [{"name": "_name", "type": "string"}], "outputs": []},
            {"name": "vote", "type": "function", "inputs": [{"name": "_candidateId", "type": "uint256"}], "outputs": []},
            {"name": "votedEvent", "type": "event", "inputs": [{"name": "_candidateId", "type": "uint256"}]}
        ],
        "bytecode": "0x6080",
        "networks": {
            "5777": {"address": "0x5091eB48585F0184F59B7cf62Ede3e2a9E2b305c", "events": {}}
        }
    }"#;

    #[test]
    fn parses_toolchain_output_and_resolves_deployment() {
        let artifact = ContractArtifact::from_json(RAW).unwrap();
        assert_eq!(artifact.contract_name, "Vote");
        assert!(artifact.ensure_operations().is_ok());

        let addr = artifact.address_on(&NetworkId("5777".to_owned())).unwrap();
        assert_eq!(addr.0, "0x5091eB48585F0184F59B7cf62Ede3e2a9E2b305c");
        assert!(artifact.address_on(&NetworkId("1".to_owned())).is_none());
    }

    #[test]
    fn events_do_not_count_as_operations() {
        let artifact = ContractArtifact::from_json(RAW).unwrap();
        assert!(!artifact.has_operation("votedEvent"));
    }

    #[test]
    fn missing_operation_is_reported_by_name() {
        let mut artifact = ContractArtifact::from_json(RAW).unwrap();
        artifact.abi.retain(|entry| entry.name != ops::VOTE);
        match artifact.ensure_operations() {
            Err(ContractError::MissingOperation { name, operation }) => {
                assert_eq!(name, "Vote");
                assert_eq!(operation, "vote");
            }
            other => panic!("expected missing operation, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_an_artifact_error() {
        assert!(matches!(
            ContractArtifact::from_json("{"),
            Err(ContractError::Artifact(_))
        ));
    }
}
