use bb_provider::ProviderError;
use thiserror::Error;

pub mod artifact;
pub mod handle;

pub use artifact::{AbiEntry, ContractArtifact, NetworkEntry};
pub use handle::VotingContract;

/// Operations the voting contract is expected to expose.
pub mod ops {
    pub const VOTE_TOPIC: &str = "voteTopic";
    pub const CANDIDATES_COUNT: &str = "candidatesCount";
    pub const CANDIDATES: &str = "candidates";
    pub const VOTERS: &str = "voters";
    pub const SET_VOTE_TOPIC: &str = "setVoteTopic";
    pub const ADD_NEW_CANDIDATE: &str = "addNewCandidate";
    pub const VOTE: &str = "vote";

    pub const REQUIRED: [&str; 7] = [
        VOTE_TOPIC,
        CANDIDATES_COUNT,
        CANDIDATES,
        VOTERS,
        SET_VOTE_TOPIC,
        ADD_NEW_CANDIDATE,
        VOTE,
    ];
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("artifact parse: {0}")]
    Artifact(String),
    #[error("{name} is not deployed on network {network}")]
    NotDeployed { name: String, network: String },
    #[error("{name} artifact is missing operation {operation}")]
    MissingOperation { name: String, operation: String },
    #[error("{method} returned a malformed value: {detail}")]
    Malformed { method: String, detail: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
