use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address(pub String);

impl Address {
    /// Placeholder shown before any account has been resolved.
    pub fn zero() -> Self {
        Address("0x0".to_owned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub id: u64,
    pub name: String,
    pub vote_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceiptStatus(pub String);

impl ReceiptStatus {
    /// Status code a confirmed transaction carries in its receipt.
    pub const SUCCESS: &'static str = "0x01";

    pub fn success() -> Self {
        ReceiptStatus(Self::SUCCESS.to_owned())
    }

    pub fn failure() -> Self {
        ReceiptStatus("0x00".to_owned())
    }

    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    pub status: ReceiptStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_sentinel_is_exact() {
        assert!(ReceiptStatus::success().is_success());
        assert!(!ReceiptStatus::failure().is_success());
        assert!(!ReceiptStatus("0x1".to_owned()).is_success());
        assert!(!ReceiptStatus("1".to_owned()).is_success());
    }

    #[test]
    fn receipt_decodes_from_node_json() {
        let receipt: TxReceipt = serde_json::from_str(
            r#"{"transactionHash":"0xabc","status":"0x01","blockNumber":7}"#,
        )
        .unwrap();
        assert_eq!(receipt.transaction_hash, "0xabc");
        assert!(receipt.status.is_success());
    }
}
