use serde::{Deserialize, Serialize};

/// 跨链交易。`sequence` 在每个 `(from, to)` 通道内严格递增。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainTx {
    pub from: String,
    pub to: String,
    pub sequence: i64,
    pub block_height: i64,
    pub tx_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<TxSignature>,
}

impl CrossChainTx {
    pub fn new(from: &str, to: &str, sequence: i64, block_height: i64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            sequence,
            block_height,
            tx_index: 0,
            signature: None,
        }
    }

    pub fn with_index(mut self, tx_index: i64) -> Self {
        self.tx_index = tx_index;
        self
    }

    pub fn channel(&self) -> Channel {
        Channel::new(&self.from, &self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub pubkey: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: Vec<u8>,
}

impl Tag {
    pub fn new(key: &str, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// 中继事件：已确认交易的链无关表示，不引用源交易。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEvent {
    pub height: i64,
    pub index: u32,
    pub tags: Vec<Tag>,
}

/// 从事件标签重建出的类型化视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedEvent {
    pub from: String,
    pub to: String,
    pub sequence: i64,
    pub hash: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Channel {
    pub from: String,
    pub to: String,
}

impl Channel {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}
