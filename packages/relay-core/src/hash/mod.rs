use sha2::{Digest, Sha256};

use crate::types::CrossChainTx;

/// 哈希域分隔符，两端必须一致
const HASH_DOMAIN: &[u8] = b"qcp-relay/tx-hash/v1";

pub type TxHash = [u8; 32];

/// 计算交易的规范哈希。
///
/// 只覆盖 `from`、`to`、`sequence`、`block_height` 四个字段；
/// `tx_index` 与签名不参与计算。字符串按 u64 大端长度前缀编码，
/// 整数按 i64 大端编码。
pub fn hash_tx(tx: &CrossChainTx) -> TxHash {
    let mut hasher = Sha256::new();
    hasher.update(HASH_DOMAIN);
    update_str(&mut hasher, &tx.from);
    update_str(&mut hasher, &tx.to);
    hasher.update(tx.sequence.to_be_bytes());
    hasher.update(tx.block_height.to_be_bytes());
    hasher.finalize().into()
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

pub fn bytes_to_hex_str(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn hex_str_to_bytes(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(value)
}
