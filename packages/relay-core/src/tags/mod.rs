use log::debug;

use crate::{
    hash::{bytes_to_hex_str, hex_str_to_bytes, TxHash},
    types::{CrossChainTx, ReconstructedEvent, Tag},
    Error, Result,
};

// 协议常量：修改需要协议版本升级
pub const QCP_FROM: &str = "qcp.from";
pub const QCP_TO: &str = "qcp.to";
pub const QCP_SEQUENCE: &str = "qcp.sequence";
pub const QCP_HASH: &str = "qcp.hash";

/// 写出顺序固定，编码与解码共用
pub const WELL_KNOWN_KEYS: [&str; 4] = [QCP_FROM, QCP_TO, QCP_SEQUENCE, QCP_HASH];

pub fn is_well_known(key: &str) -> bool {
    WELL_KNOWN_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// 按键查找标签值：大小写不敏感，首个匹配生效，忽略无关标签
pub fn find_tag<'a>(tags: &'a [Tag], key: &str) -> Option<&'a [u8]> {
    tags.iter()
        .find(|tag| tag.key.eq_ignore_ascii_case(key))
        .map(|tag| tag.value.as_slice())
}

/// 生成四个协议标签，顺序为 from、to、sequence、hash
pub fn encode_tags(tx: &CrossChainTx, hash: &TxHash) -> Vec<Tag> {
    vec![
        Tag::new(QCP_FROM, tx.from.as_bytes()),
        Tag::new(QCP_TO, tx.to.as_bytes()),
        Tag::new(QCP_SEQUENCE, tx.sequence.to_string()),
        Tag::new(QCP_HASH, bytes_to_hex_str(hash)),
    ]
}

/// 从通用标签集合重建跨链事件
pub fn construct_from_tags(tags: &[Tag]) -> Result<ReconstructedEvent> {
    let from = required_str(tags, QCP_FROM)?;
    let to = required_str(tags, QCP_TO)?;
    let sequence_text = required_str(tags, QCP_SEQUENCE)?;
    let hash_text = required_str(tags, QCP_HASH)?;

    let sequence = sequence_text
        .trim()
        .parse::<i64>()
        .map_err(|e| malformed(QCP_SEQUENCE, e.to_string()))?;
    let hash = hex_str_to_bytes(hash_text.trim()).map_err(|e| malformed(QCP_HASH, e.to_string()))?;

    debug!("Reconstructed event {} -> {}, sequence {}", from, to, sequence);

    Ok(ReconstructedEvent {
        from,
        to,
        sequence,
        hash,
    })
}

impl ReconstructedEvent {
    pub fn construct_from_tags(tags: &[Tag]) -> Result<Self> {
        construct_from_tags(tags)
    }
}

fn required_str(tags: &[Tag], key: &str) -> Result<String> {
    let value = find_tag(tags, key).ok_or_else(|| Error::MissingTag(key.to_string()))?;
    String::from_utf8(value.to_vec()).map_err(|e| malformed(key, e.to_string()))
}

fn malformed(key: &str, reason: String) -> Error {
    Error::MalformedTag {
        key: key.to_string(),
        reason,
    }
}
