use log::{debug, warn};

use crate::{
    hash::hash_tx,
    tags::{encode_tags, is_well_known},
    types::{CrossChainTx, RelayEvent, Tag},
    Error, Result,
};

/// 将已确认的源链交易转换为中继事件
pub fn transform(tx: &CrossChainTx) -> Result<RelayEvent> {
    transform_with_tags(tx, Vec::new())
}

/// 同 [`transform`]，并在协议标签之后附加透传标签。
///
/// 与协议键冲突（大小写不敏感）的透传标签会被丢弃。
pub fn transform_with_tags(
    tx: &CrossChainTx,
    extra: impl IntoIterator<Item = Tag>,
) -> Result<RelayEvent> {
    if tx.block_height < 1 {
        return Err(Error::Conversion(format!(
            "Invalid block height: {}",
            tx.block_height
        )));
    }
    let index = u32::try_from(tx.tx_index)
        .map_err(|_| Error::Conversion(format!("Invalid tx index: {}", tx.tx_index)))?;
    if tx.sequence < 0 {
        return Err(Error::Conversion(format!("Invalid sequence: {}", tx.sequence)));
    }

    let hash = hash_tx(tx);
    let mut tags = encode_tags(tx, &hash);
    for tag in extra {
        if is_well_known(&tag.key) {
            warn!("Dropping pass-through tag that shadows protocol key: {}", tag.key);
            continue;
        }
        tags.push(tag);
    }

    debug!(
        "Transformed tx {} -> {} sequence {} at height {} index {}",
        tx.from, tx.to, tx.sequence, tx.block_height, index
    );

    Ok(RelayEvent {
        height: tx.block_height,
        index,
        tags,
    })
}
