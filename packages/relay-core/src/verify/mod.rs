use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    hash::hash_tx,
    signer::{parse_public_key, CodecKind, TxCodec},
    tags::construct_from_tags,
    types::{Channel, CrossChainTx, RelayEvent},
    Error, Result,
};

/// 重新计算哈希并逐字节比较，任一字段不同即返回 false
pub fn verify(received_tx: &CrossChainTx, claimed_hash: &[u8]) -> bool {
    hash_tx(received_tx).as_slice() == claimed_hash
}

/// 校验事件标签与交易一致：from/to/sequence、高度以及哈希
pub fn verify_event(tx: &CrossChainTx, event: &RelayEvent) -> Result<bool> {
    check_event(tx, event).map(|reason| reason.is_none())
}

fn check_event(tx: &CrossChainTx, event: &RelayEvent) -> Result<Option<RejectReason>> {
    let decoded = construct_from_tags(&event.tags)?;
    if decoded.from != tx.from || decoded.to != tx.to || decoded.sequence != tx.sequence {
        return Ok(Some(RejectReason::FieldMismatch));
    }
    if event.height != tx.block_height {
        return Ok(Some(RejectReason::HeightMismatch));
    }
    if !verify(tx, &decoded.hash) {
        return Ok(Some(RejectReason::HashMismatch));
    }
    Ok(None)
}

/// 校验交易附带的签名。未签名返回 `Ok(false)`。
pub fn verify_tx_signature(tx: &CrossChainTx, codec: &dyn TxCodec) -> Result<bool> {
    let Some(sig) = &tx.signature else {
        return Ok(false);
    };
    let key = match parse_public_key(&sig.pubkey) {
        Ok(key) => key,
        Err(e) => {
            debug!("Malformed signer public key: {}", e);
            return Ok(false);
        }
    };
    let signature = match Signature::from_slice(&sig.signature) {
        Ok(signature) => signature,
        Err(e) => {
            debug!("Malformed signature bytes: {}", e);
            return Ok(false);
        }
    };
    let message = codec.sign_bytes(tx)?;
    Ok(key.verify(&message, &signature).is_ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnknownChannel,
    FieldMismatch,
    HeightMismatch,
    HashMismatch,
    MissingSignature,
    InvalidSignature,
    UntrustedSigner,
    Replay { last: i64, got: i64 },
    SequenceGap { expected: i64, got: i64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::UnknownChannel => write!(f, "unknown channel"),
            RejectReason::FieldMismatch => write!(f, "event fields do not match transaction"),
            RejectReason::HeightMismatch => write!(f, "event height does not match transaction"),
            RejectReason::HashMismatch => write!(f, "hash mismatch"),
            RejectReason::MissingSignature => write!(f, "missing signature"),
            RejectReason::InvalidSignature => write!(f, "invalid signature"),
            RejectReason::UntrustedSigner => write!(f, "signer is not trusted"),
            RejectReason::Replay { last, got } => {
                write!(f, "replayed sequence {} (last applied {})", got, last)
            }
            RejectReason::SequenceGap { expected, got } => {
                write!(f, "sequence gap: expected {}, got {}", expected, got)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// 按通道记录已应用的最大序号
#[derive(Debug, Default)]
pub struct SequenceTracker {
    strict: bool,
    last: HashMap<Channel, i64>,
}

impl SequenceTracker {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            last: HashMap::new(),
        }
    }

    pub fn last_sequence(&self, channel: &Channel) -> Option<i64> {
        self.last.get(channel).copied()
    }

    pub fn check(&self, channel: &Channel, sequence: i64) -> std::result::Result<(), RejectReason> {
        let last = self.last_sequence(channel).unwrap_or(0);
        if sequence <= last {
            return Err(RejectReason::Replay { last, got: sequence });
        }
        if self.strict && sequence != last + 1 {
            return Err(RejectReason::SequenceGap {
                expected: last + 1,
                got: sequence,
            });
        }
        Ok(())
    }

    pub fn record(&mut self, channel: Channel, sequence: i64) {
        let entry = self.last.entry(channel).or_insert(0);
        if sequence > *entry {
            *entry = sequence;
        }
    }
}

/// 验证器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub codec: CodecKind,
    pub require_signature: bool,
    pub strict_sequence: bool,
    pub trusted_signers: Vec<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::Bcs,
            require_signature: true,
            strict_sequence: true,
            trusted_signers: Vec::new(),
        }
    }
}

impl VerifierConfig {
    pub fn trusted_keys(&self) -> Result<Vec<VerifyingKey>> {
        self.trusted_signers
            .iter()
            .map(|hex_key| {
                let bytes = hex::decode(hex_key.trim())
                    .map_err(|e| Error::Config(format!("Invalid trusted signer {}: {}", hex_key, e)))?;
                parse_public_key(&bytes)
                    .map_err(|e| Error::Config(format!("Invalid trusted signer {}: {}", hex_key, e)))
            })
            .collect()
    }
}

/// 目标链侧的中继校验器：哈希、签名、通道序号
pub struct RelayVerifier {
    config: VerifierConfig,
    codec: Box<dyn TxCodec + Send + Sync>,
    trusted: Vec<VerifyingKey>,
    sequences: SequenceTracker,
}

impl RelayVerifier {
    pub fn new(config: VerifierConfig) -> Result<Self> {
        let trusted = config.trusted_keys()?;
        debug!(
            "Creating relay verifier: codec={:?}, {} trusted signers",
            config.codec,
            trusted.len()
        );
        Ok(Self {
            codec: config.codec.codec(),
            sequences: SequenceTracker::new(config.strict_sequence),
            trusted,
            config,
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn last_sequence(&self, channel: &Channel) -> Option<i64> {
        self.sequences.last_sequence(channel)
    }

    /// 校验中继交易，通过后推进通道序号
    pub fn accept(&mut self, tx: &CrossChainTx, event: &RelayEvent) -> Result<Verdict> {
        let channel = tx.channel();
        if let Some(reason) = self.check(tx, event, &channel)? {
            warn!(
                "Rejected relay on {} sequence {}: {}",
                channel, tx.sequence, reason
            );
            return Ok(Verdict::Rejected(reason));
        }

        self.sequences.record(channel.clone(), tx.sequence);
        info!("Accepted relay on {} sequence {}", channel, tx.sequence);
        Ok(Verdict::Accepted)
    }

    fn check(
        &self,
        tx: &CrossChainTx,
        event: &RelayEvent,
        channel: &Channel,
    ) -> Result<Option<RejectReason>> {
        if let Some(reason) = check_event(tx, event)? {
            return Ok(Some(reason));
        }

        if self.config.require_signature {
            let Some(sig) = &tx.signature else {
                return Ok(Some(RejectReason::MissingSignature));
            };
            if !verify_tx_signature(tx, self.codec.as_ref())? {
                return Ok(Some(RejectReason::InvalidSignature));
            }
            if !self.trusted.is_empty() {
                let trusted = parse_public_key(&sig.pubkey)
                    .map(|key| self.trusted.contains(&key))
                    .unwrap_or(false);
                if !trusted {
                    return Ok(Some(RejectReason::UntrustedSigner));
                }
            }
        }

        Ok(self.sequences.check(channel, tx.sequence).err())
    }
}
