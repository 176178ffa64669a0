use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use log::debug;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    types::{CrossChainTx, TxSignature},
    Error, Result,
};

/// Amino 编码的 Ed25519 私钥前缀（含 64 字节长度）
pub const AMINO_PRIVKEY_PREFIX: [u8; 5] = [0xa3, 0x28, 0x89, 0x10, 0x40];
/// Amino 编码的 Ed25519 公钥前缀（含 32 字节长度）
pub const AMINO_PUBKEY_PREFIX: [u8; 5] = [0x16, 0x24, 0xde, 0x64, 0x20];

/// 签名能力：导出公钥并对字节签名
pub trait KeySigner {
    fn public_key(&self) -> Vec<u8>;
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// 序列化能力：生成交易的规范签名字节
pub trait TxCodec {
    fn name(&self) -> &'static str;
    fn sign_bytes(&self, tx: &CrossChainTx) -> Result<Vec<u8>>;
}

/// 签名覆盖的字段，不包含签名本身
#[derive(Debug, Serialize)]
struct SignDoc<'a> {
    from: &'a str,
    to: &'a str,
    sequence: i64,
    block_height: i64,
    tx_index: i64,
}

impl<'a> From<&'a CrossChainTx> for SignDoc<'a> {
    fn from(tx: &'a CrossChainTx) -> Self {
        Self {
            from: &tx.from,
            to: &tx.to,
            sequence: tx.sequence,
            block_height: tx.block_height,
            tx_index: tx.tx_index,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BcsCodec;

impl TxCodec for BcsCodec {
    fn name(&self) -> &'static str {
        "bcs"
    }

    fn sign_bytes(&self, tx: &CrossChainTx) -> Result<Vec<u8>> {
        bcs::to_bytes(&SignDoc::from(tx)).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl TxCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn sign_bytes(&self, tx: &CrossChainTx) -> Result<Vec<u8>> {
        serde_json::to_vec(&SignDoc::from(tx)).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    #[default]
    Bcs,
    Json,
}

impl CodecKind {
    pub fn codec(&self) -> Box<dyn TxCodec + Send + Sync> {
        match self {
            CodecKind::Bcs => Box::new(BcsCodec),
            CodecKind::Json => Box::new(JsonCodec),
        }
    }
}

impl FromStr for CodecKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bcs" => Ok(CodecKind::Bcs),
            "json" => Ok(CodecKind::Json),
            other => Err(Error::Config(format!("Unsupported codec: {}", other))),
        }
    }
}

/// Ed25519 签名器
pub struct Ed25519KeySigner {
    signing_key: SigningKey,
}

impl Ed25519KeySigner {
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(&seed)
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// 支持三种私钥格式：32 字节种子、64 字节 `种子 || 公钥`、Amino 前缀形式
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = bytes.strip_prefix(&AMINO_PRIVKEY_PREFIX[..]).unwrap_or(bytes);
        match raw.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(raw);
                Ok(Self::from_seed(&seed))
            }
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(raw);
                let signing_key = SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|e| Error::Signing(format!("Invalid key pair: {}", e)))?;
                Ok(Self { signing_key })
            }
            len => Err(Error::Signing(format!(
                "Invalid private key length: {} bytes",
                len
            ))),
        }
    }

    pub fn from_hex(private_key: &str) -> Result<Self> {
        let bytes = hex::decode(private_key.trim())
            .map_err(|e| Error::Signing(format!("Invalid private key hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn amino_public_key(&self) -> Vec<u8> {
        let mut out = AMINO_PUBKEY_PREFIX.to_vec();
        out.extend_from_slice(&self.public_key_bytes());
        out
    }

    /// 导出 Amino 形式的私钥（用于 keygen 输出）
    pub fn amino_private_key(&self) -> Vec<u8> {
        let mut out = AMINO_PRIVKEY_PREFIX.to_vec();
        out.extend_from_slice(&self.signing_key.to_keypair_bytes());
        out
    }
}

impl KeySigner for Ed25519KeySigner {
    fn public_key(&self) -> Vec<u8> {
        self.public_key_bytes().to_vec()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }
}

/// 解析公钥，接受 32 字节原始形式或 Amino 前缀形式
pub fn parse_public_key(bytes: &[u8]) -> Result<VerifyingKey> {
    let raw = bytes.strip_prefix(&AMINO_PUBKEY_PREFIX[..]).unwrap_or(bytes);
    let key: [u8; 32] = raw
        .try_into()
        .map_err(|_| Error::Signing(format!("Invalid public key length: {} bytes", raw.len())))?;
    VerifyingKey::from_bytes(&key).map_err(|e| Error::Signing(format!("Invalid public key: {}", e)))
}

/// 对交易签名并写入 `signature` 字段，其他字段保持不变
pub fn sign_tx(tx: &mut CrossChainTx, signer: &dyn KeySigner, codec: &dyn TxCodec) -> Result<()> {
    let message = codec.sign_bytes(tx).map_err(|e| match e {
        Error::Signing(msg) => Error::Signing(msg),
        other => Error::Signing(format!("{} codec failed: {}", codec.name(), other)),
    })?;
    let signature = signer.sign(&message)?;

    debug!(
        "Signed tx {} -> {} sequence {} with {} codec",
        tx.from,
        tx.to,
        tx.sequence,
        codec.name()
    );

    tx.signature = Some(TxSignature {
        pubkey: signer.public_key(),
        signature,
    });
    Ok(())
}

pub fn sign_tx_with_key(tx: &mut CrossChainTx, private_key: &str, codec: &dyn TxCodec) -> Result<()> {
    let signer = Ed25519KeySigner::from_hex(private_key)?;
    sign_tx(tx, &signer, codec)
}
