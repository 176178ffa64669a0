pub mod config;
pub mod types;
pub mod hash;
pub mod tags;
pub mod transform;
pub mod signer;
pub mod verify;
pub mod relayer;

pub use config::Config;
pub use types::{Channel, CrossChainTx, ReconstructedEvent, RelayEvent, Tag, TxSignature};
pub use hash::{hash_tx, TxHash};
pub use tags::construct_from_tags;
pub use transform::{transform, transform_with_tags};
pub use signer::{sign_tx, sign_tx_with_key, Ed25519KeySigner, KeySigner, TxCodec};
pub use verify::{verify, verify_event, RejectReason, RelayVerifier, Verdict};
pub use relayer::Relayer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Missing tag: {0}")]
    MissingTag(String),

    #[error("Malformed tag {key}: {reason}")]
    MalformedTag { key: String, reason: String },

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
