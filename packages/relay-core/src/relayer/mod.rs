use log::{info, warn};

use crate::{
    config::Config,
    signer::{sign_tx, Ed25519KeySigner, TxCodec},
    transform::transform,
    types::{CrossChainTx, RelayEvent},
    verify::{RejectReason, RelayVerifier, Verdict},
    Error,
};

/// 中继组合层：源链侧签名并生成事件，目标链侧校验事件
pub struct Relayer {
    config: Config,
    signer: Option<Ed25519KeySigner>,
    codec: Box<dyn TxCodec + Send + Sync>,
    verifier: RelayVerifier,
}

impl Relayer {
    /// 根据配置创建中继器，私钥从配置指定的环境变量读取
    pub fn new(config: Config) -> Result<Self, Error> {
        let signer = config
            .signer
            .as_ref()
            .map(|signer| signer.load_signer())
            .transpose()?;
        Self::build(config, signer)
    }

    pub fn with_signer(config: Config, signer: Ed25519KeySigner) -> Result<Self, Error> {
        Self::build(config, Some(signer))
    }

    fn build(config: Config, signer: Option<Ed25519KeySigner>) -> Result<Self, Error> {
        config.validate()?;
        let verifier = RelayVerifier::new(config.verifier.clone())?;
        info!(
            "Relayer for chain {} ready, signing {}",
            config.chain_id,
            if signer.is_some() { "enabled" } else { "disabled" }
        );
        Ok(Self {
            codec: config.verifier.codec.codec(),
            config,
            signer,
            verifier,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn public_key(&self) -> Option<[u8; 32]> {
        self.signer.as_ref().map(|s| s.public_key_bytes())
    }

    /// 源链侧：检查通道，签名（若配置了私钥），生成中继事件
    pub fn outbound(&self, tx: &mut CrossChainTx) -> Result<RelayEvent, Error> {
        let channel = tx.channel();
        if !self.config.is_channel_allowed(&channel) {
            return Err(Error::Config(format!("Channel not configured: {}", channel)));
        }
        // 先转换：元数据非法时不修改交易；签名不影响哈希
        let event = transform(tx)?;
        if let Some(signer) = &self.signer {
            sign_tx(tx, signer, self.codec.as_ref())?;
        }
        Ok(event)
    }

    /// 目标链侧：校验中继事件，返回是否可以入账
    pub fn inbound(&mut self, tx: &CrossChainTx, event: &RelayEvent) -> Result<Verdict, Error> {
        let channel = tx.channel();
        if !self.config.is_channel_allowed(&channel) {
            warn!("Rejected relay on unknown channel {}", channel);
            return Ok(Verdict::Rejected(RejectReason::UnknownChannel));
        }
        self.verifier.accept(tx, event)
    }
}
