use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_core::{
    construct_from_tags,
    signer::{sign_tx, CodecKind, Ed25519KeySigner},
    transform,
    verify::{verify_event, verify_tx_signature},
    Config, CrossChainTx, RelayEvent,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 验证并解析配置文件
    ValidateConfig {
        /// 配置文件路径
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
    /// 生成新的 Ed25519 密钥
    Keygen,
    /// 输出环境变量中私钥对应的公钥
    Pubkey {
        #[arg(long, value_name = "VAR")]
        key_env: String,
    },
    /// 将已确认交易转换为中继事件
    Transform {
        #[arg(long, value_name = "FILE")]
        tx: PathBuf,
    },
    /// 从中继事件标签重建跨链事件
    Decode {
        #[arg(long, value_name = "FILE")]
        event: PathBuf,
    },
    /// 对交易签名
    Sign {
        #[arg(long, value_name = "FILE")]
        tx: PathBuf,
        #[arg(long, value_name = "VAR")]
        key_env: String,
        #[arg(long, default_value = "bcs")]
        codec: CodecKind,
    },
    /// 校验交易与中继事件是否一致
    Verify {
        #[arg(long, value_name = "FILE")]
        tx: PathBuf,
        #[arg(long, value_name = "FILE")]
        event: PathBuf,
        #[arg(long, default_value = "bcs")]
        codec: CodecKind,
        /// 允许未签名或签名无效的交易通过
        #[arg(long)]
        allow_unsigned: bool,
    },
}

/// 与校验器默认策略一致：事件不一致或签名无效都视为失败
fn verify_outcome(event_ok: bool, signature_ok: bool, allow_unsigned: bool) -> Result<()> {
    if !event_ok {
        warn!("中继事件与交易不一致");
        anyhow::bail!("校验失败: 事件不一致");
    }
    if !signature_ok && !allow_unsigned {
        warn!("交易签名无效或缺失");
        anyhow::bail!("校验失败: 签名无效或缺失");
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("读取文件失败: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("解析 JSON 失败: {:?}", path))
}

fn load_signer(key_env: &str) -> Result<Ed25519KeySigner> {
    let private_key =
        std::env::var(key_env).with_context(|| format!("环境变量 {} 未设置", key_env))?;
    Ok(Ed25519KeySigner::from_hex(&private_key)?)
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateConfig { config } => {
            info!("正在验证配置文件: {:?}", config);
            let config = Config::load(config)?;
            println!("配置文件验证成功!");
            println!("配置内容概要:");
            println!("- 本链: {}", config.chain_id);
            println!("- 通道:");
            for channel in &config.channels {
                println!("  - {}", channel.channel());
            }
            match &config.signer {
                Some(signer) => println!("- 签名私钥环境变量: {}", signer.private_key_env),
                None => println!("- 未配置签名私钥"),
            }
            println!("- 校验器配置:");
            println!("  - 编码: {:?}", config.verifier.codec);
            println!("  - 要求签名: {}", config.verifier.require_signature);
            println!("  - 严格序号: {}", config.verifier.strict_sequence);
            println!("  - 可信签名者数量: {}", config.verifier.trusted_signers.len());
            Ok(())
        }
        Commands::Keygen => {
            let signer = Ed25519KeySigner::generate();
            println!("private_key: {}", hex::encode(signer.amino_private_key()));
            println!("public_key: {}", hex::encode(signer.amino_public_key()));
            Ok(())
        }
        Commands::Pubkey { key_env } => {
            let signer = load_signer(&key_env)?;
            println!("{}", hex::encode(signer.amino_public_key()));
            Ok(())
        }
        Commands::Transform { tx } => {
            let tx: CrossChainTx = read_json(&tx)?;
            let event = transform(&tx)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
            Ok(())
        }
        Commands::Decode { event } => {
            let event: RelayEvent = read_json(&event)?;
            let decoded = construct_from_tags(&event.tags)?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
            Ok(())
        }
        Commands::Sign { tx, key_env, codec } => {
            let mut tx: CrossChainTx = read_json(&tx)?;
            let signer = load_signer(&key_env)?;
            sign_tx(&mut tx, &signer, codec.codec().as_ref())?;
            info!("交易已签名: {} -> {} 序号 {}", tx.from, tx.to, tx.sequence);
            println!("{}", serde_json::to_string_pretty(&tx)?);
            Ok(())
        }
        Commands::Verify {
            tx,
            event,
            codec,
            allow_unsigned,
        } => {
            let tx: CrossChainTx = read_json(&tx)?;
            let event: RelayEvent = read_json(&event)?;

            let event_ok = verify_event(&tx, &event)?;
            let signature_ok = verify_tx_signature(&tx, codec.codec().as_ref())?;
            println!("event: {}", if event_ok { "ok" } else { "mismatch" });
            println!("signature: {}", if signature_ok { "ok" } else { "invalid or missing" });
            verify_outcome(event_ok, signature_ok, allow_unsigned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_outcome() {
        assert!(verify_outcome(true, true, false).is_ok());
        assert!(verify_outcome(true, false, false).is_err());
        assert!(verify_outcome(true, false, true).is_ok());
        assert!(verify_outcome(false, true, true).is_err());
    }

    #[test]
    fn test_verify_flag_parsing() {
        let cli = Cli::try_parse_from([
            "relay-cli", "verify", "--tx", "tx.json", "--event", "event.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify { allow_unsigned, codec, .. } => {
                assert!(!allow_unsigned);
                assert_eq!(codec, CodecKind::Bcs);
            }
            _ => panic!("expected verify command"),
        }
    }
}
