use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::{signer::Ed25519KeySigner, types::Channel, verify::VerifierConfig, Error};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub from: String,
    pub to: String,
}

impl ChannelConfig {
    pub fn channel(&self) -> Channel {
        Channel::new(&self.from, &self.to)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    /// 存放十六进制私钥的环境变量名，私钥本身不写入配置文件
    pub private_key_env: String,
}

impl SignerConfig {
    pub fn load_signer(&self) -> Result<Ed25519KeySigner, Error> {
        let private_key = std::env::var(&self.private_key_env).map_err(|e| {
            Error::Config(format!(
                "Failed to read private key from {}: {}",
                self.private_key_env, e
            ))
        })?;
        Ed25519KeySigner::from_hex(&private_key)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub chain_id: String,
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub signer: Option<SignerConfig>,
    #[serde(default)]
    pub verifier: VerifierConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, Error> {
        let config_path = config_path.as_ref();
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let is_toml = config_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        let config = if is_toml {
            Self::from_toml_str(&config_str)?
        } else {
            Self::from_json_str(&config_str)?
        };

        log::info!(
            "Loaded relay config for chain {} with {} channels",
            config.chain_id,
            config.channels.len()
        );
        Ok(config)
    }

    pub fn from_json_str(config_str: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(config_str)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(config_str)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.chain_id.trim().is_empty() {
            return Err(Error::Config("Chain id must not be empty".to_string()));
        }

        // 通道配置
        if self.channels.is_empty() {
            return Err(Error::Config("At least one channel must be configured".to_string()));
        }
        let mut seen = HashSet::new();
        for channel in &self.channels {
            if channel.from.trim().is_empty() || channel.to.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Invalid channel: {}",
                    channel.channel()
                )));
            }
            if !seen.insert(channel.channel()) {
                return Err(Error::Config(format!(
                    "Duplicate channel: {}",
                    channel.channel()
                )));
            }
        }

        if let Some(signer) = &self.signer {
            if signer.private_key_env.trim().is_empty() {
                return Err(Error::Config("Signer private_key_env must not be empty".to_string()));
            }
        }

        // 可信签名者公钥
        self.verifier.trusted_keys()?;

        Ok(())
    }

    pub fn is_channel_allowed(&self, channel: &Channel) -> bool {
        self.channels.iter().any(|c| c.from == channel.from && c.to == channel.to)
    }

    pub fn get_channels_from(&self, chain_id: &str) -> Vec<&ChannelConfig> {
        self.channels.iter().filter(|c| c.from == chain_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::CodecKind;

    const JSON_CONFIG: &str = r#"{
        "chain_id": "qos",
        "channels": [
            { "from": "qos", "to": "qsc" },
            { "from": "qsc", "to": "qos" }
        ],
        "signer": { "private_key_env": "RELAY_TEST_KEY" },
        "verifier": {
            "codec": "json",
            "strict_sequence": false,
            "trusted_signers": ["1624de64200f3521e8dfd13d533b901aaadaedf345b26d400a0fd5fd65c24f7bf66cbfef81"]
        }
    }"#;

    #[test]
    fn test_parse_json() {
        let config = Config::from_json_str(JSON_CONFIG).unwrap();
        assert_eq!(config.chain_id, "qos");
        assert_eq!(config.verifier.codec, CodecKind::Json);
        assert!(config.verifier.require_signature);
        assert!(!config.verifier.strict_sequence);
        assert!(config.is_channel_allowed(&Channel::new("qsc", "qos")));
        assert!(!config.is_channel_allowed(&Channel::new("qsc", "eth")));
        assert_eq!(config.get_channels_from("qos").len(), 1);
    }

    #[test]
    fn test_parse_toml_defaults() {
        let config = Config::from_toml_str(
            r#"
            chain_id = "qos"

            [[channels]]
            from = "qos"
            to = "qsc"
            "#,
        )
        .unwrap();
        assert!(config.signer.is_none());
        assert_eq!(config.verifier, VerifierConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("relay-config-{}.json", std::process::id()));
        std::fs::write(&path, JSON_CONFIG).unwrap();
        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.channels.len(), 2);

        assert!(matches!(
            Config::load("/nonexistent/relay.json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects() {
        let base = Config::from_json_str(JSON_CONFIG).unwrap();

        let mut no_channels = base.clone();
        no_channels.channels.clear();
        assert!(no_channels.validate().is_err());

        let mut duplicate = base.clone();
        duplicate.channels.push(duplicate.channels[0].clone());
        assert!(duplicate.validate().is_err());

        let mut empty = base.clone();
        empty.channels[0].to = " ".to_string();
        assert!(empty.validate().is_err());

        let mut bad_key = base.clone();
        bad_key.verifier.trusted_signers = vec!["00ff".to_string()];
        assert!(bad_key.validate().is_err());

        let mut bad_env = base;
        bad_env.signer = Some(SignerConfig {
            private_key_env: String::new(),
        });
        assert!(bad_env.validate().is_err());
    }

    #[test]
    fn test_unknown_codec_rejected() {
        let bad = JSON_CONFIG.replace("\"json\"", "\"amino\"");
        assert!(Config::from_json_str(&bad).is_err());
    }

    #[test]
    fn test_load_signer_from_env() {
        std::env::set_var("RELAY_CONFIG_TEST_KEY", hex::encode([8u8; 32]));
        let signer = SignerConfig {
            private_key_env: "RELAY_CONFIG_TEST_KEY".to_string(),
        }
        .load_signer()
        .unwrap();
        assert_eq!(
            signer.public_key_bytes(),
            Ed25519KeySigner::from_seed(&[8u8; 32]).public_key_bytes()
        );

        let missing = SignerConfig {
            private_key_env: "RELAY_CONFIG_TEST_KEY_MISSING".to_string(),
        };
        assert!(matches!(missing.load_signer(), Err(Error::Config(_))));
    }
}
