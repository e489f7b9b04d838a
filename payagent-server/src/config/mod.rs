//! Configuration module for payagent-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::FileConfig;
use alloy::primitives::Address;
use payagent_core::config::{AgentConfig, PartiesConfig, TimingConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable holding the operating account's private key.
pub const PRIVATE_KEY_ENV: &str = "PAYMENT_AGENT_PRIVATE_KEY";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("PAYMENT_AGENT_PRIVATE_KEY environment variable not set")]
    MissingPrivateKey,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub rpc_url: Url,
    pub confirmation_timeout: Duration,
    /// Explicit mint recipient; `None` means the operating account.
    pub recipient: Option<Address>,
    pub token: Address,
    pub mint_contract: Address,
    pub parties: PartiesConfig,
    pub timing: TimingConfig,
    pub allow_duplicate_amounts: bool,
    pub retention: Duration,
}

impl LoadedConfig {
    /// Build the agent configuration for the given operating account.
    ///
    /// The split transfers are paid from the operating account, so the
    /// mint has to land there too.
    pub fn agent_config(&self, operator: Address) -> Result<AgentConfig, ConfigError> {
        let recipient = self.recipient.unwrap_or(operator);
        if recipient != operator {
            return Err(ConfigError::ValidationError(format!(
                "agent.recipient {recipient} differs from the operating account {operator}"
            )));
        }

        Ok(AgentConfig {
            token: self.token,
            mint_contract: self.mint_contract,
            recipient,
            parties: self.parties,
            timing: self.timing,
            allow_duplicate_amounts: self.allow_duplicate_amounts,
            retention: self.retention,
        })
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(file_config)
    }

    fn validate(&self, config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let token = parse_address("chain.token", &config.chain.token)?;
        let mint_contract = parse_address("chain.mint_contract", &config.chain.mint_contract)?;
        let recipient = config
            .agent
            .recipient
            .as_deref()
            .map(|r| parse_address("agent.recipient", r))
            .transpose()?;
        let party_a = parse_address("parties.party_a", &config.parties.party_a)?;
        let party_b = parse_address("parties.party_b", &config.parties.party_b)?;

        for (key, address) in [("parties.party_a", party_a), ("parties.party_b", party_b)] {
            if address.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must not be the zero address"
                )));
            }
        }

        let timing = &config.timing;
        if timing.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "timing.poll_interval_ms must be positive".to_string(),
            ));
        }
        if timing.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timing.timeout_secs must be positive".to_string(),
            ));
        }
        if timing.lookback_blocks == 0 {
            return Err(ConfigError::ValidationError(
                "timing.lookback_blocks must be at least 1".to_string(),
            ));
        }
        if config.agent.retention_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.retention_secs must be positive".to_string(),
            ));
        }
        if config.chain.confirmation_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "chain.confirmation_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(LoadedConfig {
            listen: config.server.listen,
            rpc_url: config.chain.rpc_url,
            confirmation_timeout: Duration::from_secs(config.chain.confirmation_timeout_secs),
            recipient,
            token,
            mint_contract,
            parties: PartiesConfig { party_a, party_b },
            timing: TimingConfig {
                poll_interval: Duration::from_millis(timing.poll_interval_ms),
                timeout: Duration::from_secs(timing.timeout_secs),
                lookback_blocks: timing.lookback_blocks,
            },
            allow_duplicate_amounts: config.agent.allow_duplicate_amounts,
            retention: Duration::from_secs(config.agent.retention_secs),
        })
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("{key} is not an address ({value}): {e}")))
}

/// Get the operating account's private key from the environment.
pub fn get_private_key() -> Result<String, ConfigError> {
    std::env::var(PRIVATE_KEY_ENV).map_err(|_| ConfigError::MissingPrivateKey)
}
