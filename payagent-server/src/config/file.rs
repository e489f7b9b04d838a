//! TOML file configuration structures.
//!
//! These structs directly map to the `payagent-config.toml` file format.
//! Addresses are kept as strings here and checked by the loader.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    pub parties: PartiesConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:3000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

/// Destination chain section. Defaults target Arbitrum Sepolia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: Url,
    /// USDC contract.
    #[serde(default = "default_token")]
    pub token: String,
    /// CCTP token minter that emits `MintAndWithdraw`.
    #[serde(default = "default_mint_contract")]
    pub mint_contract: String,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            token: default_token(),
            mint_contract: default_mint_contract(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
        }
    }
}

fn default_rpc_url() -> Url {
    Url::parse("https://sepolia-rollup.arbitrum.io/rpc").expect("valid default RPC URL")
}

fn default_token() -> String {
    "0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d".to_string()
}

fn default_mint_contract() -> String {
    "0xE997d7d2F6E065a9A93Fa2175E878Fb9081F1f0A".to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

/// Agent section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Mint recipient. Must be the operating account when set.
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub allow_duplicate_amounts: bool,
    /// Seconds a finished payment stays queryable.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            recipient: None,
            allow_duplicate_amounts: false,
            retention_secs: default_retention_secs(),
        }
    }
}

fn default_retention_secs() -> u64 {
    3600
}

/// Split receivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartiesConfig {
    pub party_a: String,
    pub party_b: String,
}

/// Listener timing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_lookback_blocks")]
    pub lookback_blocks: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_timeout_secs(),
            lookback_blocks: default_lookback_blocks(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    150
}

fn default_lookback_blocks() -> u64 {
    10
}
