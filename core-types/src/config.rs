// Copyright (c) James Kassemi, SC, US. All rights reserved.
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::types::Address;

pub const CONFIG_FILE: &str = "polls.toml";
pub const ENV_PREFIX: &str = "POLLS";

/// Engine configuration: optional `polls.toml`, overridden by `POLLS_*` variables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// JSON-RPC endpoint of the external wallet that owns the signing keys.
    #[serde(default = "default_wallet_url")]
    pub wallet_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            wallet_url: default_wallet_url(),
            chain_id: default_chain_id(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn default_rpc_url() -> String {
    "https://sepolia.base.org".to_string()
}

fn default_wallet_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_chain_id() -> u64 {
    84_532
}

fn default_request_timeout_secs() -> u64 {
    20
}

/// Contract address plus the call signatures fixed at deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    #[serde(default = "default_contract_address")]
    pub address: String,
    #[serde(default)]
    pub signatures: CallSignatures,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: default_contract_address(),
            signatures: CallSignatures::default(),
        }
    }
}

impl ContractConfig {
    pub fn address(&self) -> Result<Address, ConfigError> {
        self.address.parse().map_err(|err| {
            ConfigError::Message(format!("invalid contract address {}: {err}", self.address))
        })
    }
}

fn default_contract_address() -> String {
    "0xf95EF9B12c80bfc8B3C3252f68A2935BadAe78B8".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSignatures {
    #[serde(default = "default_get_poll_count")]
    pub get_poll_count: String,
    #[serde(default = "default_get_poll")]
    pub get_poll: String,
    #[serde(default = "default_create_poll")]
    pub create_poll: String,
    #[serde(default = "default_vote")]
    pub vote: String,
    #[serde(default = "default_end_poll")]
    pub end_poll: String,
}

impl Default for CallSignatures {
    fn default() -> Self {
        Self {
            get_poll_count: default_get_poll_count(),
            get_poll: default_get_poll(),
            create_poll: default_create_poll(),
            vote: default_vote(),
            end_poll: default_end_poll(),
        }
    }
}

fn default_get_poll_count() -> String {
    "getPollCount()".to_string()
}

fn default_get_poll() -> String {
    "getPoll(uint256)".to_string()
}

fn default_create_poll() -> String {
    "createPoll(string,string[])".to_string()
}

fn default_vote() -> String {
    "vote(uint256,uint256)".to_string()
}

fn default_end_poll() -> String {
    "endPoll(uint256)".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    #[serde(default = "default_confirmation_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,
    /// Blocks (including the inclusion block) required before a receipt counts as final.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_confirmation_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_interval_ms: default_max_poll_interval_ms(),
            confirmations: default_confirmations(),
        }
    }
}

impl ConfirmationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_max_poll_interval_ms() -> u64 {
    8_000
}

fn default_confirmations() -> u64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: usize,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_concurrent_reads: default_max_concurrent_reads(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl RegistryConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

fn default_max_concurrent_reads() -> usize {
    16
}

fn default_refresh_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub state_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("polls.session.json")
}

/// `POLLS_NETWORK__RPC_URL` sets `network.rpc_url`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(environment())
    }

    fn load_from(env: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(env)
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.contract.address()?;
        if self.network.rpc_url.trim().is_empty() {
            return Err(ConfigError::Message("network.rpc_url is required".to_string()));
        }
        if self.confirmation.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "confirmation.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.registry.max_concurrent_reads == 0 {
            return Err(ConfigError::Message(
                "registry.max_concurrent_reads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_base_sepolia_contract() {
        let config = AppConfig::default();
        assert_eq!(config.network.chain_id, 84_532);
        assert_eq!(config.contract.signatures.vote, "vote(uint256,uint256)");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.contract.address().unwrap().to_string(),
            "0xf95ef9b12c80bfc8b3c3252f68a2935badae78b8"
        );
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let settings = Config::builder()
            .add_source(config::File::from_str(
                "[network]\nchain_id = 8453\n[registry]\nmax_concurrent_reads = 4\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.network.chain_id, 8453);
        assert_eq!(config.network.rpc_url, "https://sepolia.base.org");
        assert_eq!(config.registry.max_concurrent_reads, 4);
        assert_eq!(config.confirmation.timeout_secs, 120);
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        environment().source(Some(
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn single_underscore_after_prefix_overrides_nested_keys() {
        let config = AppConfig::load_from(env(&[
            ("POLLS_NETWORK__CHAIN_ID", "8453"),
            ("POLLS_NETWORK__RPC_URL", "https://mainnet.base.org"),
            ("POLLS_REGISTRY__MAX_CONCURRENT_READS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.network.chain_id, 8453);
        assert_eq!(config.network.rpc_url, "https://mainnet.base.org");
        assert_eq!(config.registry.max_concurrent_reads, 3);
    }

    #[test]
    fn zero_confirmation_timeout_is_rejected() {
        let mut config = AppConfig::default();
        config.confirmation.timeout_secs = 0;
        assert!(config.validate().is_err());
        assert_eq!(config.confirmation.timeout(), Duration::from_secs(1));
        assert!(AppConfig::load_from(env(&[("POLLS_CONFIRMATION__TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn invalid_contract_address_is_rejected() {
        let mut config = AppConfig::default();
        config.contract.address = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }
}
