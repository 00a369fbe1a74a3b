//! Deployment parameters of a token and where they are read from.

use alloy_primitives::{address, utils::parse_ether, Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Chain id of a local Hardhat / Anvil network.
pub const DEFAULT_CHAIN_ID: u64 = 31337;

/// Address of the first contract deployed by the first dev account.
pub const DEFAULT_VERIFYING_CONTRACT: Address =
    address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

/// Decimals of the token; amounts are stored in base units.
pub const DECIMALS: u8 = 18;

/// Multiplier for token decimals (10^18)
pub fn decimals_multiplier() -> U256 {
    U256::from(10u64).pow(U256::from(DECIMALS))
}

/// Deployment parameters of a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    /// Token name, also the EIP-712 domain name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Ticker symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// EIP-712 domain version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Chain the signing domain is bound to.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Address the signing domain is bound to.
    #[serde(default = "default_verifying_contract")]
    pub verifying_contract: Address,
    /// Base units minted to the deployer at construction.
    #[serde(default = "default_initial_supply")]
    pub initial_supply: U256,
}

impl Default for TokenConfig {
    /// 1000 STT on a local dev chain.
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            version: default_version(),
            chain_id: DEFAULT_CHAIN_ID,
            verifying_contract: DEFAULT_VERIFYING_CONTRACT,
            initial_supply: default_initial_supply(),
        }
    }
}

impl TokenConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Creates a `TokenConfig` from environment variables, falling back to the
    /// defaults for every variable that is not set.
    ///
    /// Reads `EV_TOKEN_NAME`, `EV_TOKEN_SYMBOL`, `EV_TOKEN_CHAIN_ID`,
    /// `EV_TOKEN_CONTRACT` and `EV_TOKEN_INITIAL_SUPPLY` (whole tokens).
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Some(name) = lookup("EV_TOKEN_NAME") {
            config.name = name;
        }
        if let Some(symbol) = lookup("EV_TOKEN_SYMBOL") {
            config.symbol = symbol;
        }
        if let Some(chain_id) = lookup("EV_TOKEN_CHAIN_ID") {
            config.chain_id = chain_id.trim().parse()?;
        }
        if let Some(contract) = lookup("EV_TOKEN_CONTRACT") {
            config.verifying_contract = Address::from_str(contract.trim())?;
        }
        config.initial_supply = lookup("EV_TOKEN_INITIAL_SUPPLY")
            .map(|s| parse_ether(s.trim()))
            .transpose()?
            .unwrap_or(config.initial_supply);

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::InvalidConfig("name must not be empty"));
        }
        if self.symbol.is_empty() {
            return Err(ConfigError::InvalidConfig("symbol must not be empty"));
        }
        if self.chain_id == 0 {
            return Err(ConfigError::InvalidConfig("chain id must not be zero"));
        }
        if self.verifying_contract.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "verifying contract must not be the zero address",
            ));
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid configuration provided
    #[error("Invalid config: {0}")]
    InvalidConfig(&'static str),
    /// JSON could not be parsed
    #[error("Invalid token config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn default_name() -> String {
    "TestToken".to_string()
}

fn default_symbol() -> String {
    "STT".to_string()
}

fn default_version() -> String {
    "1".to_string()
}

const fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

const fn default_verifying_contract() -> Address {
    DEFAULT_VERIFYING_CONTRACT
}

fn default_initial_supply() -> U256 {
    U256::from(1000u64) * decimals_multiplier()
}
