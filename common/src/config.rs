use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rate::DEFAULT_RATE_API_URL;

/// localStorage key (or file stem) the ledger is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "drip_transactions";

/// How long the router waits for a navigation to settle before releasing it.
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// SUI network the wallet talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
    Localnet,
}

impl FromStr for Network {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "localnet" => Ok(Network::Localnet),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        };
        f.write_str(name)
    }
}

/// Wallet front-end settings shared by the UI and the CLI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub storage_key: String,
    pub navigation_timeout_ms: u64,
    pub rate_api_url: String,
    pub network: Network,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            rate_api_url: DEFAULT_RATE_API_URL.to_string(),
            network: Network::default(),
        }
    }
}

impl WalletConfig {
    /// Defaults overlaid with `DRIP_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `DRIP_*` variable.
    /// Empty values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = get("DRIP_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Some(ms) = get("DRIP_NAVIGATION_TIMEOUT_MS") {
            config.navigation_timeout_ms = ms.trim().parse().map_err(|_| ConfigError {
                var: "DRIP_NAVIGATION_TIMEOUT_MS",
                value: ms.clone(),
            })?;
        }
        if let Some(url) = get("DRIP_RATE_API_URL") {
            config.rate_api_url = url;
        }
        if let Some(network) = get("DRIP_NETWORK") {
            config.network = network.parse().map_err(|_| ConfigError {
                var: "DRIP_NETWORK",
                value: network.clone(),
            })?;
        }
        Ok(config)
    }

    pub fn navigation_timeout(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.navigation_timeout_ms.min(i64::MAX as u64) as i64)
    }
}
