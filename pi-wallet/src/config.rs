//! Network selection and timeouts, with `PI_WALLET_*` environment overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{WalletError, WalletResult};
use crate::network::Network;

const KEY_NETWORK: &str = "PI_WALLET_NETWORK";
const KEY_HORIZON_URL: &str = "PI_WALLET_HORIZON_URL";
const KEY_REQUEST_TIMEOUT: &str = "PI_WALLET_REQUEST_TIMEOUT_SECS";
const KEY_TX_TIMEOUT: &str = "PI_WALLET_TX_TIMEOUT_SECS";

/// Which ledger to talk to and how long to wait for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    /// Overrides the profile's Horizon endpoint when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Validity window embedded in every signed envelope
    pub transaction_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}

impl NetworkConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            horizon_url: None,
            request_timeout_secs: 30,
            transaction_timeout_secs: 40,
        }
    }

    /// Defaults with `PI_WALLET_*` environment overrides applied
    pub fn from_env() -> WalletResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn endpoint(&self) -> String {
        match &self.horizon_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.network.horizon_url().to_string(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> WalletResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network) = lookup(KEY_NETWORK) {
            self.network = network.parse()?;
        }
        if let Some(url) = lookup(KEY_HORIZON_URL) {
            let url = url.trim();
            if !url.is_empty() {
                self.horizon_url = Some(url.to_string());
            }
        }
        if let Some(value) = lookup(KEY_REQUEST_TIMEOUT) {
            self.request_timeout_secs = parse_secs(&value, KEY_REQUEST_TIMEOUT)?;
        }
        if let Some(value) = lookup(KEY_TX_TIMEOUT) {
            self.transaction_timeout_secs = parse_secs(&value, KEY_TX_TIMEOUT)?;
        }
        Ok(())
    }
}

fn parse_secs(value: &str, key: &str) -> WalletResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(WalletError::ValidationError(format!(
            "Invalid value for '{}': expected a positive number of seconds",
            key
        ))),
    }
}
