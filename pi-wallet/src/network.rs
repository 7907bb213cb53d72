use crate::errors::{WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Named ledger network profiles.
///
/// Each profile pins a Horizon endpoint and the passphrase mixed into every
/// transaction signature. An envelope signed for one network is rejected by
/// the other even though its signature is well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn horizon_url(self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.mainnet.minepi.com",
            Network::Testnet => "https://api.testnet.minepi.com",
        }
    }

    pub fn passphrase(self) -> &'static str {
        match self {
            Network::Mainnet => "Pi Network",
            Network::Testnet => "Pi Testnet",
        }
    }

    /// SHA-256 of the passphrase, the prefix of every signature base
    pub fn network_id(self) -> [u8; 32] {
        Sha256::digest(self.passphrase().as_bytes()).into()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = WalletError;

    fn from_str(s: &str) -> WalletResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(WalletError::ValidationError(format!(
                "Unknown network '{}': expected 'mainnet' or 'testnet'",
                other
            ))),
        }
    }
}
