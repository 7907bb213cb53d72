// lib.rs - Core library structure for the wallet

pub mod api;
pub mod blockchain;
pub mod blockchain_client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod gateway;
pub mod network;
pub mod strkey;
pub mod transaction;
pub mod wallet;
pub mod xdr;

#[cfg(test)]
mod test_support;

// Re-export common types
pub use api::types::*;
pub use blockchain::{Amount, KeyPair, PublicKey, SecretKey};
pub use blockchain_client::{HorizonClient, LedgerService, Order};
pub use config::NetworkConfig;
pub use crypto::{DerivationPath, MnemonicStrength, Seed, PI_DERIVATION_PATH};
pub use errors::{ResultCodes, WalletError, WalletResult};
pub use gateway::{LedgerGateway, DEFAULT_PAYMENT_LIMIT, DEFAULT_STARTING_BALANCE};
pub use network::Network;
pub use transaction::{Memo, Operation, Transaction, TransactionBuilder, TransactionEnvelope};
pub use wallet::{ActivationStatus, Wallet, MIN_RESERVE};
