use serde::{Deserialize, Serialize};
use std::fmt;

/// Result codes reported by the ledger alongside a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

impl fmt::Display for ResultCodes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tx = self.transaction.as_deref().unwrap_or("unknown");
        if self.operations.is_empty() {
            write!(f, "{}", tx)
        } else {
            write!(f, "{} [{}]", tx, self.operations.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletError {
    // Key material errors
    InvalidMnemonic,
    DerivationError(String),
    DecodingError(String),
    CryptoError(String),

    // Ledger errors
    AccountNotFound(String),
    AlreadyActivated(String),
    TransactionRejected {
        status: u16,
        detail: String,
        result_codes: Option<ResultCodes>,
    },
    TransportError(String),

    // Validation errors
    ValidationError(String),
    InvalidAmount(String),
}

impl WalletError {
    /// True when the ledger has no record of the account.
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, WalletError::AccountNotFound(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, WalletError::TransportError(_))
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, WalletError::TransactionRejected { .. })
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalletError::InvalidMnemonic => write!(f, "The provided mnemonic is invalid"),
            WalletError::DerivationError(msg) => {
                write!(f, "Failed to derive wallet from seed: {}", msg)
            }
            WalletError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            WalletError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),

            WalletError::AccountNotFound(account) => write!(f, "Account not found: {}", account),
            WalletError::AlreadyActivated(account) => {
                write!(f, "Account is already activated: {}", account)
            }
            WalletError::TransactionRejected {
                status,
                detail,
                result_codes,
            } => match result_codes {
                Some(codes) => write!(
                    f,
                    "Transaction rejected ({}): {} ({})",
                    status, detail, codes
                ),
                None => write!(f, "Transaction rejected ({}): {}", status, detail),
            },
            WalletError::TransportError(msg) => write!(f, "Transport error: {}", msg),

            WalletError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            WalletError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}

pub type WalletResult<T> = Result<T, WalletError>;

// Conversion helpers
impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::ValidationError(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WalletError::TransportError(format!("request timed out: {}", error))
        } else {
            WalletError::TransportError(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_carries_result_codes_verbatim() {
        let err = WalletError::TransactionRejected {
            status: 400,
            detail: "The transaction failed when submitted to the network.".to_string(),
            result_codes: Some(ResultCodes {
                transaction: Some("tx_failed".to_string()),
                operations: vec!["op_underfunded".to_string()],
            }),
        };

        let message = err.to_string();
        assert!(message.contains("tx_failed"));
        assert!(message.contains("op_underfunded"));
        assert!(err.is_rejection());
        assert!(!err.is_transport());
    }

    #[test]
    fn json_errors_map_to_validation() {
        let err: WalletError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, WalletError::ValidationError(_)));
    }
}
