use crate::blockchain::Amount;
use crate::errors::ResultCodes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Ledger-reported state of an account at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: String,
    pub account_id: String,
    #[serde(deserialize_with = "i64_from_string")]
    pub sequence: i64,
    #[serde(default)]
    pub subentry_count: u32,
    pub balances: Vec<AccountBalance>,
    #[serde(default)]
    pub signers: Vec<AccountSigner>,
    #[serde(default)]
    pub flags: AccountFlags,
}

impl AccountSnapshot {
    /// Native-asset balance, zero when the ledger lists none
    pub fn native_balance(&self) -> Amount {
        self.balances
            .iter()
            .find(|balance| balance.is_native())
            .map(|balance| balance.balance)
            .unwrap_or(Amount::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: Amount,
    pub asset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_issuer: Option<String>,
}

impl AccountBalance {
    pub fn is_native(&self) -> bool {
        self.asset_type == "native"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSigner {
    pub weight: u32,
    pub key: String,
    #[serde(rename = "type")]
    pub signer_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountFlags {
    #[serde(default)]
    pub auth_required: bool,
    #[serde(default)]
    pub auth_revocable: bool,
    #[serde(default)]
    pub auth_immutable: bool,
    #[serde(default)]
    pub auth_clawback_enabled: bool,
}

/// Subset of `/fee_stats` the wallet reads
#[derive(Debug, Clone, Deserialize)]
pub struct FeeStats {
    #[serde(default)]
    pub last_ledger_base_fee: Option<String>,
}

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub hash: String,
    #[serde(default)]
    pub ledger: Option<u64>,
    #[serde(default = "default_true")]
    pub successful: bool,
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Horizon "problem" document returned on failures
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub extras: Option<ProblemExtras>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemExtras {
    #[serde(default)]
    pub result_codes: Option<ResultCodes>,
    #[serde(default)]
    pub result_xdr: Option<String>,
}

/// Payment-like operation kinds reported in an account's payment history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    CreateAccount,
    Payment,
    PathPaymentStrictReceive,
    PathPaymentStrictSend,
    AccountMerge,
    InvokeHostFunction,
    Other,
}

impl PaymentKind {
    fn from_type(kind: &str) -> Self {
        match kind {
            "create_account" => PaymentKind::CreateAccount,
            "payment" => PaymentKind::Payment,
            "path_payment_strict_receive" | "path_payment" => {
                PaymentKind::PathPaymentStrictReceive
            }
            "path_payment_strict_send" => PaymentKind::PathPaymentStrictSend,
            "account_merge" => PaymentKind::AccountMerge,
            "invoke_host_function" => PaymentKind::InvokeHostFunction,
            _ => PaymentKind::Other,
        }
    }
}

/// One entry of an account's payment history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    #[serde(default)]
    pub paging_token: String,
    #[serde(rename = "type")]
    pub operation_type: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub transaction_successful: Option<bool>,
    #[serde(default)]
    pub source_account: Option<String>,

    // payment / path payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,

    // create_account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_balance: Option<String>,

    // account_merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub into: Option<String>,
}

impl PaymentRecord {
    pub fn kind(&self) -> PaymentKind {
        PaymentKind::from_type(&self.operation_type)
    }

    /// Amount moved by this record, where the record carries one
    pub fn value(&self) -> Option<Amount> {
        self.amount
            .as_deref()
            .or(self.starting_balance.as_deref())
            .and_then(|raw| raw.parse().ok())
    }
}

/// HAL collection page (`_embedded.records`)
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "_embedded")]
    pub embedded: Embedded<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Embedded<T> {
    pub records: Vec<T>,
}

fn i64_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(raw) => raw.parse().map_err(serde::de::Error::custom),
        StringOrNumber::Number(value) => Ok(value),
    }
}
