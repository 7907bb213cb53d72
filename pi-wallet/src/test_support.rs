//! In-memory ledger used by unit tests.

use crate::api::types::{AccountBalance, AccountFlags, AccountSnapshot, PaymentRecord, SubmitResponse};
use crate::blockchain::{Amount, PublicKey};
use crate::blockchain_client::{LedgerService, Order};
use crate::errors::{WalletError, WalletResult};
use crate::network::Network;
use crate::transaction::TransactionEnvelope;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) fn snapshot(account: &PublicKey, sequence: i64, balance: &str) -> AccountSnapshot {
    AccountSnapshot {
        id: account.address(),
        account_id: account.address(),
        sequence,
        subentry_count: 0,
        balances: vec![AccountBalance {
            balance: balance.parse().expect("valid balance"),
            asset_type: "native".to_string(),
            asset_code: None,
            asset_issuer: None,
        }],
        signers: Vec::new(),
        flags: AccountFlags::default(),
    }
}

#[derive(Default)]
pub(crate) struct MockLedger {
    accounts: Mutex<HashMap<PublicKey, AccountSnapshot>>,
    submissions: Mutex<Vec<TransactionEnvelope>>,
    payments: Mutex<Vec<PaymentRecord>>,
    load_failure: Mutex<Option<WalletError>>,
    submit_failure: Mutex<Option<WalletError>>,
    base_fee: Option<u32>,
}

impl MockLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_base_fee(mut self, fee: u32) -> Self {
        self.base_fee = Some(fee);
        self
    }

    pub(crate) fn insert_account(&self, account: &PublicKey, sequence: i64, balance: &str) {
        self.accounts
            .lock()
            .unwrap()
            .insert(*account, snapshot(account, sequence, balance));
    }

    pub(crate) fn remove_account(&self, account: &PublicKey) {
        self.accounts.lock().unwrap().remove(account);
    }

    pub(crate) fn set_payments(&self, records: Vec<PaymentRecord>) {
        *self.payments.lock().unwrap() = records;
    }

    pub(crate) fn fail_loads_with(&self, error: Option<WalletError>) {
        *self.load_failure.lock().unwrap() = error;
    }

    pub(crate) fn fail_submits_with(&self, error: Option<WalletError>) {
        *self.submit_failure.lock().unwrap() = error;
    }

    pub(crate) fn submissions(&self) -> Vec<TransactionEnvelope> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerService for MockLedger {
    async fn load_account(&self, account: &PublicKey) -> WalletResult<AccountSnapshot> {
        if let Some(error) = self.load_failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.accounts
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .ok_or_else(|| WalletError::AccountNotFound(account.address()))
    }

    async fn fetch_base_fee(&self) -> WalletResult<u32> {
        Ok(self.base_fee.unwrap_or(crate::transaction::DEFAULT_BASE_FEE))
    }

    async fn submit_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> WalletResult<SubmitResponse> {
        self.submissions.lock().unwrap().push(envelope.clone());
        if let Some(error) = self.submit_failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(SubmitResponse {
            hash: envelope.hash_hex(Network::Testnet)?,
            ledger: Some(1),
            successful: true,
            envelope_xdr: Some(envelope.to_xdr_base64()?),
            result_xdr: None,
        })
    }

    async fn list_payments(
        &self,
        _account: &PublicKey,
        limit: u32,
        _order: Order,
    ) -> WalletResult<Vec<PaymentRecord>> {
        let records = self.payments.lock().unwrap();
        Ok(records.iter().take(limit as usize).cloned().collect())
    }
}

pub(crate) fn amount(value: &str) -> Amount {
    value.parse().expect("valid amount")
}
