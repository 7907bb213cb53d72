#![allow(dead_code)]

use async_trait::async_trait;
use pi_wallet_lib::{
    AccountBalance, AccountFlags, AccountSnapshot, LedgerGateway, LedgerService, Network, Order,
    PaymentRecord, PublicKey, SubmitResponse, TransactionEnvelope, WalletError, WalletResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Ledger double that keeps accounts in memory and records every submission.
#[derive(Default)]
pub struct RecordingLedger {
    accounts: Mutex<HashMap<PublicKey, AccountSnapshot>>,
    submissions: Mutex<Vec<TransactionEnvelope>>,
    loads: Mutex<usize>,
}

impl RecordingLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fund(&self, account: &PublicKey, sequence: i64, balance: &str) {
        let snapshot = AccountSnapshot {
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
        };
        self.accounts.lock().unwrap().insert(*account, snapshot);
    }

    pub fn submissions(&self) -> Vec<TransactionEnvelope> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

#[async_trait]
impl LedgerService for RecordingLedger {
    async fn load_account(&self, account: &PublicKey) -> WalletResult<AccountSnapshot> {
        *self.loads.lock().unwrap() += 1;
        self.accounts
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .ok_or_else(|| WalletError::AccountNotFound(account.address()))
    }

    async fn fetch_base_fee(&self) -> WalletResult<u32> {
        Ok(100)
    }

    async fn submit_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> WalletResult<SubmitResponse> {
        self.submissions.lock().unwrap().push(envelope.clone());
        Ok(SubmitResponse {
            hash: envelope.hash_hex(Network::Testnet)?,
            ledger: None,
            successful: true,
            envelope_xdr: None,
            result_xdr: None,
        })
    }

    async fn list_payments(
        &self,
        _account: &PublicKey,
        _limit: u32,
        _order: Order,
    ) -> WalletResult<Vec<PaymentRecord>> {
        Ok(Vec::new())
    }
}

pub fn gateway(ledger: &Arc<RecordingLedger>) -> LedgerGateway {
    LedgerGateway::with_service(ledger.clone(), Network::Testnet)
}
