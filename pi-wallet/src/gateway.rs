/// Ledger gateway
///
/// Runs the per-transaction protocol against a [`LedgerService`]:
/// load the source account, estimate the fee, build a single-operation
/// envelope with a bounded validity window, sign it, submit it. Each step is
/// attempted once. Retrying is left to the caller since resubmitting with a
/// stale sequence number is unsafe.
use crate::api::types::{AccountSnapshot, PaymentRecord, SubmitResponse};
use crate::blockchain::{Amount, KeyPair, PublicKey};
use crate::blockchain_client::{HorizonClient, LedgerService, Order};
use crate::config::NetworkConfig;
use crate::errors::{WalletError, WalletResult};
use crate::network::Network;
use crate::transaction::{Memo, Operation, TransactionBuilder, DEFAULT_TX_TIMEOUT};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Balance given to newly created accounts unless the caller picks one
pub const DEFAULT_STARTING_BALANCE: Amount = Amount::ONE;
/// Number of history records returned by default
pub const DEFAULT_PAYMENT_LIMIT: u32 = 10;

#[derive(Clone)]
pub struct LedgerGateway {
    service: Arc<dyn LedgerService>,
    network: Network,
    tx_timeout: Duration,
}

impl fmt::Debug for LedgerGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerGateway")
            .field("network", &self.network)
            .field("tx_timeout", &self.tx_timeout)
            .finish_non_exhaustive()
    }
}

impl LedgerGateway {
    /// Gateway talking to the profile's public Horizon endpoint
    pub fn new(network: Network) -> WalletResult<Self> {
        Self::from_config(&NetworkConfig::for_network(network))
    }

    pub fn from_config(config: &NetworkConfig) -> WalletResult<Self> {
        let client = HorizonClient::from_config(config)?;
        Self::with_service(Arc::new(client), config.network)
            .with_tx_timeout(config.transaction_timeout())
    }

    pub fn with_service(service: Arc<dyn LedgerService>, network: Network) -> Self {
        LedgerGateway {
            service,
            network,
            tx_timeout: DEFAULT_TX_TIMEOUT,
        }
    }

    /// Set the validity window of built envelopes. A zero window would
    /// already be expired when submitted, so it is rejected.
    pub fn with_tx_timeout(mut self, timeout: Duration) -> WalletResult<Self> {
        if timeout.is_zero() {
            return Err(WalletError::ValidationError(
                "Transaction timeout must be greater than zero".to_string(),
            ));
        }
        self.tx_timeout = timeout;
        Ok(self)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn tx_timeout(&self) -> Duration {
        self.tx_timeout
    }

    pub async fn load_account(&self, account: &PublicKey) -> WalletResult<AccountSnapshot> {
        debug!(network = %self.network, account = %account, "loading account");
        self.service.load_account(account).await
    }

    /// `false` only when the ledger reports the account missing; any other
    /// failure is returned as an error.
    pub async fn is_account_activated(&self, account: &PublicKey) -> WalletResult<bool> {
        match self.load_account(account).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_account_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Most recent payment-like records, newest first
    pub async fn list_payments(
        &self,
        account: &PublicKey,
        limit: u32,
    ) -> WalletResult<Vec<PaymentRecord>> {
        if limit == 0 {
            return Err(WalletError::ValidationError(
                "Payment limit must be at least 1".to_string(),
            ));
        }
        debug!(network = %self.network, account = %account, limit, "listing payments");
        self.service.list_payments(account, limit, Order::Desc).await
    }

    pub async fn send_payment(
        &self,
        source: &KeyPair,
        destination: &PublicKey,
        amount: Amount,
        memo: Option<&str>,
    ) -> WalletResult<SubmitResponse> {
        ensure_positive(amount, "Payment amount")?;
        let memo = Memo::from_optional(memo)?;
        let operation = Operation::Payment {
            destination: *destination,
            amount,
        };
        self.submit_operation(source, operation, memo).await
    }

    /// Create `destination` on the ledger, funded from `source`.
    ///
    /// Fails with [`WalletError::AlreadyActivated`] without submitting
    /// anything when the destination already exists.
    pub async fn activate_account(
        &self,
        source: &KeyPair,
        destination: &PublicKey,
        starting_balance: Amount,
    ) -> WalletResult<SubmitResponse> {
        ensure_positive(starting_balance, "Starting balance")?;
        if self.is_account_activated(destination).await? {
            warn!(network = %self.network, destination = %destination, "destination already activated");
            return Err(WalletError::AlreadyActivated(destination.address()));
        }

        let operation = Operation::CreateAccount {
            destination: *destination,
            starting_balance,
        };
        self.submit_operation(source, operation, Memo::None).await
    }

    async fn submit_operation(
        &self,
        source: &KeyPair,
        operation: Operation,
        memo: Memo,
    ) -> WalletResult<SubmitResponse> {
        let source_key = source.public_key();
        let op_name = operation.name();
        let destination = *operation.destination();

        let account = self.load_account(source_key).await?;
        let base_fee = self.service.fetch_base_fee().await?;
        debug!(
            network = %self.network,
            source = %source_key,
            operation = op_name,
            sequence = account.sequence,
            base_fee,
            "building transaction"
        );

        let envelope = TransactionBuilder::new(*source_key, account.sequence, base_fee)
            .memo(memo)
            .add_operation(operation)
            .timeout(self.tx_timeout)
            .build()?
            .sign(source, self.network)?;
        let hash = envelope.hash_hex(self.network)?;
        debug!(network = %self.network, hash = %hash, "submitting transaction");

        match self.service.submit_transaction(&envelope).await {
            Ok(response) => {
                info!(
                    network = %self.network,
                    source = %source_key,
                    destination = %destination,
                    operation = op_name,
                    hash = %response.hash,
                    "transaction accepted"
                );
                Ok(response)
            }
            Err(err) => {
                match &err {
                    WalletError::TransactionRejected {
                        status,
                        result_codes,
                        ..
                    } => {
                        let codes = result_codes
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        warn!(
                            network = %self.network,
                            operation = op_name,
                            hash = %hash,
                            status,
                            result_codes = %codes,
                            "transaction rejected"
                        );
                    }
                    other => {
                        warn!(network = %self.network, hash = %hash, error = %other, "transaction submission failed");
                    }
                }
                Err(err)
            }
        }
    }
}

fn ensure_positive(amount: Amount, what: &str) -> WalletResult<()> {
    if amount.is_zero() {
        return Err(WalletError::InvalidAmount(format!(
            "{} must be greater than zero",
            what
        )));
    }
    Ok(())
}
