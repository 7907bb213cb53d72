/// Ledger service client for communicating with Horizon nodes
///
/// The wallet depends on exactly four network capabilities, captured by
/// [`LedgerService`]. [`HorizonClient`] implements them over HTTP.
use crate::api::types::{AccountSnapshot, FeeStats, Page, PaymentRecord, ProblemResponse, SubmitResponse};
use crate::blockchain::PublicKey;
use crate::config::NetworkConfig;
use crate::errors::{WalletError, WalletResult};
use crate::transaction::{TransactionEnvelope, DEFAULT_BASE_FEE};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Order in which history records are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// The ledger network operations the wallet relies on
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Fails with [`WalletError::AccountNotFound`] when the account does not exist
    async fn load_account(&self, account: &PublicKey) -> WalletResult<AccountSnapshot>;

    /// Current base fee per operation, in stroops
    async fn fetch_base_fee(&self) -> WalletResult<u32>;

    /// Fails with [`WalletError::TransactionRejected`] when the network refuses the envelope
    async fn submit_transaction(&self, envelope: &TransactionEnvelope)
        -> WalletResult<SubmitResponse>;

    async fn list_payments(
        &self,
        account: &PublicKey,
        limit: u32,
        order: Order,
    ) -> WalletResult<Vec<PaymentRecord>>;
}

/// HTTP client for the Horizon REST API
#[derive(Debug, Clone)]
pub struct HorizonClient {
    client: Client,
    base_url: String,
}

impl HorizonClient {
    /// Create a new client with the default 30 second request timeout
    pub fn new(base_url: impl Into<String>) -> WalletResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> WalletResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            WalletError::TransportError(format!("Failed to create HTTP client: {}", e))
        })?;

        let base_url: String = base_url.into();
        Ok(HorizonClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &NetworkConfig) -> WalletResult<Self> {
        Self::with_timeout(
            config.endpoint(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> WalletResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        let response = ensure_success(response).await?;
        decode_json(response).await
    }
}

#[async_trait]
impl LedgerService for HorizonClient {
    async fn load_account(&self, account: &PublicKey) -> WalletResult<AccountSnapshot> {
        let address = account.address();
        let url = format!("{}/accounts/{}", self.base_url, address);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(WalletError::AccountNotFound(address));
        }

        let response = ensure_success(response).await?;
        decode_json(response).await
    }

    async fn fetch_base_fee(&self) -> WalletResult<u32> {
        let stats: FeeStats = self.get("/fee_stats", &[]).await?;
        let fee = stats
            .last_ledger_base_fee
            .as_deref()
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|fee| *fee > 0)
            .unwrap_or(DEFAULT_BASE_FEE);
        Ok(fee)
    }

    async fn submit_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> WalletResult<SubmitResponse> {
        let url = format!("{}/transactions", self.base_url);
        let tx = envelope.to_xdr_base64()?;
        let response = self
            .client
            .post(&url)
            .form(&[("tx", tx.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let problem: ProblemResponse = response.json().await.unwrap_or_default();
            let extras = problem.extras.unwrap_or_default();
            return Err(WalletError::TransactionRejected {
                status: StatusCode::BAD_REQUEST.as_u16(),
                detail: problem
                    .detail
                    .or(problem.title)
                    .unwrap_or_else(|| "Transaction rejected".to_string()),
                result_codes: extras.result_codes,
            });
        }

        let response = ensure_success(response).await?;
        decode_json(response).await
    }

    async fn list_payments(
        &self,
        account: &PublicKey,
        limit: u32,
        order: Order,
    ) -> WalletResult<Vec<PaymentRecord>> {
        let path = format!("/accounts/{}/payments", account.address());
        let query = [
            ("limit", limit.to_string()),
            ("order", order.as_str().to_string()),
        ];
        let page: Page<PaymentRecord> = self.get(&path, &query).await?;
        Ok(page.embedded.records)
    }
}

async fn ensure_success(response: Response) -> WalletResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let problem: ProblemResponse = response.json().await.unwrap_or_default();
    let detail = problem
        .detail
        .or(problem.title)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
    Err(WalletError::TransportError(format!(
        "HTTP error {}: {}",
        status.as_u16(),
        detail
    )))
}

async fn decode_json<T: for<'de> serde::Deserialize<'de>>(response: Response) -> WalletResult<T> {
    response
        .json()
        .await
        .map_err(|e| WalletError::TransportError(format!("Failed to parse response: {}", e)))
}
