//! The wallet aggregate.
//!
//! A [`Wallet`] owns one signing keypair for its whole life, plus the
//! material it was derived from when that is known. Account state is a cache
//! filled only by [`Wallet::reload`]; it is replaced wholesale or cleared,
//! never patched field by field.

use crate::api::types::{AccountSnapshot, PaymentRecord, SubmitResponse};
use crate::blockchain::{Amount, KeyPair, PublicKey};
use crate::crypto::{self, DerivationPath, MnemonicStrength, Seed};
use crate::errors::{WalletError, WalletResult};
use crate::gateway::{LedgerGateway, DEFAULT_PAYMENT_LIMIT, DEFAULT_STARTING_BALANCE};
use crate::network::Network;
use secrecy::SecretString;
use std::fmt;
use tracing::debug;

/// Native balance the ledger holds back from spending
pub const MIN_RESERVE: Amount = Amount::ONE;

/// Whether this wallet's account exists on the ledger, as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationStatus {
    /// No ledger round trip has told us yet
    #[default]
    Unknown,
    Activated,
    NotActivated,
}

pub struct Wallet {
    keypair: KeyPair,
    mnemonic: Option<SecretString>,
    seed: Option<Seed>,
    gateway: LedgerGateway,
    account: Option<AccountSnapshot>,
    activation: ActivationStatus,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.keypair.address())
            .field("network", &self.gateway.network())
            .field("has_mnemonic", &self.mnemonic.is_some())
            .field("activation", &self.activation)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    pub fn from_mnemonic(phrase: &str, gateway: LedgerGateway) -> WalletResult<Self> {
        Self::from_mnemonic_with_passphrase(phrase, "", gateway)
    }

    pub fn from_mnemonic_with_passphrase(
        phrase: &str,
        passphrase: &str,
        gateway: LedgerGateway,
    ) -> WalletResult<Self> {
        if !crypto::validate_mnemonic(phrase) {
            return Err(WalletError::InvalidMnemonic);
        }
        let seed = crypto::mnemonic_to_seed(phrase, passphrase)?;
        let mut wallet = Self::from_seed(seed, gateway)?;
        wallet.mnemonic = Some(SecretString::from(normalize_phrase(phrase)));
        Ok(wallet)
    }

    /// Derive at the fixed wallet path; no mnemonic is retained
    pub fn from_seed(seed: Seed, gateway: LedgerGateway) -> WalletResult<Self> {
        let keypair = crypto::derive_keypair(&seed, &DerivationPath::pi())?;
        let mut wallet = Self::with_keypair(keypair, gateway);
        wallet.seed = Some(seed);
        Ok(wallet)
    }

    /// Wrap an existing `S...` secret key
    pub fn from_secret(secret: &str, gateway: LedgerGateway) -> WalletResult<Self> {
        let keypair = KeyPair::from_secret(secret)?;
        Ok(Self::with_keypair(keypair, gateway))
    }

    /// Fresh 24-word wallet
    pub fn generate(gateway: LedgerGateway) -> WalletResult<Self> {
        Self::generate_with_strength(MnemonicStrength::default(), gateway)
    }

    pub fn generate_with_strength(
        strength: MnemonicStrength,
        gateway: LedgerGateway,
    ) -> WalletResult<Self> {
        let phrase = crypto::generate_mnemonic(strength)?;
        Self::from_mnemonic(&phrase, gateway)
    }

    fn with_keypair(keypair: KeyPair, gateway: LedgerGateway) -> Self {
        Wallet {
            keypair,
            mnemonic: None,
            seed: None,
            gateway,
            account: None,
            activation: ActivationStatus::Unknown,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public_key()
    }

    pub fn address(&self) -> String {
        self.keypair.address()
    }

    /// Exports the `S...` secret seed. Callers own its safekeeping.
    pub fn secret_key(&self) -> String {
        self.keypair.secret()
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn mnemonic(&self) -> Option<&SecretString> {
        self.mnemonic.as_ref()
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    pub fn network(&self) -> Network {
        self.gateway.network()
    }

    pub fn gateway(&self) -> &LedgerGateway {
        &self.gateway
    }

    /// Snapshot from the last successful reload
    pub fn account(&self) -> Option<&AccountSnapshot> {
        self.account.as_ref()
    }

    /// Spendable native balance, computed from the cached snapshot.
    ///
    /// This is the native balance minus [`MIN_RESERVE`], saturating at zero:
    /// an account holding less than the reserve reports zero, never a
    /// negative amount.
    pub fn balance(&self) -> Option<Amount> {
        self.account
            .as_ref()
            .map(|account| account.native_balance().saturating_sub(&MIN_RESERVE))
    }

    pub fn activation(&self) -> ActivationStatus {
        self.activation
    }

    /// Refresh the cached account snapshot.
    ///
    /// A missing account clears the cache, marks the wallet not activated and
    /// returns [`WalletError::AccountNotFound`]. Any other failure leaves the
    /// cache as it was.
    pub async fn reload(&mut self) -> WalletResult<&AccountSnapshot> {
        let public_key = *self.keypair.public_key();
        match self.gateway.load_account(&public_key).await {
            Ok(snapshot) => {
                debug!(account = %public_key, sequence = snapshot.sequence, "account reloaded");
                self.activation = ActivationStatus::Activated;
                Ok(&*self.account.insert(snapshot))
            }
            Err(err) => {
                if err.is_account_not_found() {
                    self.mark_not_activated();
                }
                Err(err)
            }
        }
    }

    /// Ledger check for this wallet's account; does not touch the cache
    pub async fn is_activated(&self) -> WalletResult<bool> {
        self.gateway
            .is_account_activated(self.keypair.public_key())
            .await
    }

    pub async fn list_payments(&self, limit: Option<u32>) -> WalletResult<Vec<PaymentRecord>> {
        self.gateway
            .list_payments(
                self.keypair.public_key(),
                limit.unwrap_or(DEFAULT_PAYMENT_LIMIT),
            )
            .await
    }

    pub async fn send_payment(
        &mut self,
        destination: &PublicKey,
        amount: Amount,
        memo: Option<&str>,
    ) -> WalletResult<SubmitResponse> {
        let result = self
            .gateway
            .send_payment(&self.keypair, destination, amount, memo)
            .await;
        self.observe(result)
    }

    /// Create `destination` with the default starting balance of 1
    pub async fn activate_account(
        &mut self,
        destination: &PublicKey,
    ) -> WalletResult<SubmitResponse> {
        self.activate_account_with_balance(destination, DEFAULT_STARTING_BALANCE)
            .await
    }

    pub async fn activate_account_with_balance(
        &mut self,
        destination: &PublicKey,
        starting_balance: Amount,
    ) -> WalletResult<SubmitResponse> {
        let result = self
            .gateway
            .activate_account(&self.keypair, destination, starting_balance)
            .await;
        self.observe(result)
    }

    fn observe<T>(&mut self, result: WalletResult<T>) -> WalletResult<T> {
        if let Err(WalletError::AccountNotFound(address)) = &result {
            if *address == self.keypair.address() {
                self.mark_not_activated();
            }
        }
        result
    }

    fn mark_not_activated(&mut self) {
        self.account = None;
        self.activation = ActivationStatus::NotActivated;
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{amount, MockLedger};
    use secrecy::ExposeSecret;
    use std::sync::Arc;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn setup() -> (Arc<MockLedger>, LedgerGateway) {
        let ledger = Arc::new(MockLedger::new());
        let gateway = LedgerGateway::with_service(ledger.clone(), Network::Testnet);
        (ledger, gateway)
    }

    #[test]
    fn construction_performs_no_io_and_leaves_cache_empty() {
        let (ledger, gateway) = setup();
        let wallet = Wallet::from_mnemonic(PHRASE, gateway).unwrap();

        assert!(wallet.account().is_none());
        assert!(wallet.balance().is_none());
        assert_eq!(wallet.activation(), ActivationStatus::Unknown);
        assert!(ledger.submissions().is_empty());
        assert_eq!(wallet.mnemonic().unwrap().expose_secret(), PHRASE);
        assert_eq!(wallet.seed().unwrap().len(), 64);
    }

    #[test]
    fn invalid_mnemonic_is_rejected() {
        let (_, gateway) = setup();
        let phrase = PHRASE.replace("about", "abandon");
        let err = Wallet::from_mnemonic(&phrase, gateway).unwrap_err();
        assert_eq!(err, WalletError::InvalidMnemonic);
    }

    #[test]
    fn passphrase_changes_identity() {
        let (_, gateway) = setup();
        let plain = Wallet::from_mnemonic(PHRASE, gateway.clone()).unwrap();
        let salted = Wallet::from_mnemonic_with_passphrase(PHRASE, "TREZOR", gateway).unwrap();
        assert_ne!(plain.address(), salted.address());
    }

    #[test]
    fn seed_and_mnemonic_construction_agree() {
        let (_, gateway) = setup();
        let from_phrase = Wallet::from_mnemonic(PHRASE, gateway.clone()).unwrap();
        let seed = crypto::mnemonic_to_seed(PHRASE, "").unwrap();
        let from_seed = Wallet::from_seed(seed, gateway).unwrap();

        assert_eq!(from_phrase.public_key(), from_seed.public_key());
        assert!(from_seed.mnemonic().is_none());
    }

    #[test]
    fn secret_round_trip_preserves_identity() {
        let (_, gateway) = setup();
        let original = Wallet::generate(gateway.clone()).unwrap();
        let restored = Wallet::from_secret(&original.secret_key(), gateway).unwrap();

        assert_eq!(restored.address(), original.address());
        assert!(restored.mnemonic().is_none());
        assert!(restored.seed().is_none());
    }

    #[test]
    fn malformed_secret_is_a_decoding_error() {
        let (_, gateway) = setup();
        let err = Wallet::from_secret("SNOTAREALSECRET", gateway).unwrap_err();
        assert!(matches!(err, WalletError::DecodingError(_)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let (_, gateway) = setup();
        let wallet = Wallet::from_mnemonic(PHRASE, gateway).unwrap();
        let rendered = format!("{:?}", wallet);
        assert!(!rendered.contains("abandon"));
        assert!(!rendered.contains(&wallet.secret_key()));
        assert!(rendered.contains(&wallet.address()));
    }

    #[tokio::test]
    async fn reload_caches_snapshot_and_spendable_balance() {
        let (ledger, gateway) = setup();
        let mut wallet = Wallet::generate(gateway).unwrap();
        ledger.insert_account(wallet.public_key(), 9, "25.5");

        let sequence = wallet.reload().await.unwrap().sequence;
        assert_eq!(sequence, 9);
        assert_eq!(wallet.balance(), Some(amount("24.5")));
        assert_eq!(wallet.activation(), ActivationStatus::Activated);
    }

    #[tokio::test]
    async fn balance_below_reserve_is_zero() {
        let (ledger, gateway) = setup();
        let mut wallet = Wallet::generate(gateway).unwrap();
        ledger.insert_account(wallet.public_key(), 1, "0.5");

        wallet.reload().await.unwrap();
        assert_eq!(wallet.balance(), Some(Amount::ZERO));
    }

    #[tokio::test]
    async fn not_found_reload_clears_cache() {
        let (ledger, gateway) = setup();
        let mut wallet = Wallet::generate(gateway).unwrap();
        ledger.insert_account(wallet.public_key(), 1, "5");
        wallet.reload().await.unwrap();

        ledger.remove_account(wallet.public_key());
        let err = wallet.reload().await.unwrap_err();

        assert!(err.is_account_not_found());
        assert!(wallet.account().is_none());
        assert!(wallet.balance().is_none());
        assert_eq!(wallet.activation(), ActivationStatus::NotActivated);
    }

    #[tokio::test]
    async fn transient_reload_failure_keeps_cache() {
        let (ledger, gateway) = setup();
        let mut wallet = Wallet::generate(gateway).unwrap();
        ledger.insert_account(wallet.public_key(), 3, "5");
        wallet.reload().await.unwrap();
        let cached = wallet.account().cloned();

        ledger.fail_loads_with(Some(WalletError::TransportError("connection reset".into())));
        let err = wallet.reload().await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(wallet.account().cloned(), cached);
        assert_eq!(wallet.activation(), ActivationStatus::Activated);
    }

    #[tokio::test]
    async fn sending_from_missing_account_marks_not_activated() {
        let (ledger, gateway) = setup();
        let mut wallet = Wallet::generate(gateway).unwrap();
        let destination = KeyPair::random();

        let err = wallet
            .send_payment(destination.public_key(), amount("1"), None)
            .await
            .unwrap_err();

        assert!(err.is_account_not_found());
        assert_eq!(wallet.activation(), ActivationStatus::NotActivated);
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn send_does_not_refresh_cache() {
        let (ledger, gateway) = setup();
        let mut wallet = Wallet::generate(gateway).unwrap();
        ledger.insert_account(wallet.public_key(), 1, "10");
        wallet.reload().await.unwrap();

        wallet
            .send_payment(KeyPair::random().public_key(), amount("2"), Some("rent"))
            .await
            .unwrap();

        assert_eq!(ledger.submissions().len(), 1);
        assert_eq!(wallet.balance(), Some(amount("9")));
    }

    #[tokio::test]
    async fn activation_uses_default_starting_balance() {
        let (ledger, gateway) = setup();
        let mut wallet = Wallet::generate(gateway).unwrap();
        ledger.insert_account(wallet.public_key(), 1, "10");
        let destination = KeyPair::random();

        wallet
            .activate_account(destination.public_key())
            .await
            .unwrap();

        let submitted = ledger.submissions();
        assert_eq!(submitted.len(), 1);
        assert!(matches!(
            submitted[0].tx.operations[0],
            crate::transaction::Operation::CreateAccount { starting_balance, .. }
                if starting_balance == Amount::ONE
        ));
    }

    #[tokio::test]
    async fn payment_history_defaults_to_ten_records() {
        let (ledger, gateway) = setup();
        let wallet = Wallet::generate(gateway).unwrap();
        let records: Vec<PaymentRecord> = (0..15)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "id": i.to_string(),
                    "type": "payment",
                    "amount": "1.0000000",
                    "asset_type": "native"
                }))
                .unwrap()
            })
            .collect();
        ledger.set_payments(records);

        assert_eq!(wallet.list_payments(None).await.unwrap().len(), 10);
        assert_eq!(wallet.list_payments(Some(3)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn is_activated_reflects_ledger_without_caching() {
        let (ledger, gateway) = setup();
        let wallet = Wallet::generate(gateway).unwrap();
        assert!(!wallet.is_activated().await.unwrap());

        ledger.insert_account(wallet.public_key(), 1, "1");
        assert!(wallet.is_activated().await.unwrap());
        assert!(wallet.account().is_none());
        assert_eq!(wallet.activation(), ActivationStatus::Unknown);
    }
}
