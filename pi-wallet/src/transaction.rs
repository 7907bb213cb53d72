/// Transaction envelopes for the ledger
///
/// A transaction carries one or more operations, a fee, the source account's
/// next sequence number, an optional text memo and a validity window. It is
/// signed over `SHA-256(network_id ‖ ENVELOPE_TYPE_TX ‖ tx_xdr)` and submitted
/// as a base64-encoded XDR envelope.
use crate::blockchain::{Amount, KeyPair, PublicKey};
use crate::errors::{WalletError, WalletResult};
use crate::network::Network;
use crate::xdr::{ToXdr, XdrWriter};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Fee charged per operation when the network does not report one
pub const DEFAULT_BASE_FEE: u32 = 100;
/// Validity window applied to wallet-built transactions
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(40);
pub const MAX_OPERATIONS: usize = 100;
pub const MEMO_TEXT_MAX_BYTES: usize = 28;
const MAX_SIGNATURES: usize = 20;

const ENVELOPE_TYPE_TX: i32 = 2;
const KEY_TYPE_ED25519: i32 = 0;
const PUBLIC_KEY_TYPE_ED25519: i32 = 0;
const ASSET_TYPE_NATIVE: i32 = 0;
const PRECOND_NONE: i32 = 0;
const PRECOND_TIME: i32 = 1;
const MEMO_NONE: i32 = 0;
const MEMO_TEXT: i32 = 1;
const OP_CREATE_ACCOUNT: i32 = 0;
const OP_PAYMENT: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Memo {
    #[default]
    None,
    Text(String),
}

impl Memo {
    /// Text memo of at most 28 bytes
    pub fn text(text: impl Into<String>) -> WalletResult<Self> {
        let text = text.into();
        if text.len() > MEMO_TEXT_MAX_BYTES {
            return Err(WalletError::ValidationError(format!(
                "Memo text is {} bytes; the limit is {}",
                text.len(),
                MEMO_TEXT_MAX_BYTES
            )));
        }
        Ok(Memo::Text(text))
    }

    /// `None` for a missing or empty memo
    pub fn from_optional(text: Option<&str>) -> WalletResult<Self> {
        match text {
            Some(text) if !text.is_empty() => Memo::text(text),
            _ => Ok(Memo::None),
        }
    }
}

impl ToXdr for Memo {
    fn write_xdr(&self, out: &mut XdrWriter) -> WalletResult<()> {
        match self {
            Memo::None => out.write_i32(MEMO_NONE),
            Memo::Text(text) => {
                out.write_i32(MEMO_TEXT);
                out.write_string(text, MEMO_TEXT_MAX_BYTES)?;
            }
        }
        Ok(())
    }
}

/// Unix-second window during which the network may accept the transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    /// Valid from now until `timeout` has elapsed
    pub fn expiring_in(timeout: Duration) -> Self {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        TimeBounds {
            min_time: 0,
            max_time: now.saturating_add(timeout.as_secs()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create and fund a new account
    CreateAccount {
        destination: PublicKey,
        starting_balance: Amount,
    },
    /// Native-asset payment
    Payment {
        destination: PublicKey,
        amount: Amount,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateAccount { .. } => "create_account",
            Operation::Payment { .. } => "payment",
        }
    }

    pub fn destination(&self) -> &PublicKey {
        match self {
            Operation::CreateAccount { destination, .. } => destination,
            Operation::Payment { destination, .. } => destination,
        }
    }
}

impl ToXdr for Operation {
    fn write_xdr(&self, out: &mut XdrWriter) -> WalletResult<()> {
        // No per-operation source account
        out.write_bool(false);
        match self {
            Operation::CreateAccount {
                destination,
                starting_balance,
            } => {
                out.write_i32(OP_CREATE_ACCOUNT);
                out.write_i32(PUBLIC_KEY_TYPE_ED25519);
                out.write_fixed_opaque(destination.as_bytes());
                out.write_i64(starting_balance.stroops());
            }
            Operation::Payment {
                destination,
                amount,
            } => {
                out.write_i32(OP_PAYMENT);
                write_muxed_account(out, destination);
                out.write_i32(ASSET_TYPE_NATIVE);
                out.write_i64(amount.stroops());
            }
        }
        Ok(())
    }
}

fn write_muxed_account(out: &mut XdrWriter, account: &PublicKey) {
    out.write_i32(KEY_TYPE_ED25519);
    out.write_fixed_opaque(account.as_bytes());
}

/// An unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub source: PublicKey,
    pub fee: u32,
    pub sequence: i64,
    pub time_bounds: Option<TimeBounds>,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

impl Transaction {
    /// Bytes whose SHA-256 is signed
    pub fn signature_base(&self, network: Network) -> WalletResult<Vec<u8>> {
        let mut out = XdrWriter::new();
        out.write_fixed_opaque(&network.network_id());
        out.write_i32(ENVELOPE_TYPE_TX);
        self.write_xdr(&mut out)?;
        Ok(out.into_bytes())
    }

    /// Transaction hash for the given network
    pub fn hash(&self, network: Network) -> WalletResult<[u8; 32]> {
        let base = self.signature_base(network)?;
        Ok(Sha256::digest(&base).into())
    }

    /// Sign and wrap into an envelope
    pub fn sign(self, keypair: &KeyPair, network: Network) -> WalletResult<TransactionEnvelope> {
        let mut envelope = TransactionEnvelope::new(self);
        envelope.sign(keypair, network)?;
        Ok(envelope)
    }
}

impl ToXdr for Transaction {
    fn write_xdr(&self, out: &mut XdrWriter) -> WalletResult<()> {
        write_muxed_account(out, &self.source);
        out.write_u32(self.fee);
        out.write_i64(self.sequence);
        match self.time_bounds {
            Some(bounds) => {
                out.write_i32(PRECOND_TIME);
                out.write_u64(bounds.min_time);
                out.write_u64(bounds.max_time);
            }
            None => out.write_i32(PRECOND_NONE),
        }
        self.memo.write_xdr(out)?;
        out.write_array(&self.operations, MAX_OPERATIONS)?;
        // ext v0
        out.write_i32(0);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: [u8; 64],
}

impl ToXdr for DecoratedSignature {
    fn write_xdr(&self, out: &mut XdrWriter) -> WalletResult<()> {
        out.write_fixed_opaque(&self.hint);
        out.write_var_opaque(&self.signature, 64)
    }
}

/// A transaction plus its signatures, ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    pub fn new(tx: Transaction) -> Self {
        TransactionEnvelope {
            tx,
            signatures: Vec::new(),
        }
    }

    /// Add a signature by `keypair` for `network`
    pub fn sign(&mut self, keypair: &KeyPair, network: Network) -> WalletResult<()> {
        if self.signatures.len() >= MAX_SIGNATURES {
            return Err(WalletError::ValidationError(
                "Envelope already carries the maximum number of signatures".to_string(),
            ));
        }
        let hash = self.tx.hash(network)?;
        self.signatures.push(DecoratedSignature {
            hint: keypair.public_key().signature_hint(),
            signature: keypair.sign(&hash),
        });
        Ok(())
    }

    /// True when one of the signatures is valid for `public_key` on `network`
    pub fn verify_signature(&self, public_key: &PublicKey, network: Network) -> WalletResult<bool> {
        let hash = self.tx.hash(network)?;
        let hint = public_key.signature_hint();
        for decorated in self.signatures.iter().filter(|sig| sig.hint == hint) {
            if public_key.verify_signature(&hash, &decorated.signature)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn hash_hex(&self, network: Network) -> WalletResult<String> {
        Ok(hex::encode(self.tx.hash(network)?))
    }

    /// Base64 XDR, the form the network accepts
    pub fn to_xdr_base64(&self) -> WalletResult<String> {
        Ok(BASE64.encode(self.to_xdr()?))
    }
}

impl ToXdr for TransactionEnvelope {
    fn write_xdr(&self, out: &mut XdrWriter) -> WalletResult<()> {
        out.write_i32(ENVELOPE_TYPE_TX);
        self.tx.write_xdr(out)?;
        out.write_array(&self.signatures, MAX_SIGNATURES)
    }
}

/// Builds a [`Transaction`] from the source account's current state
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source: PublicKey,
    account_sequence: i64,
    base_fee: u32,
    memo: Memo,
    time_bounds: Option<TimeBounds>,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    /// `account_sequence` is the source account's current sequence number
    pub fn new(source: PublicKey, account_sequence: i64, base_fee: u32) -> Self {
        TransactionBuilder {
            source,
            account_sequence,
            base_fee,
            memo: Memo::None,
            time_bounds: None,
            operations: Vec::new(),
        }
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Expire the transaction `timeout` from now
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.time_bounds = Some(TimeBounds::expiring_in(timeout));
        self
    }

    pub fn time_bounds(mut self, bounds: TimeBounds) -> Self {
        self.time_bounds = Some(bounds);
        self
    }

    pub fn build(self) -> WalletResult<Transaction> {
        if self.operations.is_empty() {
            return Err(WalletError::ValidationError(
                "Transaction must have at least one operation".to_string(),
            ));
        }
        if self.operations.len() > MAX_OPERATIONS {
            return Err(WalletError::ValidationError(format!(
                "Transaction has {} operations; the limit is {}",
                self.operations.len(),
                MAX_OPERATIONS
            )));
        }

        let time_bounds = self.time_bounds.ok_or_else(|| {
            WalletError::ValidationError("Transaction validity window must be set".to_string())
        })?;
        if time_bounds.max_time != 0 && time_bounds.max_time < time_bounds.min_time {
            return Err(WalletError::ValidationError(
                "Transaction validity window ends before it starts".to_string(),
            ));
        }

        let fee = u32::try_from(self.operations.len())
            .ok()
            .and_then(|count| self.base_fee.checked_mul(count))
            .ok_or_else(|| WalletError::ValidationError("Transaction fee overflow".to_string()))?;

        let sequence = self.account_sequence.checked_add(1).ok_or_else(|| {
            WalletError::ValidationError("Account sequence number overflow".to_string())
        })?;

        Ok(Transaction {
            source: self.source,
            fee,
            sequence,
            time_bounds: Some(time_bounds),
            memo: self.memo,
            operations: self.operations,
        })
    }
}
