/// Core ledger key and amount types for the Pi wallet
///
/// Accounts are identified by their ed25519 public key, rendered as a
/// `G...` StrKey address. Secret keys are 32-byte ed25519 seeds rendered
/// as `S...` StrKeys.
use crate::errors::{WalletError, WalletResult};
use crate::strkey::{self, VersionByte};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An account identifier on the ledger (ed25519 public key)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl PublicKey {
    /// Ed25519 public key size in bytes
    pub const SIZE: usize = 32;

    /// Create a public key from raw bytes, rejecting points off the curve
    pub fn from_bytes(bytes: [u8; 32]) -> WalletResult<Self> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|e| WalletError::DecodingError(format!("Invalid public key: {}", e)))?;
        Ok(PublicKey { bytes })
    }

    /// Parse a `G...` account address
    pub fn from_address(address: &str) -> WalletResult<Self> {
        let bytes = strkey::decode(VersionByte::AccountId, address)?;
        Self::from_bytes(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// The `G...` address string
    pub fn address(&self) -> String {
        strkey::encode(VersionByte::AccountId, &self.bytes)
    }

    /// Last four bytes of the key, used as the signature hint in envelopes
    pub fn signature_hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.bytes[28..]);
        hint
    }

    /// Verify a signature against data
    pub fn verify_signature(&self, data: &[u8], signature: &[u8]) -> WalletResult<bool> {
        let verifying_key = VerifyingKey::from_bytes(&self.bytes)
            .map_err(|e| WalletError::CryptoError(format!("Failed to create verifying key: {}", e)))?;

        let sig_bytes: [u8; 64] = signature
            .try_into()
            .map_err(|_| WalletError::CryptoError("Invalid signature format".to_string()))?;
        let sig = Signature::from_bytes(&sig_bytes);

        Ok(verifying_key.verify(data, &sig).is_ok())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.address()).finish()
    }
}

impl FromStr for PublicKey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicKey::from_address(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.address())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let address = String::deserialize(deserializer)?;
        PublicKey::from_address(&address).map_err(serde::de::Error::custom)
    }
}

/// A 32-byte ed25519 secret seed, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; 32],
}

impl SecretKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SecretKey { bytes }
    }

    /// Parse an `S...` secret seed string
    pub fn from_strkey(secret: &str) -> WalletResult<Self> {
        let bytes = strkey::decode(VersionByte::SecretSeed, secret)?;
        Ok(SecretKey { bytes })
    }

    /// Export as an `S...` string (sensitive!)
    pub fn to_strkey(&self) -> String {
        strkey::encode(VersionByte::SecretSeed, &self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Signing keypair. The public key is always derived from the secret.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Build a keypair from a raw 32-byte ed25519 seed
    pub fn from_raw_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let public = PublicKey {
            bytes: signing_key.verifying_key().to_bytes(),
        };
        KeyPair {
            secret: SecretKey::from_bytes(seed),
            public,
        }
    }

    /// Decode an `S...` secret key string into a keypair
    pub fn from_secret(secret: &str) -> WalletResult<Self> {
        let secret = SecretKey::from_strkey(secret)?;
        Ok(Self::from_raw_seed(*secret.as_bytes()))
    }

    /// Generate a new random keypair
    pub fn random() -> Self {
        use rand::rngs::OsRng;
        use rand::RngCore;
        use zeroize::Zeroizing;

        let mut seed = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut seed[..]);
        Self::from_raw_seed(*seed)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// The `G...` address of this keypair
    pub fn address(&self) -> String {
        self.public.address()
    }

    /// The `S...` secret string (sensitive!)
    pub fn secret(&self) -> String {
        self.secret.to_strkey()
    }

    /// Sign data with this keypair's secret key
    pub fn sign(&self, data: &[u8]) -> [u8; 64] {
        let signing_key = SigningKey::from_bytes(self.secret.as_bytes());
        signing_key.sign(data).to_bytes()
    }

    pub fn verify(&self, data: &[u8], signature: &[u8]) -> WalletResult<bool> {
        self.public.verify_signature(data, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public.address())
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Represents an amount of the native asset
///
/// Uses fixed-point arithmetic to avoid floating-point precision issues.
/// The base unit is the stroop: 1 Pi = 10_000_000 stroops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    stroops: i64,
}

impl Amount {
    /// Number of decimal places for the native asset
    pub const DECIMALS: u8 = 7;
    /// Stroops per whole unit (10^7)
    pub const STROOPS_PER_UNIT: i64 = 10_000_000;
    pub const ZERO: Amount = Amount { stroops: 0 };
    pub const ONE: Amount = Amount {
        stroops: Self::STROOPS_PER_UNIT,
    };

    /// Create amount from stroops
    pub fn from_stroops(stroops: i64) -> WalletResult<Self> {
        if stroops < 0 {
            return Err(WalletError::InvalidAmount(
                "Amount cannot be negative".to_string(),
            ));
        }
        Ok(Amount { stroops })
    }

    /// Create amount from whole units
    pub fn from_units(units: i64) -> WalletResult<Self> {
        let stroops = units
            .checked_mul(Self::STROOPS_PER_UNIT)
            .ok_or_else(|| WalletError::InvalidAmount("Amount calculation overflow".to_string()))?;
        Self::from_stroops(stroops)
    }

    /// Create amount from string (supports decimal notation)
    pub fn from_string(amount_str: &str) -> WalletResult<Self> {
        let amount_str = amount_str.trim();
        if amount_str.is_empty() {
            return Err(WalletError::InvalidAmount(
                "Amount cannot be empty".to_string(),
            ));
        }

        let (whole_str, fractional_str) = match amount_str.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (amount_str, None),
        };

        let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole_str) {
            return Err(WalletError::InvalidAmount(
                "Invalid number format".to_string(),
            ));
        }

        let whole: i64 = whole_str
            .parse()
            .map_err(|_| WalletError::InvalidAmount("Amount overflow".to_string()))?;

        let fractional = match fractional_str {
            Some(fraction) => {
                if !is_digits(fraction) {
                    return Err(WalletError::InvalidAmount(
                        "Invalid decimal format".to_string(),
                    ));
                }
                if fraction.len() > Self::DECIMALS as usize {
                    return Err(WalletError::InvalidAmount(
                        "Too many decimal places".to_string(),
                    ));
                }
                // Pad with zeros to get full precision
                format!("{:0<7}", fraction)
                    .parse::<i64>()
                    .map_err(|_| WalletError::InvalidAmount("Invalid fractional part".to_string()))?
            }
            None => 0,
        };

        let stroops = whole
            .checked_mul(Self::STROOPS_PER_UNIT)
            .and_then(|w| w.checked_add(fractional))
            .ok_or_else(|| WalletError::InvalidAmount("Amount overflow".to_string()))?;

        Self::from_stroops(stroops)
    }

    pub fn stroops(&self) -> i64 {
        self.stroops
    }

    pub fn is_zero(&self) -> bool {
        self.stroops == 0
    }

    /// Get amount as string with full precision
    pub fn as_string(&self) -> String {
        let whole = self.stroops / Self::STROOPS_PER_UNIT;
        let fractional = self.stroops % Self::STROOPS_PER_UNIT;

        if fractional == 0 {
            whole.to_string()
        } else {
            let frac_str = format!("{:07}", fractional);
            format!("{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }

    pub fn checked_add(&self, other: &Amount) -> WalletResult<Amount> {
        self.stroops
            .checked_add(other.stroops)
            .map(|stroops| Amount { stroops })
            .ok_or_else(|| WalletError::InvalidAmount("Amount overflow in addition".to_string()))
    }

    pub fn checked_sub(&self, other: &Amount) -> WalletResult<Amount> {
        if self.stroops < other.stroops {
            return Err(WalletError::InvalidAmount(
                "Insufficient amount for subtraction".to_string(),
            ));
        }
        Ok(Amount {
            stroops: self.stroops - other.stroops,
        })
    }

    /// Subtract, clamping at zero
    pub fn saturating_sub(&self, other: &Amount) -> Amount {
        Amount {
            stroops: (self.stroops - other.stroops).max(0),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl FromStr for Amount {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::from_string(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::from_string(&raw).map_err(serde::de::Error::custom)
    }
}
