/// Mnemonic handling and hierarchical key derivation for the wallet
///
/// Mnemonics follow BIP-39 (English wordlist). Keys are derived with
/// SLIP-0010 for ed25519, which only defines hardened children, and the
/// resulting 32-byte private key is used directly as the ledger signing seed.
use crate::blockchain::KeyPair;
use crate::errors::{WalletError, WalletResult};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Fixed derivation path for Pi wallets. Changing it changes every wallet identity.
pub const PI_DERIVATION_PATH: &str = "m/44'/314159'/0'";

const SLIP10_ED25519_CURVE: &[u8] = b"ed25519 seed";
const HARDENED_OFFSET: u32 = 0x8000_0000;
const MIN_SEED_BYTES: usize = 16;
const MAX_SEED_BYTES: usize = 64;

type HmacSha512 = Hmac<Sha512>;

/// Supported mnemonic entropy sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MnemonicStrength {
    /// 128 bits, 12 words
    Bits128,
    /// 256 bits, 24 words
    #[default]
    Bits256,
}

impl MnemonicStrength {
    pub fn entropy_bytes(self) -> usize {
        match self {
            MnemonicStrength::Bits128 => 16,
            MnemonicStrength::Bits256 => 32,
        }
    }

    pub fn word_count(self) -> usize {
        match self {
            MnemonicStrength::Bits128 => 12,
            MnemonicStrength::Bits256 => 24,
        }
    }
}

impl TryFrom<u32> for MnemonicStrength {
    type Error = WalletError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            128 => Ok(MnemonicStrength::Bits128),
            256 => Ok(MnemonicStrength::Bits256),
            other => Err(WalletError::ValidationError(format!(
                "Unsupported mnemonic strength: {} bits (expected 128 or 256)",
                other
            ))),
        }
    }
}

/// Generate a BIP-39 mnemonic from OS randomness
pub fn generate_mnemonic(strength: MnemonicStrength) -> WalletResult<Zeroizing<String>> {
    use bip39::Mnemonic;
    use rand::{rngs::OsRng, RngCore};

    let mut entropy = Zeroizing::new(vec![0u8; strength.entropy_bytes()]);
    OsRng
        .try_fill_bytes(&mut entropy[..])
        .map_err(|e| WalletError::CryptoError(format!("Failed to generate entropy: {}", e)))?;

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| WalletError::CryptoError(format!("Failed to create mnemonic: {}", e)))?;

    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Check word membership and checksum. Never fails; callers decide how to react.
pub fn validate_mnemonic(phrase: &str) -> bool {
    parse_mnemonic(phrase).is_ok()
}

/// Derive the 64-byte BIP-39 seed. Invalid phrases never produce a seed.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> WalletResult<Seed> {
    let mnemonic = parse_mnemonic(phrase)?;
    let seed = Zeroizing::new(mnemonic.to_seed(passphrase));
    Seed::from_bytes(&seed[..])
}

fn parse_mnemonic(phrase: &str) -> WalletResult<bip39::Mnemonic> {
    use bip39::{Language, Mnemonic};

    Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|_| WalletError::InvalidMnemonic)
}

/// Raw key-derivation material, wiped on drop
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    bytes: Zeroizing<Vec<u8>>,
}

impl Seed {
    pub fn from_bytes(bytes: &[u8]) -> WalletResult<Self> {
        if !(MIN_SEED_BYTES..=MAX_SEED_BYTES).contains(&bytes.len()) {
            return Err(WalletError::ValidationError(format!(
                "Seed must be between {} and {} bytes, got {}",
                MIN_SEED_BYTES,
                MAX_SEED_BYTES,
                bytes.len()
            )));
        }
        Ok(Seed {
            bytes: Zeroizing::new(bytes.to_vec()),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("len", &self.bytes.len())
            .field("bytes", &"<redacted>")
            .finish()
    }
}

/// A fully hardened derivation path such as `m/44'/314159'/0'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    indices: Vec<u32>,
}

impl DerivationPath {
    /// The fixed Pi wallet path
    pub fn pi() -> Self {
        DerivationPath {
            indices: vec![44, 314159, 0],
        }
    }

    /// Unhardened segment indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let mut segments = path.trim().split('/');
        if segments.next() != Some("m") {
            return Err(WalletError::ValidationError(
                "Derivation path must start with 'm'".to_string(),
            ));
        }

        let indices = segments
            .map(|segment| {
                let index = segment
                    .strip_suffix('\'')
                    .or_else(|| segment.strip_suffix('h'))
                    .or_else(|| segment.strip_suffix('H'))
                    .ok_or_else(|| {
                        WalletError::ValidationError(format!(
                            "Segment '{}' is not hardened; ed25519 derivation requires hardened paths",
                            segment
                        ))
                    })?;
                let index: u32 = index.parse().map_err(|_| {
                    WalletError::ValidationError(format!("Invalid path segment '{}'", segment))
                })?;
                if index >= HARDENED_OFFSET {
                    return Err(WalletError::ValidationError(format!(
                        "Path index {} out of range",
                        index
                    )));
                }
                Ok(index)
            })
            .collect::<WalletResult<Vec<u32>>>()?;

        Ok(DerivationPath { indices })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.indices {
            write!(f, "/{}'", index)?;
        }
        Ok(())
    }
}

struct ExtendedKey {
    key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    fn from_hmac(key: &[u8], parts: &[&[u8]]) -> WalletResult<Self> {
        let mut mac = HmacSha512::new_from_slice(key)
            .map_err(|e| WalletError::DerivationError(format!("HMAC error: {}", e)))?;
        for part in parts {
            mac.update(part);
        }
        let mut output = Zeroizing::new([0u8; 64]);
        output.copy_from_slice(&mac.finalize().into_bytes());

        let (left, right) = output.split_at(32);
        let key: [u8; 32] = left
            .try_into()
            .map_err(|_| WalletError::DerivationError("derived node has no private key".to_string()))?;
        let chain_code: [u8; 32] = right
            .try_into()
            .map_err(|_| WalletError::DerivationError("derived node has no chain code".to_string()))?;

        Ok(ExtendedKey {
            key: Zeroizing::new(key),
            chain_code: Zeroizing::new(chain_code),
        })
    }

    fn master(seed: &Seed) -> WalletResult<Self> {
        Self::from_hmac(SLIP10_ED25519_CURVE, &[seed.as_bytes()])
    }

    fn derive_hardened(&self, index: u32) -> WalletResult<Self> {
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        Self::from_hmac(&self.chain_code[..], &[&[0u8][..], &self.key[..], &hardened[..]])
    }
}

/// Derive the ledger keypair at `path`. Pure: same seed and path, same keys.
pub fn derive_keypair(seed: &Seed, path: &DerivationPath) -> WalletResult<KeyPair> {
    let mut node = ExtendedKey::master(seed)?;
    for &index in path.indices() {
        node = node.derive_hardened(index)?;
    }

    if node.key.iter().all(|&byte| byte == 0) {
        return Err(WalletError::DerivationError(
            "derived node has no usable private key".to_string(),
        ));
    }

    Ok(KeyPair::from_raw_seed(*node.key))
}
