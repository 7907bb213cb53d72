//! Ledger "StrKey" string encoding for account ids and secret seeds.
//!
//! A StrKey is `base32(version ‖ payload ‖ crc16)`; `G...` strings carry an
//! ed25519 public key, `S...` strings an ed25519 secret seed.

use crate::errors::{WalletError, WalletResult};
use stellar_strkey::ed25519;

/// Length of an encoded 32-byte key (1 + 32 + 2 bytes → 56 characters).
pub const ENCODED_KEY_LEN: usize = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionByte {
    /// `G...` account id (ed25519 public key)
    AccountId,
    /// `S...` ed25519 secret seed
    SecretSeed,
}

impl VersionByte {
    fn label(self) -> &'static str {
        match self {
            VersionByte::AccountId => "account id",
            VersionByte::SecretSeed => "secret seed",
        }
    }
}

/// Encode a 32-byte key under the given version byte.
pub fn encode(version: VersionByte, payload: &[u8; 32]) -> String {
    match version {
        VersionByte::AccountId => ed25519::PublicKey(*payload).to_string(),
        VersionByte::SecretSeed => ed25519::PrivateKey(*payload).to_string(),
    }
}

/// Decode a StrKey, checking version byte and checksum.
///
/// Error messages never echo the input, which may be a secret seed.
pub fn decode(version: VersionByte, encoded: &str) -> WalletResult<[u8; 32]> {
    if encoded.len() != ENCODED_KEY_LEN {
        return Err(WalletError::DecodingError(format!(
            "invalid {} length: expected {} characters, got {}",
            version.label(),
            ENCODED_KEY_LEN,
            encoded.len()
        )));
    }

    let decoded = match version {
        VersionByte::AccountId => ed25519::PublicKey::from_string(encoded).map(|key| key.0),
        VersionByte::SecretSeed => ed25519::PrivateKey::from_string(encoded).map(|key| key.0),
    };
    decoded.map_err(|_| WalletError::DecodingError(format!("invalid {}", version.label())))
}

/// True when `encoded` decodes cleanly under `version`.
pub fn is_valid(version: VersionByte, encoded: &str) -> bool {
    decode(version, encoded).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_account_id_matches_known_encoding() {
        let encoded = encode(VersionByte::AccountId, &[0u8; 32]);
        assert_eq!(
            encoded,
            "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF"
        );
        assert_eq!(decode(VersionByte::AccountId, &encoded).unwrap(), [0u8; 32]);
    }

    #[test]
    fn prefixes_follow_version_byte() {
        let payload = [0x5au8; 32];
        assert!(encode(VersionByte::AccountId, &payload).starts_with('G'));
        assert!(encode(VersionByte::SecretSeed, &payload).starts_with('S'));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let seed = encode(VersionByte::SecretSeed, &[9u8; 32]);
        let err = decode(VersionByte::AccountId, &seed).unwrap_err();
        assert!(matches!(err, WalletError::DecodingError(_)));
    }

    #[test]
    fn corrupted_character_fails_checksum() {
        let mut encoded = encode(VersionByte::AccountId, &[7u8; 32]).into_bytes();
        encoded[10] = if encoded[10] == b'A' { b'B' } else { b'A' };
        let corrupted = String::from_utf8(encoded).unwrap();
        assert!(!is_valid(VersionByte::AccountId, &corrupted));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let encoded = encode(VersionByte::AccountId, &[1u8; 32]);
        assert!(!is_valid(VersionByte::AccountId, &encoded[..55]));
        assert!(!is_valid(VersionByte::AccountId, &format!("{encoded}A")));
    }

    #[test]
    fn decode_errors_do_not_echo_input() {
        let secret = encode(VersionByte::SecretSeed, &[3u8; 32]);
        let mut tampered = secret.clone().into_bytes();
        tampered[20] = if tampered[20] == b'Z' { b'Y' } else { b'Z' };
        let tampered = String::from_utf8(tampered).unwrap();

        let err = decode(VersionByte::SecretSeed, &tampered).unwrap_err();
        assert!(!err.to_string().contains(&tampered));
    }
}
