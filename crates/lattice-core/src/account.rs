//! Account key derivation and the checksummed account ID codec.
//!
//! Accounts are ed25519 key pairs whose signatures use Blake2b-512 as the
//! inner hash instead of SHA-512. Private keys derive deterministically from
//! a 32-byte wallet seed and a 32-bit index. An account ID is the public key
//! encoded as Nano Base32 with a byte-reversed 5-byte Blake2b checksum
//! appended, behind an `xrb_` or `nano_` prefix.

use std::fmt;

use blake2::digest::consts::{U32, U5};
use blake2::{Blake2b, Blake2b512, Digest};
use ed25519_dalek::hazmat::ExpandedSecretKey;
use ed25519_dalek::VerifyingKey;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::nbase32;

type Blake2b256 = Blake2b<U32>;
type Blake2bChecksum = Blake2b<U5>;

/// Characters the data part of a valid account ID can start with.
pub const ACCOUNT_ID_FIRST_DIGITS: &[char] = &['1', '3'];

/// Length of the data part of an account ID: 52 characters of public key
/// plus 8 characters of checksum.
const ACCOUNT_ID_DATA_LENGTH: usize = 60;

/// Errors raised when deriving keys or converting account IDs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// The seed is not a 64-character hexadecimal string.
    #[error("seed must be a 64-character hexadecimal string")]
    InvalidSeed,
    /// The private key is not a 64-character hexadecimal string.
    #[error("account private key must be a 64-character hexadecimal string")]
    InvalidPrivateKey,
    /// The public key is not a 64-character hexadecimal string.
    #[error("account public key must be a 64-character hexadecimal string")]
    InvalidPublicKey,
    /// The account ID has an unrecognized prefix, a bad length or characters
    /// outside the alphabet.
    #[error("invalid account ID")]
    InvalidAccount,
    /// The account ID parsed but its checksum does not match the public key.
    #[error("invalid account ID checksum")]
    ChecksumMismatch,
}

/// Prefixes recognized in account IDs.
///
/// Both encode the same public key and are interchangeable when parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccountPrefix {
    /// Legacy prefix. Recognized universally.
    #[default]
    Xrb,
    /// Current prefix. May not be supported by older endpoints.
    Nano,
}

impl AccountPrefix {
    /// The prefix as it appears at the start of an account ID.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountPrefix::Xrb => "xrb_",
            AccountPrefix::Nano => "nano_",
        }
    }

    fn matching(account_id: &str) -> Option<(AccountPrefix, &str)> {
        for prefix in [AccountPrefix::Xrb, AccountPrefix::Nano] {
            if let Some(rest) = account_id.strip_prefix(prefix.as_str()) {
                return Some((prefix, rest));
            }
        }
        None
    }
}

impl fmt::Display for AccountPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account's private and public key as 64-character hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKeyPair {
    /// Private key.
    pub private: String,
    /// Public key.
    pub public: String,
}

/// Exactly one key identifying an account when deriving an account ID.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a> {
    /// Public key as a 64-character hex string.
    PublicKey(&'a str),
    /// Private key as a 64-character hex string.
    PrivateKey(&'a str),
}

/// Exactly one identifier that resolves to an account's public key.
#[derive(Debug, Clone, Copy)]
pub enum AccountSource<'a> {
    /// Account ID string.
    AccountId(&'a str),
    /// Private key as a 64-character hex string.
    PrivateKey(&'a str),
}

/// Validate a wallet seed.
pub fn validate_seed(seed: &str) -> Result<&str, AccountError> {
    if seed.len() != 64 || !crate::is_hex(seed) {
        return Err(AccountError::InvalidSeed);
    }
    Ok(seed)
}

/// Validate a private key.
pub fn validate_private_key(private_key: &str) -> Result<&str, AccountError> {
    if private_key.len() != 64 || !crate::is_hex(private_key) {
        return Err(AccountError::InvalidPrivateKey);
    }
    Ok(private_key)
}

/// Validate a public key.
pub fn validate_public_key(public_key: &str) -> Result<&str, AccountError> {
    if public_key.len() != 64 || !crate::is_hex(public_key) {
        return Err(AccountError::InvalidPublicKey);
    }
    Ok(public_key)
}

/// Validate an account ID, including its checksum.
pub fn validate_account_id(account_id: &str) -> Result<&str, AccountError> {
    get_account_public_key(AccountSource::AccountId(account_id))?;
    Ok(account_id)
}

/// Check whether an account ID is valid.
pub fn is_account_id_valid(account_id: &str) -> bool {
    get_account_public_key(AccountSource::AccountId(account_id)).is_ok()
}

fn decode_key(key: &str, error: AccountError) -> Result<[u8; 32], AccountError> {
    let bytes = hex::decode(key).map_err(|_| error.clone())?;
    bytes.try_into().map_err(|_| error)
}

/// Expand a raw private key into the ed25519-Blake2b signing state and its
/// verifying key.
pub(crate) fn signing_keys(private_key: &[u8; 32]) -> (ExpandedSecretKey, VerifyingKey) {
    let mut expanded_bytes = [0u8; 64];
    expanded_bytes.copy_from_slice(&Blake2b512::digest(private_key));
    let expanded = ExpandedSecretKey::from(&expanded_bytes);
    let verifying_key = VerifyingKey::from(&expanded);
    (expanded, verifying_key)
}

/// Byte-reversed 5-byte Blake2b digest of the public key.
fn checksum(public_key: &[u8]) -> [u8; 5] {
    let mut digest: [u8; 5] = Blake2bChecksum::digest(public_key).into();
    digest.reverse();
    digest
}

/// Derive the public key from a private key and return the full key pair.
pub fn key_pair_from_private_key(private_key: &str) -> Result<AccountKeyPair, AccountError> {
    validate_private_key(private_key)?;
    let private_bytes = decode_key(private_key, AccountError::InvalidPrivateKey)?;
    let (_, verifying_key) = signing_keys(&private_bytes);

    Ok(AccountKeyPair {
        private: private_key.to_lowercase(),
        public: hex::encode(verifying_key.to_bytes()),
    })
}

/// Derive an account's private key from a seed and index.
///
/// The key is the 32-byte Blake2b digest of the seed bytes followed by the
/// index as a big-endian 32-bit integer.
pub fn generate_account_private_key(seed: &str, index: u32) -> Result<String, AccountError> {
    validate_seed(seed)?;
    let seed_bytes = hex::decode(seed).map_err(|_| AccountError::InvalidSeed)?;

    let mut hasher = Blake2b256::new();
    hasher.update(&seed_bytes);
    hasher.update(index.to_be_bytes());

    Ok(hex::encode(hasher.finalize()))
}

/// Derive an account key pair from a seed and index.
///
/// Deterministic: repeated calls with the same inputs yield the same pair.
pub fn generate_account_key_pair(seed: &str, index: u32) -> Result<AccountKeyPair, AccountError> {
    let private_key = generate_account_private_key(seed, index)?;
    key_pair_from_private_key(&private_key)
}

/// Build an account ID from either a public or a private key.
pub fn get_account_id(source: KeySource<'_>, prefix: AccountPrefix) -> Result<String, AccountError> {
    let public_key = match source {
        KeySource::PublicKey(public_key) => {
            validate_public_key(public_key)?;
            public_key.to_lowercase()
        }
        KeySource::PrivateKey(private_key) => key_pair_from_private_key(private_key)?.public,
    };

    let key_bytes = hex::decode(&public_key).map_err(|_| AccountError::InvalidPublicKey)?;
    let account = nbase32::encode(&key_bytes).map_err(|_| AccountError::InvalidPublicKey)?;
    let check = nbase32::encode(&checksum(&key_bytes)).map_err(|_| AccountError::InvalidPublicKey)?;

    Ok(format!("{}{}{}", prefix, account, check))
}

/// Resolve an account's public key from either an account ID or a private
/// key.
///
/// The account ID's checksum is recomputed from the decoded public key and
/// compared against the trailing checksum field; it is never merely parsed.
pub fn get_account_public_key(source: AccountSource<'_>) -> Result<String, AccountError> {
    match source {
        AccountSource::AccountId(account_id) => {
            let (_, rest) =
                AccountPrefix::matching(account_id).ok_or(AccountError::InvalidAccount)?;

            if rest.len() != ACCOUNT_ID_DATA_LENGTH {
                return Err(AccountError::InvalidAccount);
            }
            let first = rest.chars().next().ok_or(AccountError::InvalidAccount)?;
            if !ACCOUNT_ID_FIRST_DIGITS.contains(&first) {
                return Err(AccountError::InvalidAccount);
            }

            let raw = nbase32::decode(rest).map_err(|_| AccountError::InvalidAccount)?;
            let (public_key, check) = raw.split_at(32);

            if checksum(public_key) != check {
                return Err(AccountError::ChecksumMismatch);
            }

            Ok(hex::encode(public_key))
        }
        AccountSource::PrivateKey(private_key) => {
            Ok(key_pair_from_private_key(private_key)?.public)
        }
    }
}

/// Derive an account ID from a seed and index using the default prefix.
pub fn generate_account_id(seed: &str, index: u32) -> Result<String, AccountError> {
    let key_pair = generate_account_key_pair(seed, index)?;
    get_account_id(
        KeySource::PublicKey(&key_pair.public),
        AccountPrefix::default(),
    )
}

/// Generate a random 64-character hexadecimal wallet seed from OS
/// randomness.
pub fn generate_seed() -> String {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    hex::encode(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "bba817a4fa1418e10d014c99055c4922afa0f84b324e7850baf4b3b8b6af1a5b";
    const FIRST_PRIVATE_KEY: &str =
        "64e0752579d3e6a6ea4f60b6596ff62cd59fc3160a687fe999522121d0a73c06";
    const FIRST_PUBLIC_KEY: &str =
        "6ab5902b8e71b57f4b7680368eca010aa658affec3fd00adb4155dcee14efe29";
    const FIRST_ACCOUNT_ID_XRB: &str =
        "xrb_1took1orwwfohx7qf13pju7144o8d4qzxizx14pua7cxsuinxzjbb6goarud";
    const FIRST_ACCOUNT_ID_NANO: &str =
        "nano_1took1orwwfohx7qf13pju7144o8d4qzxizx14pua7cxsuinxzjbb6goarud";
    const BURN_ACCOUNT_ID: &str =
        "xrb_1111111111111111111111111111111111111111111111111111hifc8npp";

    #[test]
    fn test_validate_seed() {
        assert_eq!(validate_seed(&"a".repeat(63)), Err(AccountError::InvalidSeed));
        assert_eq!(validate_seed(&"g".repeat(64)), Err(AccountError::InvalidSeed));
        assert!(validate_seed(SEED).is_ok());
    }

    #[test]
    fn test_generate_account_private_key() {
        assert_eq!(
            generate_account_private_key(&"a".repeat(63), 0),
            Err(AccountError::InvalidSeed)
        );

        assert_eq!(
            generate_account_private_key(SEED, 0).unwrap(),
            FIRST_PRIVATE_KEY
        );
        assert_eq!(
            generate_account_private_key(SEED, 1).unwrap(),
            "69def30716080acafa63a257e513b02cffce6736a566fc89afcdc81b08e54d7d"
        );
        assert_eq!(
            generate_account_private_key(SEED, 10).unwrap(),
            "da45500aeb14c367fb9d8bb00c9e77152c418e1e6e472858856a72d9420859fd"
        );
    }

    #[test]
    fn test_generate_account_key_pair_is_deterministic() {
        let a = generate_account_key_pair(SEED, 0).unwrap();
        let b = generate_account_key_pair(SEED, 0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.private, FIRST_PRIVATE_KEY);
        assert_eq!(a.public, FIRST_PUBLIC_KEY);
    }

    #[test]
    fn test_key_pair_from_private_key() {
        assert_eq!(
            key_pair_from_private_key(&"a".repeat(63)),
            Err(AccountError::InvalidPrivateKey)
        );
        assert_eq!(
            key_pair_from_private_key(&"g".repeat(64)),
            Err(AccountError::InvalidPrivateKey)
        );

        let key_pair = key_pair_from_private_key(FIRST_PRIVATE_KEY).unwrap();
        assert_eq!(key_pair.private, FIRST_PRIVATE_KEY);
        assert_eq!(key_pair.public, FIRST_PUBLIC_KEY);
    }

    #[test]
    fn test_get_account_id_from_public_key() {
        assert_eq!(
            get_account_id(KeySource::PublicKey(&"a".repeat(65)), AccountPrefix::Xrb),
            Err(AccountError::InvalidPublicKey)
        );

        assert_eq!(
            get_account_id(KeySource::PublicKey(&"0".repeat(64)), AccountPrefix::Xrb).unwrap(),
            BURN_ACCOUNT_ID
        );
        assert_eq!(
            get_account_id(KeySource::PublicKey(FIRST_PUBLIC_KEY), AccountPrefix::Xrb).unwrap(),
            FIRST_ACCOUNT_ID_XRB
        );
        assert_eq!(
            get_account_id(KeySource::PublicKey(FIRST_PUBLIC_KEY), AccountPrefix::Nano).unwrap(),
            FIRST_ACCOUNT_ID_NANO
        );
    }

    #[test]
    fn test_get_account_id_from_private_key() {
        assert_eq!(
            get_account_id(KeySource::PrivateKey(&"g".repeat(64)), AccountPrefix::Xrb),
            Err(AccountError::InvalidPrivateKey)
        );

        assert_eq!(
            get_account_id(KeySource::PrivateKey(&"0".repeat(64)), AccountPrefix::Xrb).unwrap(),
            "xrb_18gmu6engqhgtjnppqam181o5nfhj4sdtgyhy36dan3jr9spt84rzwmktafc"
        );
        assert_eq!(
            get_account_id(KeySource::PrivateKey(FIRST_PRIVATE_KEY), AccountPrefix::Xrb).unwrap(),
            FIRST_ACCOUNT_ID_XRB
        );
    }

    #[test]
    fn test_get_account_public_key() {
        assert_eq!(
            get_account_public_key(AccountSource::AccountId(FIRST_ACCOUNT_ID_XRB)).unwrap(),
            FIRST_PUBLIC_KEY
        );
        assert_eq!(
            get_account_public_key(AccountSource::AccountId(FIRST_ACCOUNT_ID_NANO)).unwrap(),
            FIRST_PUBLIC_KEY
        );
        assert_eq!(
            get_account_public_key(AccountSource::PrivateKey(FIRST_PRIVATE_KEY)).unwrap(),
            FIRST_PUBLIC_KEY
        );
    }

    #[test]
    fn test_account_id_round_trip() {
        for prefix in [AccountPrefix::Xrb, AccountPrefix::Nano] {
            let id = get_account_id(KeySource::PublicKey(FIRST_PUBLIC_KEY), prefix).unwrap();
            let public_key = get_account_public_key(AccountSource::AccountId(&id)).unwrap();
            assert_eq!(public_key, FIRST_PUBLIC_KEY);
        }
    }

    #[test]
    fn test_invalid_account_ids() {
        // Unrecognized prefix
        assert_eq!(
            get_account_public_key(AccountSource::AccountId(
                "ban_1took1orwwfohx7qf13pju7144o8d4qzxizx14pua7cxsuinxzjbb6goarud"
            )),
            Err(AccountError::InvalidAccount)
        );
        // No separator at all
        assert_eq!(
            get_account_public_key(AccountSource::AccountId("nonsense")),
            Err(AccountError::InvalidAccount)
        );
        // Wrong length
        assert_eq!(
            get_account_public_key(AccountSource::AccountId(
                "xrb_1took1orwwfohx7qf13pju7144o8d4qzxizx14pua7cxsuinxzjbb6goaru"
            )),
            Err(AccountError::InvalidAccount)
        );
        // First data character outside the permitted set
        assert_eq!(
            get_account_public_key(AccountSource::AccountId(
                "xrb_4took1orwwfohx7qf13pju7144o8d4qzxizx14pua7cxsuinxzjbb6goarud"
            )),
            Err(AccountError::InvalidAccount)
        );
        // Character outside the alphabet
        assert_eq!(
            get_account_public_key(AccountSource::AccountId(
                "xrb_1took2orwwfohx7qf13pju7144o8d4qzxizx14pua7cxsuinxzjbb6goarud"
            )),
            Err(AccountError::InvalidAccount)
        );
    }

    #[test]
    fn test_corrupted_checksum_is_rejected() {
        // Corrupt each checksum character in turn; every single-character
        // change must be caught.
        let data_start = FIRST_ACCOUNT_ID_XRB.len() - 8;
        for i in data_start..FIRST_ACCOUNT_ID_XRB.len() {
            let mut corrupted: Vec<char> = FIRST_ACCOUNT_ID_XRB.chars().collect();
            corrupted[i] = if corrupted[i] == '1' { '3' } else { '1' };
            let corrupted: String = corrupted.into_iter().collect();
            assert_eq!(
                get_account_public_key(AccountSource::AccountId(&corrupted)),
                Err(AccountError::ChecksumMismatch),
                "corruption at index {} was not caught",
                i
            );
        }
    }

    #[test]
    fn test_is_account_id_valid() {
        assert!(is_account_id_valid(FIRST_ACCOUNT_ID_XRB));
        assert!(is_account_id_valid(BURN_ACCOUNT_ID));
        assert!(!is_account_id_valid("xrb_invalid"));
    }

    #[test]
    fn test_generate_account_id() {
        assert_eq!(generate_account_id(SEED, 0).unwrap(), FIRST_ACCOUNT_ID_XRB);
    }

    #[test]
    fn test_generate_seed() {
        let seed = generate_seed();
        assert_eq!(seed.len(), 64);
        assert!(validate_seed(&seed).is_ok());
        assert_ne!(seed, generate_seed());
    }
}
