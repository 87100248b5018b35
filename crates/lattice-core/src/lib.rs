//! Protocol primitives for a block-lattice cryptocurrency.
//!
//! This crate provides pure Rust implementations of:
//! - Account key derivation and the checksummed account ID codec
//! - The Nano Base32 bit-packing encoding used inside account IDs
//! - Block construction, canonical hashing, signing and verification
//! - Proof-of-work validation and solving with CPU-dispatched search kernels

pub mod account;
pub mod block;
pub mod kernel;
pub mod nbase32;
pub mod work;

pub use account::{
    generate_account_id, generate_account_key_pair, generate_account_private_key, generate_seed,
    get_account_id, get_account_public_key, is_account_id_valid, key_pair_from_private_key,
    AccountError, AccountKeyPair, AccountPrefix, AccountSource, KeySource,
};
pub use block::{Block, BlockError, BlockFields, BlockType, TxType};
pub use kernel::{searcher, WorkSearcher};
pub use work::{
    derive_work_difficulty, derive_work_multiplier, get_work_value, parse_difficulty, parse_work,
    solve_work, validate_work, WorkError, WORK_DIFFICULTY,
};

/// True if `s` is a non-empty string of hexadecimal digits.
pub(crate) fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}
