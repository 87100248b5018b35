//! Proof-of-work difficulty arithmetic, validation and solving.
//!
//! A work unit is a 64-bit nonce whose Blake2b work value against a target
//! hash meets the active difficulty. Difficulties are 64-bit thresholds; a
//! multiplier expresses a difficulty relative to the network default.

use std::time::{Duration, Instant};

use rand::rngs::OsRng;
use rand::Rng;
use thiserror::Error;

use crate::kernel::{self, SEARCH_BATCH_SIZE};

/// Default work difficulty on the main network.
pub const WORK_DIFFICULTY: u64 = 0xffff_ffc0_0000_0000;

/// Errors raised by work parsing, validation and difficulty arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    /// The work is not a 16-character hexadecimal string.
    #[error("work must be a 16-character hexadecimal string")]
    InvalidWork,
    /// The work parsed but its value is below the required difficulty.
    #[error("work does not meet the required difficulty")]
    BelowDifficulty,
    /// The difficulty is not a 16-character hexadecimal string, or a derived
    /// difficulty fell outside the 64-bit range.
    #[error("difficulty must be a 64-bit value as a 16-character hexadecimal string")]
    InvalidDifficulty,
    /// The multiplier is zero, negative or not a finite number.
    #[error("multiplier must be a positive finite number")]
    InvalidMultiplier,
    /// The work hash is not a 64-character hexadecimal string.
    #[error("work hash must be a 64-character hexadecimal string")]
    InvalidHash,
}

/// Parse a work unit, returning it in the canonical lowercase form.
///
/// Only the format is checked here; use [`validate_work`] to test a work
/// unit against a difficulty.
pub fn parse_work(work: &str) -> Result<String, WorkError> {
    if work.len() != 16 || !crate::is_hex(work) {
        return Err(WorkError::InvalidWork);
    }
    // The reference node prints work with lowercase hex digits
    Ok(work.to_lowercase())
}

/// Parse a 16-character hexadecimal difficulty into its 64-bit value.
pub fn parse_difficulty(difficulty: &str) -> Result<u64, WorkError> {
    if difficulty.len() != 16 {
        return Err(WorkError::InvalidDifficulty);
    }
    u64::from_str_radix(difficulty, 16).map_err(|_| WorkError::InvalidDifficulty)
}

/// Format a difficulty in the canonical external form.
pub fn difficulty_to_hex(difficulty: u64) -> String {
    format!("{:016x}", difficulty)
}

/// The multiplier of `difficulty` relative to `base_difficulty` (network
/// default when `None`).
pub fn derive_work_multiplier(difficulty: u64, base_difficulty: Option<u64>) -> f64 {
    let base = base_difficulty.unwrap_or(WORK_DIFFICULTY);
    let base_delta = (1u128 << 64) - base as u128;
    let difficulty_delta = (1u128 << 64) - difficulty as u128;
    base_delta as f64 / difficulty_delta as f64
}

/// The difficulty at `multiplier` times `base_difficulty` (network default
/// when `None`). Inverse of [`derive_work_multiplier`] within float
/// tolerance.
pub fn derive_work_difficulty(multiplier: f64, base_difficulty: Option<u64>) -> Result<u64, WorkError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(WorkError::InvalidMultiplier);
    }

    let base = base_difficulty.unwrap_or(WORK_DIFFICULTY);
    let base_delta = ((1u128 << 64) - base as u128) as f64;
    let offset = (base_delta / multiplier).trunc();
    if !offset.is_finite() {
        return Err(WorkError::InvalidMultiplier);
    }

    let difficulty = (1i128 << 64) - offset as i128;
    if difficulty < 0 || difficulty > u64::MAX as i128 {
        return Err(WorkError::InvalidDifficulty);
    }

    Ok(difficulty as u64)
}

fn parse_work_hash(work_hash: &str) -> Result<[u8; 32], WorkError> {
    if work_hash.len() != 64 {
        return Err(WorkError::InvalidHash);
    }
    let bytes = hex::decode(work_hash).map_err(|_| WorkError::InvalidHash)?;
    bytes.try_into().map_err(|_| WorkError::InvalidHash)
}

/// Compute the 64-bit work value of `work` against `work_hash`.
pub fn get_work_value(work_hash: &str, work: &str) -> Result<u64, WorkError> {
    let hash = parse_work_hash(work_hash)?;
    let work = parse_work(work)?;
    let nonce = u64::from_str_radix(&work, 16).map_err(|_| WorkError::InvalidWork)?;
    Ok(kernel::work_value(&hash, nonce))
}

/// Validate `work` against `work_hash` at the given difficulty.
///
/// Returns the work in canonical lowercase form, or
/// [`WorkError::BelowDifficulty`] when its value does not meet the
/// difficulty.
pub fn validate_work(work_hash: &str, work: &str, difficulty: u64) -> Result<String, WorkError> {
    let value = get_work_value(work_hash, work)?;
    if value < difficulty {
        return Err(WorkError::BelowDifficulty);
    }
    parse_work(work)
}

/// Solve work for `work_hash` at the given difficulty.
///
/// The search starts at a random nonce and advances sequentially through
/// the process-wide kernel. With a timeout, `Ok(None)` is returned once it
/// elapses without a solution; the timeout is checked between fixed-size
/// batches, so overshoot is bounded by one batch. Without a timeout the
/// call blocks until a solution is found.
pub fn solve_work(
    work_hash: &str,
    difficulty: u64,
    timeout: Option<Duration>,
) -> Result<Option<String>, WorkError> {
    let hash = parse_work_hash(work_hash)?;
    let searcher = kernel::searcher();

    // An independent random starting nonce lets parallel callers search
    // disjoint regions with negligible collision probability.
    let mut nonce: u64 = OsRng.gen();
    let start = Instant::now();

    loop {
        if let Some(found) = searcher.search(&hash, nonce, SEARCH_BATCH_SIZE, difficulty) {
            let work = format!("{:016x}", found);
            log::debug!(
                "solved work {} for {} in {:?}",
                work,
                work_hash,
                start.elapsed()
            );
            return Ok(Some(work));
        }
        nonce = nonce.wrapping_add(SEARCH_BATCH_SIZE as u64);

        if let Some(limit) = timeout {
            if start.elapsed() >= limit {
                log::debug!("work for {} not solved within {:?}", work_hash, limit);
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_BLOCK_HASH: &str =
        "B585D9363B8265CFD5993F30A3D6DE6B5CA5CC7879E0AFA94D13F08B713B9FFD";
    const VALID_WORK: &str = "5b064dcc70b9db0a";

    #[test]
    fn test_parse_work() {
        assert_eq!(parse_work(&"a".repeat(15)), Err(WorkError::InvalidWork));
        assert_eq!(parse_work(&"x".repeat(16)), Err(WorkError::InvalidWork));
        assert_eq!(parse_work(&"A".repeat(16)).unwrap(), "a".repeat(16));
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!(parse_difficulty("ffffffc000000000").unwrap(), WORK_DIFFICULTY);
        assert_eq!(parse_difficulty("ffffffc0"), Err(WorkError::InvalidDifficulty));
        assert_eq!(
            parse_difficulty(&"g".repeat(16)),
            Err(WorkError::InvalidDifficulty)
        );
        assert_eq!(difficulty_to_hex(WORK_DIFFICULTY), "ffffffc000000000");
    }

    #[test]
    fn test_derive_work_multiplier() {
        let difficulty = parse_difficulty("fffffff800000000").unwrap();
        assert_eq!(derive_work_multiplier(difficulty, None), 8.0);
        assert_eq!(derive_work_multiplier(WORK_DIFFICULTY, None), 1.0);
    }

    #[test]
    fn test_derive_work_difficulty() {
        assert_eq!(
            derive_work_difficulty(8.0, None).unwrap(),
            parse_difficulty("fffffff800000000").unwrap()
        );
        assert_eq!(derive_work_difficulty(1.0, None).unwrap(), WORK_DIFFICULTY);

        assert_eq!(
            derive_work_difficulty(0.0, None),
            Err(WorkError::InvalidMultiplier)
        );
        assert_eq!(
            derive_work_difficulty(-2.0, None),
            Err(WorkError::InvalidMultiplier)
        );
        assert_eq!(
            derive_work_difficulty(f64::NAN, None),
            Err(WorkError::InvalidMultiplier)
        );
    }

    #[test]
    fn test_difficulty_multiplier_round_trip() {
        for multiplier in [0.125, 0.5, 1.0, 2.0, 8.0, 1024.0] {
            let difficulty = derive_work_difficulty(multiplier, None).unwrap();
            let derived = derive_work_multiplier(difficulty, None);
            assert!(
                (derived - multiplier).abs() / multiplier < 1e-9,
                "multiplier {} round-tripped to {}",
                multiplier,
                derived
            );
        }
    }

    #[test]
    fn test_get_work_value() {
        assert_eq!(
            get_work_value(VALID_BLOCK_HASH, VALID_WORK).unwrap(),
            0xfffffffeb1249486
        );
        assert_eq!(
            get_work_value("nothex", VALID_WORK),
            Err(WorkError::InvalidHash)
        );
    }

    #[test]
    fn test_validate_work() {
        assert_eq!(
            validate_work(VALID_BLOCK_HASH, VALID_WORK, WORK_DIFFICULTY).unwrap(),
            VALID_WORK
        );
        // This work's value is bba4b4e18e544e70, below the default difficulty
        assert_eq!(
            validate_work(VALID_BLOCK_HASH, &"e".repeat(16), WORK_DIFFICULTY),
            Err(WorkError::BelowDifficulty)
        );
    }

    #[test]
    fn test_solve_work() {
        // Roughly one in 256 nonces meets this difficulty
        let difficulty = 0xff00_0000_0000_0000;
        let work = solve_work(VALID_BLOCK_HASH, difficulty, None)
            .unwrap()
            .expect("solvable difficulty");
        assert!(validate_work(VALID_BLOCK_HASH, &work, difficulty).is_ok());
    }

    #[test]
    fn test_solve_work_timeout() {
        // Only a work value of exactly u64::MAX could satisfy this, so the
        // search is expected to time out
        let start = Instant::now();
        let result = solve_work(
            VALID_BLOCK_HASH,
            u64::MAX,
            Some(Duration::from_millis(50)),
        )
        .unwrap();
        assert_eq!(result, None);
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
