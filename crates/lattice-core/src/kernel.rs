//! Instruction-set dispatched kernels for the proof-of-work nonce search.
//!
//! The search loop is compiled once per vector extension tier and the widest
//! tier supported by the running CPU is picked through a one-time capability
//! probe, in priority order AVX > SSE4.1 > SSSE3 > SSE2 > NEON > portable.
//! Throughput differences between tiers exceed 30%, so the probe result is
//! cached process-wide and every search goes through the selected kernel.

use std::sync::OnceLock;

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};

type Blake2bWork = Blake2b<U8>;

/// Nonces scanned per kernel call; `solve_work` checks its timeout between
/// calls, so this is also the cooperative cancellation granularity.
pub(crate) const SEARCH_BATCH_SIZE: u32 = 250_000;

/// Compute the 64-bit work value of a nonce against a work hash.
///
/// The wire rule is Blake2b-8 over `reverse(work bytes) ‖ hash` with the
/// digest byte-reversed and read big-endian; both reversals collapse into
/// little-endian reads of the nonce and the digest.
pub(crate) fn work_value(work_hash: &[u8; 32], nonce: u64) -> u64 {
    let mut hasher = Blake2bWork::new();
    hasher.update(nonce.to_le_bytes());
    hasher.update(work_hash);
    let digest: [u8; 8] = hasher.finalize().into();
    u64::from_le_bytes(digest)
}

/// Strategy interface for the brute-force nonce search.
///
/// One implementation exists per instruction-set tier. The engine only
/// depends on this trait; [`searcher`] probes the CPU once and hands out the
/// widest supported implementation.
pub trait WorkSearcher: Send + Sync {
    /// Name of the instruction-set tier this searcher runs on.
    fn name(&self) -> &'static str;

    /// Scan `count` nonces starting at `start` and return the first whose
    /// work value meets `difficulty`.
    fn search(&self, work_hash: &[u8; 32], start: u64, count: u32, difficulty: u64) -> Option<u64>;
}

#[inline(always)]
fn search_range(work_hash: &[u8; 32], start: u64, count: u32, difficulty: u64) -> Option<u64> {
    let mut nonce = start;
    for _ in 0..count {
        if work_value(work_hash, nonce) >= difficulty {
            return Some(nonce);
        }
        nonce = nonce.wrapping_add(1);
    }
    None
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86 {
    use super::search_range;

    #[target_feature(enable = "avx")]
    pub unsafe fn search_avx(
        work_hash: &[u8; 32],
        start: u64,
        count: u32,
        difficulty: u64,
    ) -> Option<u64> {
        search_range(work_hash, start, count, difficulty)
    }

    #[target_feature(enable = "sse4.1")]
    pub unsafe fn search_sse4_1(
        work_hash: &[u8; 32],
        start: u64,
        count: u32,
        difficulty: u64,
    ) -> Option<u64> {
        search_range(work_hash, start, count, difficulty)
    }

    #[target_feature(enable = "ssse3")]
    pub unsafe fn search_ssse3(
        work_hash: &[u8; 32],
        start: u64,
        count: u32,
        difficulty: u64,
    ) -> Option<u64> {
        search_range(work_hash, start, count, difficulty)
    }

    #[target_feature(enable = "sse2")]
    pub unsafe fn search_sse2(
        work_hash: &[u8; 32],
        start: u64,
        count: u32,
        difficulty: u64,
    ) -> Option<u64> {
        search_range(work_hash, start, count, difficulty)
    }
}

#[cfg(target_arch = "aarch64")]
mod arm {
    use super::search_range;

    #[target_feature(enable = "neon")]
    pub unsafe fn search_neon(
        work_hash: &[u8; 32],
        start: u64,
        count: u32,
        difficulty: u64,
    ) -> Option<u64> {
        search_range(work_hash, start, count, difficulty)
    }
}

macro_rules! x86_searcher {
    ($name:ident, $tier:literal, $kernel:ident) => {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        struct $name;

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        impl WorkSearcher for $name {
            fn name(&self) -> &'static str {
                $tier
            }

            fn search(
                &self,
                work_hash: &[u8; 32],
                start: u64,
                count: u32,
                difficulty: u64,
            ) -> Option<u64> {
                // Safety: only constructed after the matching feature probe
                // succeeded.
                unsafe { x86::$kernel(work_hash, start, count, difficulty) }
            }
        }
    };
}

x86_searcher!(AvxSearcher, "avx", search_avx);
x86_searcher!(Sse41Searcher, "sse4.1", search_sse4_1);
x86_searcher!(Ssse3Searcher, "ssse3", search_ssse3);
x86_searcher!(Sse2Searcher, "sse2", search_sse2);

#[cfg(target_arch = "aarch64")]
struct NeonSearcher;

#[cfg(target_arch = "aarch64")]
impl WorkSearcher for NeonSearcher {
    fn name(&self) -> &'static str {
        "neon"
    }

    fn search(&self, work_hash: &[u8; 32], start: u64, count: u32, difficulty: u64) -> Option<u64> {
        // Safety: only constructed after the NEON probe succeeded.
        unsafe { arm::search_neon(work_hash, start, count, difficulty) }
    }
}

struct PortableSearcher;

impl WorkSearcher for PortableSearcher {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn search(&self, work_hash: &[u8; 32], start: u64, count: u32, difficulty: u64) -> Option<u64> {
        search_range(work_hash, start, count, difficulty)
    }
}

fn probe() -> Box<dyn WorkSearcher> {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx") {
            return Box::new(AvxSearcher);
        }
        if is_x86_feature_detected!("sse4.1") {
            return Box::new(Sse41Searcher);
        }
        if is_x86_feature_detected!("ssse3") {
            return Box::new(Ssse3Searcher);
        }
        if is_x86_feature_detected!("sse2") {
            return Box::new(Sse2Searcher);
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return Box::new(NeonSearcher);
        }
    }

    Box::new(PortableSearcher)
}

/// The process-wide search kernel, probing CPU capabilities on first use.
pub fn searcher() -> &'static dyn WorkSearcher {
    static SEARCHER: OnceLock<Box<dyn WorkSearcher>> = OnceLock::new();
    SEARCHER
        .get_or_init(|| {
            let selected = probe();
            log::debug!("selected '{}' work search kernel", selected.name());
            selected
        })
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORK_HASH: &str = "B585D9363B8265CFD5993F30A3D6DE6B5CA5CC7879E0AFA94D13F08B713B9FFD";

    fn work_hash() -> [u8; 32] {
        hex::decode(WORK_HASH).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_work_value() {
        assert_eq!(
            work_value(&work_hash(), 0x5b064dcc70b9db0a),
            0xfffffffeb1249486
        );
    }

    #[test]
    fn test_search_finds_known_nonce() {
        let nonce = 0x5b064dcc70b9db0a;
        // Start a few nonces short of the known solution
        let found = PortableSearcher.search(&work_hash(), nonce - 8, 16, 0xffffffc000000000);
        assert_eq!(found, Some(nonce));
    }

    #[test]
    fn test_search_exhausts_range() {
        // An unattainable difficulty never matches
        assert_eq!(PortableSearcher.search(&work_hash(), 0, 64, u64::MAX), None);
    }

    #[test]
    fn test_searcher_probe_is_stable() {
        let first = searcher().name();
        assert!(!first.is_empty());
        assert_eq!(searcher().name(), first);
    }
}
