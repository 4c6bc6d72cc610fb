//! Addressable, order-independent randomness.
//!
//! # Determinism strategy
//!
//! No simulation decision consumes a shared stream.  Every draw is addressed
//! by a key
//!
//!   (seed, stream, day, a, b)
//!
//! where `stream` names the kind of decision ([`Stream`]) and `a`/`b` are
//! decision-specific (e.g. the canonical person pair of a contact).  The key
//! is folded through the SplitMix64 finaliser, so:
//!
//! - The outcome of a decision does not depend on the order in which
//!   decisions are evaluated, nor on how work is partitioned across threads.
//! - The seed is the complete RNG state: there are no stream cursors to
//!   checkpoint.
//! - Uniform draws are computed from the hash directly, so they are
//!   identical on every platform.
//!
//! Sampling from continuous distributions (lognormal delays, multipliers)
//! uses [`KeyedRng::rng_for`], a `SmallRng` seeded from the same key.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::Day;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// 2^-53, for converting the top 53 bits of a hash into `[0, 1)`.
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// Decision families.  Each family draws from an independent keyspace.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum Stream {
    Infection   = 1,
    Attribution = 2,
    Policy      = 3,
    Progression = 4,
    Delay       = 5,
    Tracing     = 6,
    Equipment   = 7,
    Population  = 8,
    Seeding     = 9,
}

/// SplitMix64 finaliser.
#[inline]
pub fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(MIXING_CONSTANT);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Pack an unordered pair into one key so that `(a, b)` and `(b, a)` address
/// the same draw.
#[inline]
pub fn canonical_pair(a: u32, b: u32) -> u64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (u64::from(lo) << 32) | u64::from(hi)
}

/// Pack an ordered pair into one key; `(a, b)` and `(b, a)` differ.
#[inline]
pub fn ordered_pair(a: u32, b: u32) -> u64 {
    (u64::from(a) << 32) | u64::from(b)
}

// ── KeyedRng ──────────────────────────────────────────────────────────────────

/// Stateless, splittable random source.  Cheap to copy; share freely across
/// threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedRng {
    seed: u64,
}

impl KeyedRng {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The 64-bit hash addressed by the full key.
    #[inline]
    pub fn key(&self, stream: Stream, day: Day, a: u64, b: u64) -> u64 {
        let mut h = mix64(self.seed ^ (stream as u64).wrapping_mul(MIXING_CONSTANT));
        h = mix64(h ^ u64::from(day.0));
        h = mix64(h ^ a);
        mix64(h ^ b)
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn uniform(&self, stream: Stream, day: Day, a: u64, b: u64) -> f64 {
        (self.key(stream, day, a, b) >> 11) as f64 * UNIT_SCALE
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    ///
    /// `p = 0` is never true and `p = 1` is always true.
    #[inline]
    pub fn bernoulli(&self, stream: Stream, day: Day, a: u64, b: u64, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.uniform(stream, day, a, b) < p
    }

    /// A generator seeded from the key, for sampling `rand` distributions.
    #[inline]
    pub fn rng_for(&self, stream: Stream, day: Day, a: u64, b: u64) -> SmallRng {
        SmallRng::seed_from_u64(self.key(stream, day, a, b))
    }
}
