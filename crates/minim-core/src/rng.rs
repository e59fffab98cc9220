//! Deterministic RNG wrapper, the randomness seam used by the engine, and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Source of uniform randomness consumed by the randomisation engine.
///
/// All non-determinism in an allocation flows through this trait. Production
/// code uses [`RngHandle`]; tests may supply scripted implementations to pin
/// down tie-breaks and the minimisation draw.
pub trait RandomSource: Send {
    /// Returns a uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Returns a uniform index in `0..len`. Callers never pass `len == 0`.
    fn next_index(&mut self, len: usize) -> usize;

    /// Replaces the internal state with one derived from `seed`.
    fn reseed(&mut self, seed: u64);
}

/// Deterministic RNG handle exposed to minimisation consumers.
///
/// The handle is a thin wrapper around `StdRng`. When seeded explicitly the
/// sequence is reproducible for a given seed on a given `rand` release.
/// Substreams are derived by hashing `(master_seed, substream_id)` with
/// SipHash-1-3 configured with fixed zero keys.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a handle seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for RngHandle {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}

/// Hashes a tagged byte string to a seed with the same zero-keyed SipHash-1-3.
pub(crate) fn seed_from_bytes(tag: u8, bytes: &[u8]) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u8(tag);
    hasher.write_u64(bytes.len() as u64);
    hasher.write(bytes);
    hasher.finish()
}
