// Deterministic pseudo-random source for the Sonatina composer.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// and defines `RandomSource`, the seam every composition stage draws from.
// Stages never reach for an ambient global generator: the caller owns one
// source and threads it through each call, so a seed fully determines a
// piece.
//
// - `SonatinaRng`: the production generator.
// - `scripted::ScriptedSource`: replays fixed draws so tests can force a
//   particular table entry or coin outcome.
//
// **Critical constraint: determinism.** `SonatinaRng` must produce identical
// output for identical prior state on every platform. No floating point in
// the core generator, no stdlib randomness.

pub mod scripted;

use serde::{Deserialize, Serialize};

/// Everything a composition stage needs from randomness.
///
/// Implementors supply the two primitives; uniform picks and coins are
/// derived from them so every source agrees on how a draw is consumed.
pub trait RandomSource {
    /// Uniform integer in `[low, high)`. Callers guarantee `low < high`.
    fn range_usize(&mut self, low: usize, high: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// `true` with probability `p`. `p <= 0.0` never fires, `p >= 1.0` always does.
    fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform `u8` in `[low, high)`.
    fn range_u8(&mut self, low: u8, high: u8) -> u8 {
        self.range_usize(low as usize, high as usize) as u8
    }

    /// Uniform index into a slice of length `len`, or `None` when empty.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.range_usize(0, len))
        }
    }

    /// Uniformly chosen element of `items`, or `None` when empty.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.pick_index(items.len()).map(|i| &items[i])
    }
}

/// Xoshiro256++ PRNG.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SonatinaRng {
    s: [u64; 4],
}

impl SonatinaRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)` with rejection sampling to avoid
    /// modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }
}

impl RandomSource for SonatinaRng {
    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Upper 53 bits of a `u64` fill the f64 mantissa.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
