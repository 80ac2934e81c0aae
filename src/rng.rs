//! Deterministic RNG for battle resolution
//!
//! Randomness enters the engine in exactly one place: probabilistic skill
//! triggers and playout move picks draw from an injected `BattleRng`. The
//! same seed always replays the same battle.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

/// Trait for random number generation in battles
pub trait BattleRng {
    /// Generate a random u32
    fn next_u32(&mut self) -> u32;

    /// Generate a random number in range [0, max)
    fn gen_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }

    /// Roll a permille probability (1000 = always)
    fn chance(&mut self, permille: i32) -> bool {
        if permille >= 1000 {
            return true;
        }
        if permille <= 0 {
            return false;
        }
        (self.gen_range(1000) as i32) < permille
    }
}

/// XorShift32 RNG - simple, fast, deterministic
///
/// Suitable for game logic where cryptographic security is not needed.
/// The same seed will always produce the same sequence.
#[derive(Debug, Clone, Encode, Decode, TypeInfo)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Create a new RNG from a u64 seed
    ///
    /// The seed is combined into a u32, ensuring state is never 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = ((seed as u32) ^ ((seed >> 32) as u32)).max(1);
        Self { state }
    }
}

impl BattleRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
