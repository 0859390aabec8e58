//! Seedable random source for placement, rotation and loot rolls
//!
//! xorshift64, so a manager built from the same seed makes the same
//! choices on every platform. Tests rely on this.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator owned by the raid manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidRng {
    state: u64,
}

impl RaidRng {
    /// Create a generator; a zero seed is remapped since xorshift stalls on zero
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// Seed from the wall clock, for hosts that do not care about replay
    pub fn from_time() -> Self {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(1);
        Self::new(nanos as u64)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[min, max)`; returns `min` for an empty range
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + self.next_f64() * (max - min)
    }

    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        self.range_f64(min as f64, max as f64) as f32
    }

    /// Uniform in `[min, max]`
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as u32
    }

    /// Random index below `len`, `None` when `len == 0`
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some((self.next_u64() % len as u64) as usize)
        }
    }

    /// True with the given probability (clamped to `[0, 1]`)
    pub fn chance(&mut self, probability: f64) -> bool {
        if probability >= 1.0 {
            return true;
        }
        if probability <= 0.0 {
            return false;
        }
        self.next_f64() < probability
    }

    /// Fisher-Yates shuffle in place
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            slice.swap(i, j);
        }
    }

    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        self.index(slice.len()).map(|i| &slice[i])
    }
}

impl Default for RaidRng {
    fn default() -> Self {
        Self::new(0x5EED)
    }
}
