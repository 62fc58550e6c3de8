//! Randomness source for every chance-based mechanic.
//!
//! Critical hits, blocks, enemy damage, coin rewards, quiz draws and loot
//! all go through [`Luck`]. Any `rand` generator is a `Luck`, so a seeded
//! `StdRng` gives reproducible sessions, and [`crate::testing::ScriptedLuck`]
//! pins individual outcomes in tests.

use rand::seq::index;
use rand::{Rng, RngCore};

/// An injectable source of random outcomes.
pub trait Luck {
    /// Returns `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// A uniformly drawn integer in `low..=high`.
    ///
    /// A degenerate range (`high <= low`) always yields `low`.
    fn between(&mut self, low: i32, high: i32) -> i32;

    /// `amount` distinct indices from `0..len`, in random order.
    ///
    /// Asking for more than `len` indices returns all of them.
    fn draw(&mut self, len: usize, amount: usize) -> Vec<usize>;

    /// A single index into a collection of `len` items.
    fn pick(&mut self, len: usize) -> usize {
        let high = i32::try_from(len.saturating_sub(1)).unwrap_or(i32::MAX);
        usize::try_from(self.between(0, high)).unwrap_or(0)
    }
}

impl<R: RngCore> Luck for R {
    fn chance(&mut self, probability: f64) -> bool {
        self.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn between(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn draw(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(self, len, amount.min(len)).into_vec()
    }
}
