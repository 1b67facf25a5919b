//! Per-Trial Seed Derivation
//!
//! Trials must be reproducible independent of execution order or thread
//! scheduling, so each trial's seed is a pure function of
//! (master seed, game index, trial index). FxHasher is used because the
//! std `DefaultHasher` is not stable across Rust versions.

use std::hash::{Hash, Hasher};

use fxhash::FxHasher;

/// Deterministic seed for one trial of one game.
#[inline]
pub fn seed_for(master_seed: u64, game_index: u32, trial_index: u32) -> u64 {
    let mut hasher = FxHasher::default();
    master_seed.hash(&mut hasher);
    game_index.hash(&mut hasher);
    trial_index.hash(&mut hasher);
    hasher.finish()
}
