//! Trial Batches
//!
//! Embarrassingly parallel fan-out over per-trial seeds. Because every seed
//! is derived from (master seed, game index, trial index), the result vector
//! is bit-identical however rayon schedules the work.

use rayon::prelude::*;

use crate::sim::game::{GameSimulator, SimulatedGame};
use crate::sim::seed::seed_for;

/// Run `trials` independent simulations of one game.
pub fn run_trials(
    sim: &GameSimulator<'_>,
    trials: u32,
    master_seed: u64,
    game_index: u32,
) -> Vec<SimulatedGame> {
    (0..trials)
        .into_par_iter()
        .map(|trial| sim.simulate(seed_for(master_seed, game_index, trial)))
        .collect()
}
