//! Per-play and per-game Monte Carlo simulation.

pub mod adjust;
pub mod batch;
pub mod game;
pub mod play;
pub mod seed;
pub mod situation;

pub use adjust::{MatchupAdjustment, SlateAdjustments};
pub use batch::run_trials;
pub use game::{GameInputs, GameSimulator, SimulatedGame};
pub use play::{PlayCall, PlayOutcome, PlaySimulator, TurnoverKind};
pub use seed::seed_for;
pub use situation::Situation;
