//! # gs_core - Monte Carlo Gridiron Simulation & Market Calibration Engine
//!
//! Predicts game outcomes via per-play Monte Carlo simulation, then
//! calibrates the simulated score distribution against a sportsbook's posted
//! spread and total. Edge is expressed through distribution *shape*
//! (variance, tails), never through a mean that tries to out-guess the
//! market.
//!
//! ## Pipeline
//! - Roll-forward loader: weekly tables truncated strictly before the target
//!   week, stamped as-of for audit
//! - Team strength profiles with a deterministic missing-data fallback chain
//! - Empirical-Bayes shrinkage for small-sample rates
//! - Rolling pass-pressure baselines with situational per-snap adjustment
//! - Per-play and per-game simulators, reproducible per-trial seeds
//! - Market centering (pure translation) and an edge-gated recommendation
//!
//! The engine is pure computation: no network, no CLI, no persistence. It is
//! invoked by external scripts with in-memory feature tables and market
//! lines.

// Probability parameters travel together through the play simulator.
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod data;
pub mod error;
pub mod market;
pub mod pressure;
pub mod profile;
pub mod shrink;
pub mod sim;
pub mod slate;

pub use config::{EngineConfig, MarketConfig, PressureConfig, ShrinkageConfig};
pub use data::{
    latest_per_team, rows_before, AsOfRow, AsOfStamp, FeatureRow, FeatureTable, Metric,
    MetricRepository, TableKind, TendencyRow,
};
pub use error::{EngineError, Result};
pub use market::{
    center, recommend, BetSide, BetTicket, CenteredDistribution, MarketLine, Recommendation,
    ScoreSummary, SummaryStats,
};
pub use pressure::{
    InjuryReport, LineRanks, PressureBaselines, PressureCalibrator, TeamPressureBaseline,
};
pub use profile::{ProfileBuilder, QbRates, QbSplits, TeamWeekRecord};
pub use shrink::{ShrinkageResult, Shrinker};
pub use sim::{
    run_trials, seed_for, GameInputs, GameSimulator, MatchupAdjustment, SimulatedGame, Situation,
    SlateAdjustments,
};
pub use slate::{predict_slate, predict_slate_with_injuries, GameReport};
