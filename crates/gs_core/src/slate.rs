//! Slate Orchestration
//!
//! The composition root for a week's games: build each team's profile once,
//! refit pressure baselines once per (season, week), compute the zero-mean
//! matchup adjustments across the slate, then run every game's trial batch
//! and center it against its market line.
//!
//! Profiles, baselines and adjustments are all immutable once built, so the
//! per-game batches share them read-only without coordination.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::data::repository::MetricRepository;
use crate::error::Result;
use crate::market::center::{center, raw_summary, MarketLine, ScoreSummary};
use crate::market::recommend::{recommend, Recommendation};
use crate::pressure::{InjuryReport, PressureBaselines, PressureCalibrator};
use crate::profile::builder::ProfileBuilder;
use crate::profile::record::TeamWeekRecord;
use crate::sim::adjust::SlateAdjustments;
use crate::sim::batch::run_trials;
use crate::sim::game::{GameInputs, GameSimulator, SimulatedGame};

/// Everything the presentation layer needs about one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub line: MarketLine,
    pub trials: u32,
    /// Summary of the uncentered simulation, for diagnostics.
    pub raw: ScoreSummary,
    pub centered: ScoreSummary,
    pub cover_probability: f64,
    pub over_probability: f64,
    pub recommendation: Recommendation,
    /// How many profile metrics fell back below team data, per side.
    pub home_defaulted_metrics: usize,
    pub away_defaulted_metrics: usize,
    /// Raw score pairs, kept only when the config asks for them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_scores: Option<Vec<SimulatedGame>>,
}

impl GameReport {
    /// JSON rendering for the presentation layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Predict every game on a slate. Injury reports are keyed by team.
pub fn predict_slate_with_injuries(
    repo: &MetricRepository,
    lines: &[MarketLine],
    injuries: &HashMap<String, InjuryReport>,
    config: &EngineConfig,
    master_seed: u64,
) -> Result<Vec<GameReport>> {
    config.validate()?;
    for line in lines {
        line.validate()?;
    }

    let builder = ProfileBuilder::new(repo, &config.shrinkage)?;
    let calibrator = PressureCalibrator::new(&config.pressure);

    // Profiles and baselines are built exactly once per key, then shared
    // read-only across every trial.
    let mut baselines: HashMap<(u16, u8), PressureBaselines> = HashMap::new();
    let mut profiles: HashMap<(String, u16, u8), TeamWeekRecord> = HashMap::new();
    for line in lines {
        let week_key = (line.season, line.week);
        if !baselines.contains_key(&week_key) {
            baselines.insert(
                week_key,
                calibrator.refit(&repo.efficiency, line.season, line.week)?,
            );
        }
        for team in [&line.home_team, &line.away_team] {
            let key = (team.clone(), line.season, line.week);
            if !profiles.contains_key(&key) {
                let record = builder.build(team, line.season, line.week)?;
                if !record.defaulted.is_empty() {
                    log::debug!(
                        "{team} ({}, week {}): {} metrics defaulted",
                        line.season,
                        line.week,
                        record.defaulted.len()
                    );
                }
                profiles.insert(key, record);
            }
        }
    }

    let pairings: Vec<(&TeamWeekRecord, &TeamWeekRecord)> = lines
        .iter()
        .flat_map(|line| {
            let home = &profiles[&(line.home_team.clone(), line.season, line.week)];
            let away = &profiles[&(line.away_team.clone(), line.season, line.week)];
            [(home, away), (away, home)]
        })
        .collect();
    let adjustments = SlateAdjustments::compute(&pairings);

    let mut reports = Vec::with_capacity(lines.len());
    for (game_index, line) in lines.iter().enumerate() {
        let home = &profiles[&(line.home_team.clone(), line.season, line.week)];
        let away = &profiles[&(line.away_team.clone(), line.season, line.week)];
        let week_baselines = &baselines[&(line.season, line.week)];

        let sim = GameSimulator::new(GameInputs {
            home,
            away,
            baselines: week_baselines,
            home_adjustment: adjustments.for_offense(&line.home_team),
            away_adjustment: adjustments.for_offense(&line.away_team),
            home_injuries: injuries.get(&line.home_team).copied(),
            away_injuries: injuries.get(&line.away_team).copied(),
            home_line_ranks: None,
            away_line_ranks: None,
        });

        let trials = run_trials(&sim, config.trials, master_seed, game_index as u32);
        let dist = center(&trials, line, config.market.centering_tolerance)?;

        reports.push(GameReport {
            line: line.clone(),
            trials: config.trials,
            raw: raw_summary(&trials),
            centered: dist.summary(),
            cover_probability: dist.cover_probability(),
            over_probability: dist.over_probability(),
            recommendation: recommend(&dist, &config.market),
            home_defaulted_metrics: home.defaulted.len(),
            away_defaulted_metrics: away.defaulted.len(),
            raw_scores: config.keep_raw_trials.then(|| trials.clone()),
        });
    }
    Ok(reports)
}

/// Predict a slate with no injury information.
pub fn predict_slate(
    repo: &MetricRepository,
    lines: &[MarketLine],
    config: &EngineConfig,
    master_seed: u64,
) -> Result<Vec<GameReport>> {
    predict_slate_with_injuries(repo, lines, &HashMap::new(), config, master_seed)
}
