//! Weekly Matchup Adjustments
//!
//! Explosive-play and turnover rates are adjusted per matchup by z-scoring
//! the raw matchup signal across the week's slate. Z-scoring guarantees the
//! slate-wide mean adjustment is ~0: an adjustment may reorder teams within a
//! week but never shifts the league mean.

use std::collections::HashMap;

use crate::profile::record::TeamWeekRecord;

/// Rate points of explosive-play adjustment per z.
const EXPLOSIVE_Z_SCALE: f64 = 0.012;
/// Rate points of turnover adjustment per z.
const TURNOVER_Z_SCALE: f64 = 0.005;

/// Threshold below which a pool's standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Mean and population standard deviation of a slate-wide signal.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Population stdev (N denominator): the slate is the full relevant universe,
/// not a sample.
pub fn pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Z-scores against the pool; an all-identical pool yields all zeros.
pub fn zscores(values: &[f64]) -> Vec<f64> {
    let stats = pool_stats(values);
    if stats.stdev < STDEV_EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - stats.mean) / stats.stdev).collect()
}

/// Additive rate adjustments for one offense against one defense.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchupAdjustment {
    pub explosive: f64,
    pub turnover: f64,
}

/// Zero-mean matchup adjustments for every offense on a week's slate.
#[derive(Debug, Clone, Default)]
pub struct SlateAdjustments {
    by_offense: HashMap<String, MatchupAdjustment>,
}

impl SlateAdjustments {
    /// Neutral adjustments (single-game runs outside a slate context).
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Compute adjustments from every (offense, defense) pairing on the
    /// slate, two per game.
    pub fn compute(pairings: &[(&TeamWeekRecord, &TeamWeekRecord)]) -> Self {
        let explosive_raw: Vec<f64> = pairings
            .iter()
            .map(|(off, def)| {
                (off.explosive_pass_rate + off.explosive_rush_rate) / 2.0
                    + def.explosive_rate_allowed
            })
            .collect();
        let turnover_raw: Vec<f64> = pairings
            .iter()
            .map(|(off, def)| off.giveaway_rate + def.takeaway_rate)
            .collect();

        let explosive_z = zscores(&explosive_raw);
        let turnover_z = zscores(&turnover_raw);

        let mut by_offense = HashMap::new();
        for (i, (off, _)) in pairings.iter().enumerate() {
            by_offense.insert(
                off.team.clone(),
                MatchupAdjustment {
                    explosive: explosive_z[i] * EXPLOSIVE_Z_SCALE,
                    turnover: turnover_z[i] * TURNOVER_Z_SCALE,
                },
            );
        }
        Self { by_offense }
    }

    /// Adjustment for an offense; teams outside the slate get zero.
    pub fn for_offense(&self, team: &str) -> MatchupAdjustment {
        self.by_offense.get(team).copied().unwrap_or_default()
    }

    /// Slate-wide mean explosive adjustment, exposed for the zero-mean gate.
    pub fn mean_explosive(&self) -> f64 {
        if self.by_offense.is_empty() {
            return 0.0;
        }
        self.by_offense.values().map(|a| a.explosive).sum::<f64>() / self.by_offense.len() as f64
    }
}
