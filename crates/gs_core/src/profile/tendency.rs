//! Situational Play-Calling Tendencies
//!
//! Pass/run tendency table keyed by (down, distance bucket, score bucket,
//! time bucket). A specific cell answers only when it has enough observed
//! plays; otherwise the lookup generalizes progressively: down-only
//! aggregate, then the team's season average, then the league average.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::table::TendencyRow;
use crate::shrink::Shrinker;

/// Minimum observed plays before a specific cell is trusted.
pub const MIN_CELL_PLAYS: u32 = 2;

/// League pass rate by down, the shrinkage prior for each cell.
const DOWN_PASS_PRIORS: [f64; 4] = [0.51, 0.57, 0.78, 0.60];

// ============================================================================
// Situation buckets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceBucket {
    /// 1-3 yards to go.
    Short,
    /// 4-6 yards.
    Medium,
    /// 7-10 yards.
    Long,
    /// 11+ yards.
    VeryLong,
}

impl DistanceBucket {
    pub fn from_yards(distance: u8) -> Self {
        match distance {
            0..=3 => DistanceBucket::Short,
            4..=6 => DistanceBucket::Medium,
            7..=10 => DistanceBucket::Long,
            _ => DistanceBucket::VeryLong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreBucket {
    /// Trailing by 9 or more.
    TrailingBig,
    /// Trailing by 1-8.
    Trailing,
    Level,
    /// Leading by 1-8.
    Leading,
    /// Leading by 9 or more.
    LeadingBig,
}

impl ScoreBucket {
    pub fn from_diff(diff: i16) -> Self {
        match diff {
            i16::MIN..=-9 => ScoreBucket::TrailingBig,
            -8..=-1 => ScoreBucket::Trailing,
            0 => ScoreBucket::Level,
            1..=8 => ScoreBucket::Leading,
            _ => ScoreBucket::LeadingBig,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    Normal,
    /// Final two minutes of a half.
    TwoMinute,
}

impl TimeBucket {
    pub fn from_seconds_left(seconds_left_half: u16) -> Self {
        if seconds_left_half <= 120 {
            TimeBucket::TwoMinute
        } else {
            TimeBucket::Normal
        }
    }
}

/// Full situational key for a tendency cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SituationKey {
    pub down: u8,
    pub distance: DistanceBucket,
    pub score: ScoreBucket,
    pub time: TimeBucket,
}

impl SituationKey {
    pub fn from_raw(down: u8, distance: u8, score_diff: i16, seconds_left_half: u16) -> Self {
        Self {
            down: down.clamp(1, 4),
            distance: DistanceBucket::from_yards(distance),
            score: ScoreBucket::from_diff(score_diff),
            time: TimeBucket::from_seconds_left(seconds_left_half),
        }
    }
}

// ============================================================================
// Tendency table
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TendencyCell {
    pub pass_rate: f64,
    pub plays: u32,
}

/// Which generalization rung answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TendencySource {
    Exact,
    DownOnly,
    SeasonAverage,
    LeagueAverage,
}

#[derive(Debug, Clone, Copy)]
pub struct TendencyLookup {
    pub pass_rate: f64,
    pub source: TendencySource,
}

/// One team's situational pass/run tendencies as of a week.
#[derive(Debug, Clone)]
pub struct TendencyTable {
    cells: HashMap<SituationKey, TendencyCell>,
    by_down: [TendencyCell; 4],
    season_rate: f64,
    season_plays: u32,
    league_rate: f64,
}

impl TendencyTable {
    /// Aggregate observed play-calling rows into shrunk cells.
    ///
    /// Cell pass rates shrink toward the league rate for their down, weighted
    /// by observed plays, so a 3-play cell reads mostly as its down prior.
    pub fn build(rows: &[&TendencyRow], shrinker: &Shrinker, league_rate: f64) -> Self {
        let mut raw: HashMap<SituationKey, (u32, u32)> = HashMap::new();
        let mut down_raw = [(0u32, 0u32); 4];
        let mut season_pass = 0u32;
        let mut season_total = 0u32;

        for row in rows {
            let key =
                SituationKey::from_raw(row.down, row.distance, row.score_diff, row.seconds_left_half);
            let entry = raw.entry(key).or_insert((0, 0));
            entry.0 += row.pass_plays;
            entry.1 += row.total_plays;

            let d = (key.down - 1) as usize;
            down_raw[d].0 += row.pass_plays;
            down_raw[d].1 += row.total_plays;
            season_pass += row.pass_plays;
            season_total += row.total_plays;
        }

        let cells = raw
            .into_iter()
            .map(|(key, (pass, total))| {
                let prior = DOWN_PASS_PRIORS[(key.down - 1) as usize];
                let rate = if total > 0 {
                    pass as f64 / total as f64
                } else {
                    prior
                };
                let shrunk = shrinker.shrink(rate, total as f64, prior).value;
                (
                    key,
                    TendencyCell {
                        pass_rate: shrunk,
                        plays: total,
                    },
                )
            })
            .collect();

        let mut by_down = [TendencyCell::default(); 4];
        for (d, &(pass, total)) in down_raw.iter().enumerate() {
            if total > 0 {
                let rate = pass as f64 / total as f64;
                by_down[d] = TendencyCell {
                    pass_rate: shrinker.shrink(rate, total as f64, DOWN_PASS_PRIORS[d]).value,
                    plays: total,
                };
            }
        }

        let season_rate = if season_total > 0 {
            season_pass as f64 / season_total as f64
        } else {
            league_rate
        };

        Self {
            cells,
            by_down,
            season_rate,
            season_plays: season_total,
            league_rate,
        }
    }

    /// Table with no observed plays; every lookup answers at league average.
    pub fn league(league_rate: f64) -> Self {
        Self {
            cells: HashMap::new(),
            by_down: [TendencyCell::default(); 4],
            season_rate: league_rate,
            season_plays: 0,
            league_rate,
        }
    }

    /// Situational lookup with the generalization ladder:
    /// exact cell (>= MIN_CELL_PLAYS) -> down only -> season -> league.
    pub fn pass_rate(&self, key: &SituationKey) -> TendencyLookup {
        if let Some(cell) = self.cells.get(key) {
            if cell.plays >= MIN_CELL_PLAYS {
                return TendencyLookup {
                    pass_rate: cell.pass_rate,
                    source: TendencySource::Exact,
                };
            }
        }
        let down_cell = &self.by_down[(key.down.clamp(1, 4) - 1) as usize];
        if down_cell.plays > 0 {
            return TendencyLookup {
                pass_rate: down_cell.pass_rate,
                source: TendencySource::DownOnly,
            };
        }
        if self.season_plays > 0 {
            return TendencyLookup {
                pass_rate: self.season_rate,
                source: TendencySource::SeasonAverage,
            };
        }
        TendencyLookup {
            pass_rate: self.league_rate,
            source: TendencySource::LeagueAverage,
        }
    }

    pub fn season_pass_rate(&self) -> f64 {
        self.season_rate
    }
}
