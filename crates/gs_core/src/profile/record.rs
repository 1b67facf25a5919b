//! Team Week Record
//!
//! Immutable snapshot of one team's form as of one week. Every field is
//! computed exclusively from games strictly before (season, week); the record
//! is created once by the profile builder and never mutated afterward.

use serde::{Deserialize, Serialize};

use crate::data::table::Metric;
use crate::profile::tendency::TendencyTable;

/// Offensive-line / defensive-line matchup grades on a 0-100 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchupGrades {
    pub pass_block: f64,
    pub pass_rush: f64,
    pub run_block: f64,
    pub run_defense: f64,
}

impl Default for MatchupGrades {
    fn default() -> Self {
        Self {
            pass_block: Metric::PassBlockGrade.league_default(),
            pass_rush: Metric::PassRushGrade.league_default(),
            run_block: Metric::RunBlockGrade.league_default(),
            run_defense: Metric::RunDefenseGrade.league_default(),
        }
    }
}

/// The named quarterback rate bundle, one instance per pocket state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QbRates {
    pub completion: f64,
    pub interception: f64,
    pub sack: f64,
    pub scramble: f64,
    pub yards_per_attempt: f64,
    pub epa_per_play: f64,
}

impl QbRates {
    /// League reference rates for the clean pocket.
    pub fn league_clean() -> Self {
        Self {
            completion: Metric::QbCleanCompletionRate.league_default(),
            interception: Metric::QbCleanInterceptionRate.league_default(),
            sack: Metric::QbCleanSackRate.league_default(),
            scramble: Metric::QbCleanScrambleRate.league_default(),
            yards_per_attempt: Metric::QbCleanYardsPerAttempt.league_default(),
            epa_per_play: Metric::QbCleanEpaPerPlay.league_default(),
        }
    }

    /// League reference rates under pressure.
    pub fn league_pressured() -> Self {
        Self {
            completion: Metric::QbPressuredCompletionRate.league_default(),
            interception: Metric::QbPressuredInterceptionRate.league_default(),
            sack: Metric::QbPressuredSackRate.league_default(),
            scramble: Metric::QbPressuredScrambleRate.league_default(),
            yards_per_attempt: Metric::QbPressuredYardsPerAttempt.league_default(),
            epa_per_play: Metric::QbPressuredEpaPerPlay.league_default(),
        }
    }
}

/// Shrunk quarterback splits plus the dropback sample they came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QbSplits {
    pub clean: QbRates,
    pub pressured: QbRates,
    pub dropbacks: f64,
}

impl Default for QbSplits {
    fn default() -> Self {
        Self {
            clean: QbRates::league_clean(),
            pressured: QbRates::league_pressured(),
            dropbacks: 0.0,
        }
    }
}

/// Which rung of the fallback chain produced a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackSource {
    TeamSeasonToDate,
    LeagueWide,
    LeagueDefault,
}

/// Audit entry: a metric that did not come straight from the team's own
/// current-season data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DefaultedMetric {
    pub metric: Metric,
    pub source: FallbackSource,
}

/// Immutable per (team, season, week) strength profile.
#[derive(Debug, Clone)]
pub struct TeamWeekRecord {
    pub team: String,
    pub season: u16,
    pub week: u8,

    // Efficiency
    pub off_epa: f64,
    pub def_epa: f64,
    pub yards_per_play: f64,
    pub yards_per_pass: f64,
    pub yards_per_rush: f64,
    pub explosive_pass_rate: f64,
    pub explosive_rush_rate: f64,
    pub explosive_rate_allowed: f64,
    pub giveaway_rate: f64,
    pub takeaway_rate: f64,
    pub pressure_allowed: f64,
    pub pressure_created: f64,

    // Pace
    pub plays_per_drive: f64,
    pub seconds_per_play: f64,

    // Play calling
    pub tendencies: TendencyTable,

    // Regression factors
    pub turnover_regression: f64,

    // Scoring situations / special teams
    pub red_zone_td_rate: f64,
    pub field_goal_pct: f64,
    pub punt_net_yards: f64,

    // Matchup grades
    pub grades: MatchupGrades,

    // Quarterback
    pub qb: QbSplits,

    // Game context
    pub rest_days: u8,
    pub dome: bool,

    /// Metrics that resolved below the team-season rung of the fallback
    /// chain, kept for audit.
    pub defaulted: Vec<DefaultedMetric>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_splits_ordering() {
        let clean = QbRates::league_clean();
        let pressured = QbRates::league_pressured();
        // Pressure hurts every rate in the expected direction.
        assert!(clean.completion > pressured.completion);
        assert!(clean.interception < pressured.interception);
        assert!(clean.sack < pressured.sack);
        assert!(clean.yards_per_attempt > pressured.yards_per_attempt);
        assert!(clean.epa_per_play > pressured.epa_per_play);
    }
}
