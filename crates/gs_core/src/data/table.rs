//! Weekly Feature Tables
//!
//! Flat tabular per-team weekly features, one row per (team, season, week).
//! Every recognized metric is enumerated in [`Metric`] together with its
//! hardcoded league default, so missing-metric fallback is a single documented
//! code path rather than scattered string-keyed lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Metric catalog
// ============================================================================

/// Every weekly metric the engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    // Efficiency
    OffensiveEpa,
    DefensiveEpa,
    YardsPerPlay,
    YardsPerPassAttempt,
    YardsPerRush,
    ExplosivePassRate,
    ExplosiveRushRate,
    ExplosiveRateAllowed,
    GiveawayRate,
    TakeawayRate,
    PressureAllowedRate,
    PressureCreatedRate,
    // Pace
    PlaysPerDrive,
    SecondsPerPlay,
    // Play calling (non-situational summary)
    NeutralPassRate,
    // Turnover regression
    TurnoverRegression,
    // Red zone
    RedZoneTdRate,
    // Special teams
    FieldGoalPct,
    PuntNetYards,
    // Matchup grades (0-100 scale)
    PassBlockGrade,
    PassRushGrade,
    RunBlockGrade,
    RunDefenseGrade,
    // Quarterback splits, clean pocket
    QbCleanCompletionRate,
    QbCleanInterceptionRate,
    QbCleanSackRate,
    QbCleanScrambleRate,
    QbCleanYardsPerAttempt,
    QbCleanEpaPerPlay,
    // Quarterback splits, under pressure
    QbPressuredCompletionRate,
    QbPressuredInterceptionRate,
    QbPressuredSackRate,
    QbPressuredScrambleRate,
    QbPressuredYardsPerAttempt,
    QbPressuredEpaPerPlay,
    /// Sample size backing the quarterback split rates.
    QbDropbacks,
}

impl Metric {
    pub const ALL: &'static [Metric] = &[
        Metric::OffensiveEpa,
        Metric::DefensiveEpa,
        Metric::YardsPerPlay,
        Metric::YardsPerPassAttempt,
        Metric::YardsPerRush,
        Metric::ExplosivePassRate,
        Metric::ExplosiveRushRate,
        Metric::ExplosiveRateAllowed,
        Metric::GiveawayRate,
        Metric::TakeawayRate,
        Metric::PressureAllowedRate,
        Metric::PressureCreatedRate,
        Metric::PlaysPerDrive,
        Metric::SecondsPerPlay,
        Metric::NeutralPassRate,
        Metric::TurnoverRegression,
        Metric::RedZoneTdRate,
        Metric::FieldGoalPct,
        Metric::PuntNetYards,
        Metric::PassBlockGrade,
        Metric::PassRushGrade,
        Metric::RunBlockGrade,
        Metric::RunDefenseGrade,
        Metric::QbCleanCompletionRate,
        Metric::QbCleanInterceptionRate,
        Metric::QbCleanSackRate,
        Metric::QbCleanScrambleRate,
        Metric::QbCleanYardsPerAttempt,
        Metric::QbCleanEpaPerPlay,
        Metric::QbPressuredCompletionRate,
        Metric::QbPressuredInterceptionRate,
        Metric::QbPressuredSackRate,
        Metric::QbPressuredScrambleRate,
        Metric::QbPressuredYardsPerAttempt,
        Metric::QbPressuredEpaPerPlay,
        Metric::QbDropbacks,
    ];

    /// League-average default, the terminal step of the fallback chain.
    pub fn league_default(self) -> f64 {
        match self {
            Metric::OffensiveEpa => 0.0,
            Metric::DefensiveEpa => 0.0,
            Metric::YardsPerPlay => 5.4,
            Metric::YardsPerPassAttempt => 7.0,
            Metric::YardsPerRush => 4.3,
            Metric::ExplosivePassRate => 0.085,
            Metric::ExplosiveRushRate => 0.048,
            Metric::ExplosiveRateAllowed => 0.067,
            Metric::GiveawayRate => 0.022,
            Metric::TakeawayRate => 0.022,
            Metric::PressureAllowedRate => 0.21,
            Metric::PressureCreatedRate => 0.21,
            Metric::PlaysPerDrive => 5.9,
            Metric::SecondsPerPlay => 27.0,
            Metric::NeutralPassRate => 0.57,
            Metric::TurnoverRegression => 1.0,
            Metric::RedZoneTdRate => 0.56,
            Metric::FieldGoalPct => 0.85,
            Metric::PuntNetYards => 41.0,
            Metric::PassBlockGrade => 60.0,
            Metric::PassRushGrade => 60.0,
            Metric::RunBlockGrade => 60.0,
            Metric::RunDefenseGrade => 60.0,
            Metric::QbCleanCompletionRate => 0.68,
            Metric::QbCleanInterceptionRate => 0.018,
            Metric::QbCleanSackRate => 0.012,
            Metric::QbCleanScrambleRate => 0.025,
            Metric::QbCleanYardsPerAttempt => 7.4,
            Metric::QbCleanEpaPerPlay => 0.15,
            Metric::QbPressuredCompletionRate => 0.47,
            Metric::QbPressuredInterceptionRate => 0.035,
            Metric::QbPressuredSackRate => 0.19,
            Metric::QbPressuredScrambleRate => 0.11,
            Metric::QbPressuredYardsPerAttempt => 5.6,
            Metric::QbPressuredEpaPerPlay => -0.38,
            Metric::QbDropbacks => 0.0,
        }
    }

    /// Canonical column name in the flat feature files.
    pub fn column(self) -> &'static str {
        match self {
            Metric::OffensiveEpa => "off_epa",
            Metric::DefensiveEpa => "def_epa",
            Metric::YardsPerPlay => "yards_per_play",
            Metric::YardsPerPassAttempt => "yards_per_pass_attempt",
            Metric::YardsPerRush => "yards_per_rush",
            Metric::ExplosivePassRate => "explosive_pass_rate",
            Metric::ExplosiveRushRate => "explosive_rush_rate",
            Metric::ExplosiveRateAllowed => "explosive_rate_allowed",
            Metric::GiveawayRate => "giveaway_rate",
            Metric::TakeawayRate => "takeaway_rate",
            Metric::PressureAllowedRate => "pressure_allowed_rate",
            Metric::PressureCreatedRate => "pressure_created_rate",
            Metric::PlaysPerDrive => "plays_per_drive",
            Metric::SecondsPerPlay => "seconds_per_play",
            Metric::NeutralPassRate => "neutral_pass_rate",
            Metric::TurnoverRegression => "turnover_regression",
            Metric::RedZoneTdRate => "red_zone_td_rate",
            Metric::FieldGoalPct => "field_goal_pct",
            Metric::PuntNetYards => "punt_net_yards",
            Metric::PassBlockGrade => "pass_block_grade",
            Metric::PassRushGrade => "pass_rush_grade",
            Metric::RunBlockGrade => "run_block_grade",
            Metric::RunDefenseGrade => "run_defense_grade",
            Metric::QbCleanCompletionRate => "qb_clean_completion_rate",
            Metric::QbCleanInterceptionRate => "qb_clean_interception_rate",
            Metric::QbCleanSackRate => "qb_clean_sack_rate",
            Metric::QbCleanScrambleRate => "qb_clean_scramble_rate",
            Metric::QbCleanYardsPerAttempt => "qb_clean_yards_per_attempt",
            Metric::QbCleanEpaPerPlay => "qb_clean_epa_per_play",
            Metric::QbPressuredCompletionRate => "qb_pressured_completion_rate",
            Metric::QbPressuredInterceptionRate => "qb_pressured_interception_rate",
            Metric::QbPressuredSackRate => "qb_pressured_sack_rate",
            Metric::QbPressuredScrambleRate => "qb_pressured_scramble_rate",
            Metric::QbPressuredYardsPerAttempt => "qb_pressured_yards_per_attempt",
            Metric::QbPressuredEpaPerPlay => "qb_pressured_epa_per_play",
            Metric::QbDropbacks => "qb_dropbacks",
        }
    }

    /// Reverse column lookup; unknown columns are tolerated by the caller.
    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.column() == name)
    }
}

// ============================================================================
// Rows and tables
// ============================================================================

/// One team's metric values for one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub team: String,
    pub season: u16,
    pub week: u8,
    pub values: HashMap<Metric, f64>,
}

impl FeatureRow {
    pub fn new(team: impl Into<String>, season: u16, week: u8) -> Self {
        Self {
            team: team.into(),
            season,
            week,
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }
}

/// Which metric family a table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Efficiency,
    Pace,
    TurnoverRegression,
    RedZone,
    SpecialTeams,
    MatchupGrades,
    QbSplits,
}

/// A flat weekly feature table for one metric family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTable {
    pub kind: TableKind,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: FeatureRow) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One observed situational play-calling cell for one team-week.
///
/// Play-calling is the one family keyed by situation rather than metric name,
/// so it gets its own row type instead of a [`FeatureRow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TendencyRow {
    pub team: String,
    pub season: u16,
    pub week: u8,
    pub down: u8,
    /// Yards to go for the first down.
    pub distance: u8,
    /// Offense score minus defense score at snap.
    pub score_diff: i16,
    /// Seconds remaining in the half at snap.
    pub seconds_left_half: u16,
    pub pass_plays: u32,
    pub total_plays: u32,
}
