//! Metric Repository
//!
//! Explicit container for every weekly metric table, constructed once per
//! process and passed by reference to the profile builder and pressure
//! calibrator. Replaces module-level table caches so the roll-forward cutoff
//! and reload lifecycle are explicit and testable.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::table::{FeatureTable, TableKind, TendencyRow};

/// All weekly metric tables, read-only for the duration of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRepository {
    pub efficiency: FeatureTable,
    pub play_calling: Vec<TendencyRow>,
    pub pace: FeatureTable,
    pub turnover: FeatureTable,
    pub red_zone: FeatureTable,
    pub special_teams: FeatureTable,
    pub matchup_grades: FeatureTable,
    pub qb_splits: FeatureTable,
}

impl MetricRepository {
    pub fn empty() -> Self {
        Self {
            efficiency: FeatureTable::new(TableKind::Efficiency),
            play_calling: Vec::new(),
            pace: FeatureTable::new(TableKind::Pace),
            turnover: FeatureTable::new(TableKind::TurnoverRegression),
            red_zone: FeatureTable::new(TableKind::RedZone),
            special_teams: FeatureTable::new(TableKind::SpecialTeams),
            matchup_grades: FeatureTable::new(TableKind::MatchupGrades),
            qb_splits: FeatureTable::new(TableKind::QbSplits),
        }
    }

    /// Every team mentioned in any table.
    pub fn teams(&self) -> BTreeSet<String> {
        let mut teams = BTreeSet::new();
        for table in [
            &self.efficiency,
            &self.pace,
            &self.turnover,
            &self.red_zone,
            &self.special_teams,
            &self.matchup_grades,
            &self.qb_splits,
        ] {
            for row in &table.rows {
                teams.insert(row.team.clone());
            }
        }
        for row in &self.play_calling {
            teams.insert(row.team.clone());
        }
        teams
    }
}
