//! Roll-Forward Data Loader
//!
//! The single place look-ahead bias is prevented. Every weekly read in the
//! engine routes through [`rows_before`], which returns only rows observable
//! strictly before the target (season, week) and stamps each returned row
//! with an as-of marker for audit trails.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::table::{FeatureRow, TendencyRow};
use crate::error::{EngineError, Result};

/// Anything keyed by (team, season, week) can be rolled forward.
pub trait WeeklyKeyed {
    fn team(&self) -> &str;
    fn season(&self) -> u16;
    fn week(&self) -> u8;
}

impl WeeklyKeyed for FeatureRow {
    fn team(&self) -> &str {
        &self.team
    }
    fn season(&self) -> u16 {
        self.season
    }
    fn week(&self) -> u8 {
        self.week
    }
}

impl WeeklyKeyed for TendencyRow {
    fn team(&self) -> &str {
        &self.team
    }
    fn season(&self) -> u16 {
        self.season
    }
    fn week(&self) -> u8 {
        self.week
    }
}

/// Audit marker recording the cutoff a row was loaded under.
#[derive(Debug, Clone, Serialize)]
pub struct AsOfStamp {
    pub season: u16,
    pub week: u8,
    pub loaded_at: DateTime<Utc>,
}

/// A borrowed row plus the as-of marker it was returned under.
#[derive(Debug, Clone)]
pub struct AsOfRow<'a, R> {
    pub row: &'a R,
    pub stamp: AsOfStamp,
}

/// Return rows observable strictly before the target (season, week):
/// `season < target`, or `season == target && week <= target - 1`.
///
/// Requesting week 0 fails loudly: there is no "before week 0" and silently
/// returning an empty set would hide a caller bug.
pub fn rows_before<'a, R: WeeklyKeyed>(
    rows: &'a [R],
    season: u16,
    week: u8,
) -> Result<Vec<AsOfRow<'a, R>>> {
    if week == 0 {
        return Err(EngineError::LookAhead {
            season,
            week,
            reason: "no data is observable before week 0".into(),
        });
    }
    let loaded_at = Utc::now();
    let out: Vec<AsOfRow<'a, R>> = rows
        .iter()
        .filter(|r| r.season() < season || (r.season() == season && r.week() <= week - 1))
        .map(|row| AsOfRow {
            row,
            stamp: AsOfStamp {
                season,
                week,
                loaded_at,
            },
        })
        .collect();
    log::debug!(
        "roll-forward load: {} of {} rows visible as of ({season}, week {week})",
        out.len(),
        rows.len()
    );
    Ok(out)
}

/// Point-in-time snapshot reducer: sort by (season, week) and keep the last
/// row per team.
pub fn latest_per_team<'a, R: WeeklyKeyed>(
    mut rows: Vec<AsOfRow<'a, R>>,
) -> HashMap<String, AsOfRow<'a, R>> {
    rows.sort_by_key(|r| (r.row.season(), r.row.week()));
    let mut latest = HashMap::new();
    for row in rows {
        latest.insert(row.row.team().to_string(), row);
    }
    latest
}
