//! CSV ingestion for the slate engine.
//!
//! Parses flat weekly feature files and market lines into the core's
//! repository types. Unknown columns are tolerated; the engine's fallback
//! chain covers whatever a file is missing.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use gs_core::{
    FeatureRow, FeatureTable, InjuryReport, MarketLine, Metric, MetricRepository, TableKind,
    TendencyRow,
};

/// Expected file name per table family inside the features directory.
const TABLE_FILES: &[(TableKind, &str)] = &[
    (TableKind::Efficiency, "efficiency.csv"),
    (TableKind::Pace, "pace.csv"),
    (TableKind::TurnoverRegression, "turnover.csv"),
    (TableKind::RedZone, "red_zone.csv"),
    (TableKind::SpecialTeams, "special_teams.csv"),
    (TableKind::MatchupGrades, "matchup_grades.csv"),
    (TableKind::QbSplits, "qb_splits.csv"),
];

const PLAY_CALLING_FILE: &str = "play_calling.csv";

/// Load one feature table. Columns `team,season,week` are required; every
/// other recognized column becomes a metric value.
pub fn load_feature_table(path: &Path, kind: TableKind) -> Result<FeatureTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();

    let mut table = FeatureTable::new(kind);
    for (line_no, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}:{}", path.display(), line_no + 2))?;
        let mut team = None;
        let mut season = None;
        let mut week = None;
        let mut values = Vec::new();

        for (header, field) in headers.iter().zip(record.iter()) {
            match header {
                "team" => team = Some(field.to_string()),
                "season" => season = Some(field.parse::<u16>()?),
                "week" => week = Some(field.parse::<u8>()?),
                other => {
                    if let Some(metric) = Metric::from_column(other) {
                        if !field.is_empty() {
                            values.push((metric, field.parse::<f64>()?));
                        }
                    } else {
                        log::debug!("{}: ignoring column {other}", path.display());
                    }
                }
            }
        }

        let team = team.with_context(|| format!("{}: missing team column", path.display()))?;
        let season =
            season.with_context(|| format!("{}: missing season column", path.display()))?;
        let week = week.with_context(|| format!("{}: missing week column", path.display()))?;

        let mut row = FeatureRow::new(team, season, week);
        for (metric, value) in values {
            row.values.insert(metric, value);
        }
        table.push(row);
    }
    Ok(table)
}

pub fn load_tendency_rows(path: &Path) -> Result<Vec<TendencyRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn load_market_lines(path: &Path) -> Result<Vec<MarketLine>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut lines = Vec::new();
    for record in reader.deserialize() {
        lines.push(record?);
    }
    Ok(lines)
}

#[derive(Debug, Deserialize)]
struct InjuryRecord {
    team: String,
    ol_starters_out: u8,
    dl_starters_out: u8,
    qb_downgrade: f64,
}

pub fn load_injuries(path: &Path) -> Result<HashMap<String, InjuryReport>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut injuries = HashMap::new();
    for record in reader.deserialize() {
        let record: InjuryRecord = record?;
        injuries.insert(
            record.team,
            InjuryReport {
                ol_starters_out: record.ol_starters_out,
                dl_starters_out: record.dl_starters_out,
                qb_downgrade: record.qb_downgrade,
            },
        );
    }
    Ok(injuries)
}

/// Load every table found in `dir`. A missing file leaves that table empty;
/// the engine's fallback chain takes it from there.
pub fn load_repository(dir: &Path) -> Result<MetricRepository> {
    let mut repo = MetricRepository::empty();
    for &(kind, file_name) in TABLE_FILES {
        let path = dir.join(file_name);
        if !path.exists() {
            log::warn!("{}: not found, table left empty", path.display());
            continue;
        }
        let table = load_feature_table(&path, kind)?;
        log::info!("{}: {} rows", path.display(), table.rows.len());
        match kind {
            TableKind::Efficiency => repo.efficiency = table,
            TableKind::Pace => repo.pace = table,
            TableKind::TurnoverRegression => repo.turnover = table,
            TableKind::RedZone => repo.red_zone = table,
            TableKind::SpecialTeams => repo.special_teams = table,
            TableKind::MatchupGrades => repo.matchup_grades = table,
            TableKind::QbSplits => repo.qb_splits = table,
        }
    }

    let play_calling = dir.join(PLAY_CALLING_FILE);
    if play_calling.exists() {
        repo.play_calling = load_tendency_rows(&play_calling)?;
        log::info!("{}: {} rows", play_calling.display(), repo.play_calling.len());
    } else {
        log::warn!("{}: not found, table left empty", play_calling.display());
    }
    Ok(repo)
}
