//! Team Strength Profile Builder
//!
//! Assembles an immutable [`TeamWeekRecord`] for (team, season, week) from
//! the weekly metric tables, every read routed through the roll-forward
//! loader. Missing metrics resolve through a deterministic, total fallback
//! chain: team season-to-date mean, then league-wide mean, then the hardcoded
//! league default. The chain never raises for a known team; what it defaulted
//! is recorded on the record for audit.

use crate::config::ShrinkageConfig;
use crate::data::loader::{latest_per_team, rows_before, AsOfRow};
use crate::data::repository::MetricRepository;
use crate::data::table::{FeatureRow, Metric, TendencyRow};
use crate::error::Result;
use crate::profile::record::{
    DefaultedMetric, FallbackSource, MatchupGrades, QbRates, QbSplits, TeamWeekRecord,
};
use crate::profile::tendency::TendencyTable;
use crate::shrink::{Shrinker, LEAGUE_PASSING_PRIORS};

/// Schedule context not derivable from the weekly tables.
#[derive(Debug, Clone, Copy)]
pub struct TeamContext {
    pub rest_days: u8,
    pub dome: bool,
}

impl Default for TeamContext {
    fn default() -> Self {
        Self {
            rest_days: 7,
            dome: false,
        }
    }
}

pub struct ProfileBuilder<'a> {
    repo: &'a MetricRepository,
    qb_shrinker: Shrinker,
    tendency_shrinker: Shrinker,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(repo: &'a MetricRepository, shrinkage: &ShrinkageConfig) -> Result<Self> {
        Ok(Self {
            repo,
            qb_shrinker: Shrinker::new(shrinkage.qb_lambda)?,
            tendency_shrinker: Shrinker::new(shrinkage.tendency_lambda)?,
        })
    }

    pub fn build(&self, team: &str, season: u16, week: u8) -> Result<TeamWeekRecord> {
        self.build_with_context(team, season, week, TeamContext::default())
    }

    pub fn build_with_context(
        &self,
        team: &str,
        season: u16,
        week: u8,
        ctx: TeamContext,
    ) -> Result<TeamWeekRecord> {
        let mut audit = Vec::new();

        let efficiency = rows_before(&self.repo.efficiency.rows, season, week)?;
        let pace = rows_before(&self.repo.pace.rows, season, week)?;
        let turnover = rows_before(&self.repo.turnover.rows, season, week)?;
        let red_zone = rows_before(&self.repo.red_zone.rows, season, week)?;
        let special_teams = rows_before(&self.repo.special_teams.rows, season, week)?;

        let off_epa = resolve_metric(&efficiency, team, season, Metric::OffensiveEpa, &mut audit);
        let def_epa = resolve_metric(&efficiency, team, season, Metric::DefensiveEpa, &mut audit);
        let yards_per_play = resolve_metric(&efficiency, team, season, Metric::YardsPerPlay, &mut audit);
        let yards_per_pass =
            resolve_metric(&efficiency, team, season, Metric::YardsPerPassAttempt, &mut audit);
        let yards_per_rush = resolve_metric(&efficiency, team, season, Metric::YardsPerRush, &mut audit);
        let explosive_pass_rate =
            resolve_metric(&efficiency, team, season, Metric::ExplosivePassRate, &mut audit);
        let explosive_rush_rate =
            resolve_metric(&efficiency, team, season, Metric::ExplosiveRushRate, &mut audit);
        let explosive_rate_allowed =
            resolve_metric(&efficiency, team, season, Metric::ExplosiveRateAllowed, &mut audit);
        let giveaway_rate = resolve_metric(&efficiency, team, season, Metric::GiveawayRate, &mut audit);
        let takeaway_rate = resolve_metric(&efficiency, team, season, Metric::TakeawayRate, &mut audit);
        let pressure_allowed =
            resolve_metric(&efficiency, team, season, Metric::PressureAllowedRate, &mut audit);
        let pressure_created =
            resolve_metric(&efficiency, team, season, Metric::PressureCreatedRate, &mut audit);

        let plays_per_drive = resolve_metric(&pace, team, season, Metric::PlaysPerDrive, &mut audit);
        let seconds_per_play = resolve_metric(&pace, team, season, Metric::SecondsPerPlay, &mut audit);

        let turnover_regression =
            resolve_metric(&turnover, team, season, Metric::TurnoverRegression, &mut audit);
        let red_zone_td_rate = resolve_metric(&red_zone, team, season, Metric::RedZoneTdRate, &mut audit);
        let field_goal_pct =
            resolve_metric(&special_teams, team, season, Metric::FieldGoalPct, &mut audit);
        let punt_net_yards =
            resolve_metric(&special_teams, team, season, Metric::PuntNetYards, &mut audit);

        let grades = self.build_grades(team, season, week, &mut audit)?;
        let qb = self.build_qb_splits(team, season, week, &mut audit)?;
        let tendencies = self.build_tendencies(team, season, week)?;

        Ok(TeamWeekRecord {
            team: team.to_string(),
            season,
            week,
            off_epa,
            def_epa,
            yards_per_play,
            yards_per_pass,
            yards_per_rush,
            explosive_pass_rate,
            explosive_rush_rate,
            explosive_rate_allowed,
            giveaway_rate,
            takeaway_rate,
            pressure_allowed,
            pressure_created,
            plays_per_drive,
            seconds_per_play,
            tendencies,
            turnover_regression,
            red_zone_td_rate,
            field_goal_pct,
            punt_net_yards,
            grades,
            qb,
            rest_days: ctx.rest_days,
            dome: ctx.dome,
            defaulted: audit,
        })
    }

    /// Matchup grades come from the latest visible grade row per team, a
    /// point-in-time snapshot rather than a season average.
    fn build_grades(
        &self,
        team: &str,
        season: u16,
        week: u8,
        audit: &mut Vec<DefaultedMetric>,
    ) -> Result<MatchupGrades> {
        let visible = rows_before(&self.repo.matchup_grades.rows, season, week)?;
        let latest = latest_per_team(visible.clone());

        let mut grade = |metric: Metric| match latest.get(team).and_then(|r| r.row.get(metric)) {
            Some(v) => v,
            None => resolve_metric(&visible, team, season, metric, audit),
        };

        Ok(MatchupGrades {
            pass_block: grade(Metric::PassBlockGrade),
            pass_rush: grade(Metric::PassRushGrade),
            run_block: grade(Metric::RunBlockGrade),
            run_defense: grade(Metric::RunDefenseGrade),
        })
    }

    /// Quarterback splits are averaged season-to-date, then shrunk toward
    /// the league priors weighted by the dropback sample.
    fn build_qb_splits(
        &self,
        team: &str,
        season: u16,
        week: u8,
        audit: &mut Vec<DefaultedMetric>,
    ) -> Result<QbSplits> {
        let visible = rows_before(&self.repo.qb_splits.rows, season, week)?;
        let team_rows: Vec<&FeatureRow> = visible
            .iter()
            .map(|r| r.row)
            .filter(|r| r.team == team && r.season == season)
            .collect();

        let priors = &*LEAGUE_PASSING_PRIORS;
        if team_rows.is_empty() {
            audit.push(DefaultedMetric {
                metric: Metric::QbDropbacks,
                source: FallbackSource::LeagueDefault,
            });
            log::debug!("{team}: no quarterback sample before ({season}, week {week}), using league priors");
            return Ok(QbSplits::default());
        }

        let dropbacks: f64 = team_rows
            .iter()
            .filter_map(|r| r.get(Metric::QbDropbacks))
            .sum();

        let observed_clean = QbRates {
            completion: mean_of(&team_rows, Metric::QbCleanCompletionRate, priors.clean.completion),
            interception: mean_of(
                &team_rows,
                Metric::QbCleanInterceptionRate,
                priors.clean.interception,
            ),
            sack: mean_of(&team_rows, Metric::QbCleanSackRate, priors.clean.sack),
            scramble: mean_of(&team_rows, Metric::QbCleanScrambleRate, priors.clean.scramble),
            yards_per_attempt: mean_of(
                &team_rows,
                Metric::QbCleanYardsPerAttempt,
                priors.clean.yards_per_attempt,
            ),
            epa_per_play: mean_of(&team_rows, Metric::QbCleanEpaPerPlay, priors.clean.epa_per_play),
        };
        let observed_pressured = QbRates {
            completion: mean_of(
                &team_rows,
                Metric::QbPressuredCompletionRate,
                priors.pressured.completion,
            ),
            interception: mean_of(
                &team_rows,
                Metric::QbPressuredInterceptionRate,
                priors.pressured.interception,
            ),
            sack: mean_of(&team_rows, Metric::QbPressuredSackRate, priors.pressured.sack),
            scramble: mean_of(
                &team_rows,
                Metric::QbPressuredScrambleRate,
                priors.pressured.scramble,
            ),
            yards_per_attempt: mean_of(
                &team_rows,
                Metric::QbPressuredYardsPerAttempt,
                priors.pressured.yards_per_attempt,
            ),
            epa_per_play: mean_of(
                &team_rows,
                Metric::QbPressuredEpaPerPlay,
                priors.pressured.epa_per_play,
            ),
        };

        Ok(QbSplits {
            clean: self
                .qb_shrinker
                .shrink_qb_rates(&observed_clean, dropbacks, &priors.clean),
            pressured: self.qb_shrinker.shrink_qb_rates(
                &observed_pressured,
                dropbacks,
                &priors.pressured,
            ),
            dropbacks,
        })
    }

    fn build_tendencies(&self, team: &str, season: u16, week: u8) -> Result<TendencyTable> {
        let visible = rows_before(&self.repo.play_calling, season, week)?;

        // League rate over every visible play, not just this team's.
        let (league_pass, league_total) = visible
            .iter()
            .fold((0u64, 0u64), |(p, t), r| {
                (p + r.row.pass_plays as u64, t + r.row.total_plays as u64)
            });
        let league_rate = if league_total > 0 {
            league_pass as f64 / league_total as f64
        } else {
            Metric::NeutralPassRate.league_default()
        };

        let team_rows: Vec<&TendencyRow> = visible
            .iter()
            .map(|r| r.row)
            .filter(|r| r.team == team && r.season == season)
            .collect();

        if team_rows.is_empty() {
            return Ok(TendencyTable::league(league_rate));
        }
        Ok(TendencyTable::build(
            &team_rows,
            &self.tendency_shrinker,
            league_rate,
        ))
    }
}

/// The deterministic fallback chain for one metric.
fn resolve_metric(
    visible: &[AsOfRow<FeatureRow>],
    team: &str,
    season: u16,
    metric: Metric,
    audit: &mut Vec<DefaultedMetric>,
) -> f64 {
    let team_values: Vec<f64> = visible
        .iter()
        .filter(|r| r.row.team == team && r.row.season == season)
        .filter_map(|r| r.row.get(metric))
        .collect();
    if !team_values.is_empty() {
        return mean(&team_values);
    }

    let league_values: Vec<f64> = visible.iter().filter_map(|r| r.row.get(metric)).collect();
    if !league_values.is_empty() {
        audit.push(DefaultedMetric {
            metric,
            source: FallbackSource::LeagueWide,
        });
        log::debug!("{team}: {} resolved at league-wide mean", metric.column());
        return mean(&league_values);
    }

    audit.push(DefaultedMetric {
        metric,
        source: FallbackSource::LeagueDefault,
    });
    log::debug!("{team}: {} resolved at league default", metric.column());
    metric.league_default()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_of(rows: &[&FeatureRow], metric: Metric, default: f64) -> f64 {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.get(metric)).collect();
    if values.is_empty() {
        default
    } else {
        mean(&values)
    }
}
