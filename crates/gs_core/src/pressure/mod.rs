//! Pressure Calibrator
//!
//! Maintains rolling team-level pass-pressure baselines and answers a
//! per-snap pressure probability adjusted for situation and line mismatch.
//! `refit` returns an immutable [`PressureBaselines`] snapshot; callers hold
//! that snapshot for the duration of a batch, so a concurrent refit can never
//! change results mid-batch. The per-snap query is called once per simulated
//! dropback and must never interrupt a run: unknown teams resolve to the
//! league-average baseline instead of raising.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::PressureConfig;
use crate::data::loader::rows_before;
use crate::data::table::{FeatureTable, Metric};
use crate::error::Result;
use crate::sim::situation::Situation;

/// Baseline clamp range.
const BASELINE_FLOOR: f64 = 0.05;
const BASELINE_CEIL: f64 = 0.55;

/// Per-snap probability clamp range.
pub const PRESSURE_FLOOR: f64 = 0.05;
pub const PRESSURE_CEIL: f64 = 0.70;

// Situational multipliers, applied in this order.
const THIRD_AND_LONG_MULT: f64 = 1.25;
const TRAILING_TWO_MINUTE_MULT: f64 = 1.20;
const TRAILING_BIG_SECOND_HALF_MULT: f64 = 1.10;
const PLAY_ACTION_MULT: f64 = 0.90;
const SHOTGUN_MULT: f64 = 1.05;

/// Pressure change per rank of line mismatch.
const RANK_MISMATCH_SLOPE: f64 = 0.006;
const OL_STARTER_OUT_BUMP: f64 = 0.05;
const DL_STARTER_OUT_DROP: f64 = 0.04;

/// Offensive/defensive line ranks, 1 = best in league.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineRanks {
    pub offense_pass_block_rank: u8,
    pub defense_pass_rush_rank: u8,
}

/// Starters missing on each line, plus a quarterback downgrade factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InjuryReport {
    pub ol_starters_out: u8,
    pub dl_starters_out: u8,
    pub qb_downgrade: f64,
}

impl Default for InjuryReport {
    fn default() -> Self {
        Self {
            ol_starters_out: 0,
            dl_starters_out: 0,
            qb_downgrade: 1.0,
        }
    }
}

/// One team's exponentially-weighted pressure rates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TeamPressureBaseline {
    /// Pressure rate allowed by the offense.
    pub allowed: f64,
    /// Pressure rate created by the defense.
    pub created: f64,
}

impl TeamPressureBaseline {
    fn league() -> Self {
        Self {
            allowed: Metric::PressureAllowedRate.league_default(),
            created: Metric::PressureCreatedRate.league_default(),
        }
    }
}

/// Immutable snapshot of every team's baselines as of one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureBaselines {
    teams: HashMap<String, TeamPressureBaseline>,
    league: TeamPressureBaseline,
    pub season: u16,
    pub week: u8,
}

/// Refits pressure baselines from a bounded lookback of weekly rates.
#[derive(Debug, Clone, Copy)]
pub struct PressureCalibrator {
    alpha: f64,
    lookback_weeks: u8,
}

impl PressureCalibrator {
    pub fn new(config: &PressureConfig) -> Self {
        Self {
            alpha: config.alpha,
            lookback_weeks: config.lookback_weeks,
        }
    }

    /// Rebuild every team's baseline from its last `lookback_weeks` visible
    /// weekly rows. Pure function of the input window: refitting with the
    /// same rows produces identical baselines.
    pub fn refit(
        &self,
        efficiency: &FeatureTable,
        season: u16,
        week: u8,
    ) -> Result<PressureBaselines> {
        let visible = rows_before(&efficiency.rows, season, week)?;

        let mut per_team: HashMap<String, Vec<(u16, u8, f64, f64)>> = HashMap::new();
        for r in &visible {
            let allowed = r.row.get(Metric::PressureAllowedRate);
            let created = r.row.get(Metric::PressureCreatedRate);
            if let (Some(allowed), Some(created)) = (allowed, created) {
                per_team.entry(r.row.team.clone()).or_default().push((
                    r.row.season,
                    r.row.week,
                    allowed,
                    created,
                ));
            }
        }

        let mut teams = HashMap::new();
        for (team, mut rows) in per_team {
            rows.sort_by_key(|&(s, w, _, _)| (s, w));
            let window_start = rows.len().saturating_sub(self.lookback_weeks as usize);
            let window = &rows[window_start..];

            let mut allowed = window[0].2;
            let mut created = window[0].3;
            for &(_, _, a, c) in &window[1..] {
                allowed = self.alpha * a + (1.0 - self.alpha) * allowed;
                created = self.alpha * c + (1.0 - self.alpha) * created;
            }
            teams.insert(
                team,
                TeamPressureBaseline {
                    allowed: allowed.clamp(BASELINE_FLOOR, BASELINE_CEIL),
                    created: created.clamp(BASELINE_FLOOR, BASELINE_CEIL),
                },
            );
        }

        let league = if teams.is_empty() {
            TeamPressureBaseline::league()
        } else {
            let n = teams.len() as f64;
            TeamPressureBaseline {
                allowed: teams.values().map(|b| b.allowed).sum::<f64>() / n,
                created: teams.values().map(|b| b.created).sum::<f64>() / n,
            }
        };

        log::debug!(
            "pressure refit as of ({season}, week {week}): {} team baselines",
            teams.len()
        );
        Ok(PressureBaselines {
            teams,
            league,
            season,
            week,
        })
    }
}

impl PressureBaselines {
    /// Team baseline, or the league average for a team with no fitted rows.
    pub fn team(&self, team: &str) -> TeamPressureBaseline {
        self.teams.get(team).copied().unwrap_or(self.league)
    }

    pub fn league(&self) -> TeamPressureBaseline {
        self.league
    }

    /// Per-snap pressure probability for one dropback.
    pub fn pressure_probability(
        &self,
        offense: &str,
        defense: &str,
        situation: &Situation,
        injuries: Option<&InjuryReport>,
        line_ranks: Option<&LineRanks>,
    ) -> f64 {
        let base =
            (self.team(offense).allowed + self.team(defense).created) / 2.0;

        let mismatch = line_ranks.map_or(1.0, |ranks| {
            let delta = ranks.offense_pass_block_rank as f64 - ranks.defense_pass_rush_rank as f64;
            (1.0 + RANK_MISMATCH_SLOPE * delta).clamp(0.75, 1.25)
        });

        let injury = injuries.map_or(1.0, |report| {
            (1.0 + OL_STARTER_OUT_BUMP * report.ol_starters_out as f64
                - DL_STARTER_OUT_DROP * report.dl_starters_out as f64)
                .clamp(0.75, 1.30)
        });

        let mut p = base * mismatch * injury;

        if situation.down == 3 && situation.distance >= 7 {
            p *= THIRD_AND_LONG_MULT;
        }
        if situation.score_diff < 0 && situation.two_minute() {
            p *= TRAILING_TWO_MINUTE_MULT;
        }
        if situation.score_diff <= -10 && situation.half == 2 {
            p *= TRAILING_BIG_SECOND_HALF_MULT;
        }
        if situation.play_action {
            p *= PLAY_ACTION_MULT;
        }
        if situation.shotgun {
            p *= SHOTGUN_MULT;
        }

        p.clamp(PRESSURE_FLOOR, PRESSURE_CEIL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{FeatureRow, TableKind};
    use proptest::prelude::*;

    fn pressure_row(team: &str, week: u8, allowed: f64, created: f64) -> FeatureRow {
        FeatureRow::new(team, 2024, week)
            .with(Metric::PressureAllowedRate, allowed)
            .with(Metric::PressureCreatedRate, created)
    }

    fn table(rows: Vec<FeatureRow>) -> FeatureTable {
        let mut t = FeatureTable::new(TableKind::Efficiency);
        for r in rows {
            t.push(r);
        }
        t
    }

    fn fitted() -> PressureBaselines {
        let t = table(vec![
            pressure_row("KC", 1, 0.18, 0.25),
            pressure_row("KC", 2, 0.22, 0.27),
            pressure_row("BUF", 1, 0.30, 0.19),
            pressure_row("BUF", 2, 0.26, 0.21),
        ]);
        PressureCalibrator::new(&PressureConfig::default())
            .refit(&t, 2024, 3)
            .unwrap()
    }

    #[test]
    fn test_refit_is_idempotent() {
        let t = table(vec![
            pressure_row("KC", 1, 0.18, 0.25),
            pressure_row("KC", 2, 0.22, 0.27),
        ]);
        let calibrator = PressureCalibrator::new(&PressureConfig::default());
        let a = calibrator.refit(&t, 2024, 3).unwrap();
        let b = calibrator.refit(&t, 2024, 3).unwrap();
        assert_eq!(a.team("KC").allowed, b.team("KC").allowed);
        assert_eq!(a.team("KC").created, b.team("KC").created);
    }

    #[test]
    fn test_ewma_weights_recent_week() {
        let t = table(vec![
            pressure_row("KC", 1, 0.10, 0.10),
            pressure_row("KC", 2, 0.30, 0.30),
        ]);
        let baselines = PressureCalibrator::new(&PressureConfig::default())
            .refit(&t, 2024, 3)
            .unwrap();
        // alpha=0.45: 0.45*0.30 + 0.55*0.10 = 0.245
        assert!((baselines.team("KC").allowed - 0.245).abs() < 1e-9);
    }

    #[test]
    fn test_lookback_bounds_window() {
        let mut rows = Vec::new();
        for week in 1..=10 {
            // Early weeks carry an extreme rate that must age out.
            let rate = if week <= 5 { 0.55 } else { 0.20 };
            rows.push(pressure_row("KC", week, rate, rate));
        }
        let config = PressureConfig {
            alpha: 0.45,
            lookback_weeks: 5,
        };
        let baselines = PressureCalibrator::new(&config)
            .refit(&table(rows), 2024, 11)
            .unwrap();
        // Window is weeks 6-10, all at 0.20.
        assert!((baselines.team("KC").allowed - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_clamped() {
        let t = table(vec![pressure_row("KC", 1, 0.90, 0.01)]);
        let baselines = PressureCalibrator::new(&PressureConfig::default())
            .refit(&t, 2024, 2)
            .unwrap();
        assert!((baselines.team("KC").allowed - BASELINE_CEIL).abs() < 1e-9);
        assert!((baselines.team("KC").created - BASELINE_FLOOR).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_team_uses_league_average() {
        let baselines = fitted();
        let league = baselines.league();
        let b = baselines.team("NYJ");
        assert!((b.allowed - league.allowed).abs() < 1e-9);

        // And the per-snap query still answers.
        let p = baselines.pressure_probability("NYJ", "SEA", &Situation::opening(), None, None);
        assert!((PRESSURE_FLOOR..=PRESSURE_CEIL).contains(&p));
    }

    #[test]
    fn test_third_and_long_raises_pressure() {
        let baselines = fitted();
        let neutral = Situation::opening();
        let mut third_long = neutral;
        third_long.down = 3;
        third_long.distance = 8;

        let p_neutral = baselines.pressure_probability("KC", "BUF", &neutral, None, None);
        let p_third = baselines.pressure_probability("KC", "BUF", &third_long, None, None);
        assert!((p_third / p_neutral - THIRD_AND_LONG_MULT).abs() < 1e-9);
    }

    #[test]
    fn test_play_action_lowers_pressure() {
        let baselines = fitted();
        let neutral = Situation::opening();
        let mut pa = neutral;
        pa.play_action = true;
        let p_neutral = baselines.pressure_probability("KC", "BUF", &neutral, None, None);
        let p_pa = baselines.pressure_probability("KC", "BUF", &pa, None, None);
        assert!(p_pa < p_neutral);
    }

    #[test]
    fn test_injuries_shift_pressure() {
        let baselines = fitted();
        let situation = Situation::opening();
        let p_healthy =
            baselines.pressure_probability("KC", "BUF", &situation, None, None);

        let ol_out = InjuryReport {
            ol_starters_out: 2,
            ..Default::default()
        };
        let dl_out = InjuryReport {
            dl_starters_out: 2,
            ..Default::default()
        };
        let p_ol = baselines.pressure_probability("KC", "BUF", &situation, Some(&ol_out), None);
        let p_dl = baselines.pressure_probability("KC", "BUF", &situation, Some(&dl_out), None);
        assert!(p_ol > p_healthy);
        assert!(p_dl < p_healthy);
    }

    #[test]
    fn test_line_mismatch_direction() {
        let baselines = fitted();
        let situation = Situation::opening();
        let bad_ol = LineRanks {
            offense_pass_block_rank: 30,
            defense_pass_rush_rank: 2,
        };
        let good_ol = LineRanks {
            offense_pass_block_rank: 2,
            defense_pass_rush_rank: 30,
        };
        let p_bad = baselines.pressure_probability("KC", "BUF", &situation, None, Some(&bad_ol));
        let p_good = baselines.pressure_probability("KC", "BUF", &situation, None, Some(&good_ol));
        assert!(p_bad > p_good);
    }

    proptest! {
        /// Pressure probability stays inside [0.05, 0.70] for any input.
        #[test]
        fn prop_pressure_bounds(
            down in 1u8..=4,
            distance in 1u8..=30,
            score_diff in -35i16..=35,
            half in 1u8..=2,
            seconds in 0u16..=1800,
            play_action in proptest::bool::ANY,
            shotgun in proptest::bool::ANY,
            ol_out in 0u8..=5,
            dl_out in 0u8..=5,
            off_rank in 1u8..=32,
            def_rank in 1u8..=32,
        ) {
            let baselines = fitted();
            let situation = Situation {
                down,
                distance,
                yardline: 50,
                score_diff,
                half,
                seconds_left_half: seconds,
                play_action,
                shotgun,
            };
            let injuries = InjuryReport { ol_starters_out: ol_out, dl_starters_out: dl_out, qb_downgrade: 1.0 };
            let ranks = LineRanks { offense_pass_block_rank: off_rank, defense_pass_rush_rank: def_rank };
            let p = baselines.pressure_probability(
                "KC", "BUF", &situation, Some(&injuries), Some(&ranks),
            );
            prop_assert!((PRESSURE_FLOOR..=PRESSURE_CEIL).contains(&p));
        }
    }
}
