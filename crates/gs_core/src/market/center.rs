//! Market Centering
//!
//! Shifts the simulated score distribution so its mean spread and total
//! exactly equal the posted market line, leaving variance and shape
//! untouched. Edge is expressed through distribution shape, never through a
//! mean that tries to out-guess the market.
//!
//! One additive shift per score array (not per sample) solves the 2x2 system
//! `home_shift - away_shift = spread_target - raw_spread_mean` and
//! `home_shift + away_shift = total_target - raw_total_mean`.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::sim::game::SimulatedGame;

/// A sportsbook line for one game.
///
/// `spread` is the market's target for the mean home-minus-away margin
/// (negative = home favored); `total` is the combined points line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketLine {
    pub away_team: String,
    pub home_team: String,
    pub season: u16,
    pub week: u8,
    pub spread: f64,
    pub total: f64,
}

impl MarketLine {
    /// A NaN line would corrupt every trial in the batch, so it is rejected
    /// before any centering math runs.
    pub fn validate(&self) -> Result<()> {
        if !self.spread.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "market spread for {}@{} is not finite",
                self.away_team, self.home_team
            )));
        }
        if !self.total.is_finite() || self.total <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "market total for {}@{} must be positive and finite",
                self.away_team, self.home_team
            )));
        }
        Ok(())
    }
}

/// Mean/median/standard deviation of one centered or raw axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub sd: f64,
}

/// Summary over all four score axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub home: SummaryStats,
    pub away: SummaryStats,
    pub spread: SummaryStats,
    pub total: SummaryStats,
}

/// The simulated distribution after the market-anchored translation.
#[derive(Debug, Clone)]
pub struct CenteredDistribution {
    home: Vec<f64>,
    away: Vec<f64>,
    pub home_shift: f64,
    pub away_shift: f64,
    pub line: MarketLine,
}

/// Center `trials` on the market line.
///
/// Fails with [`EngineError::CenteringDivergence`] if the post-shift means
/// miss their targets by more than `tolerance` points; that indicates a bug
/// in the shift derivation, and a silently miscalibrated distribution must
/// never escape.
pub fn center(
    trials: &[SimulatedGame],
    line: &MarketLine,
    tolerance: f64,
) -> Result<CenteredDistribution> {
    line.validate()?;
    if trials.is_empty() {
        return Err(EngineError::EmptyTrials(format!(
            "{}@{} has no simulated trials to center",
            line.away_team, line.home_team
        )));
    }

    let n = trials.len() as f64;
    let raw_spread_mean = trials.iter().map(|g| g.spread()).sum::<f64>() / n;
    let raw_total_mean = trials.iter().map(|g| g.total()).sum::<f64>() / n;

    let spread_shift = line.spread - raw_spread_mean;
    let total_shift = line.total - raw_total_mean;
    let home_shift = (total_shift + spread_shift) / 2.0;
    let away_shift = (total_shift - spread_shift) / 2.0;

    let home: Vec<f64> = trials.iter().map(|g| g.home as f64 + home_shift).collect();
    let away: Vec<f64> = trials.iter().map(|g| g.away as f64 + away_shift).collect();

    let dist = CenteredDistribution {
        home,
        away,
        home_shift,
        away_shift,
        line: line.clone(),
    };

    let centered_spread_mean = mean(&dist.spreads());
    if (centered_spread_mean - line.spread).abs() > tolerance {
        return Err(EngineError::CenteringDivergence {
            axis: "spread",
            target: line.spread,
            actual: centered_spread_mean,
        });
    }
    let centered_total_mean = mean(&dist.totals());
    if (centered_total_mean - line.total).abs() > tolerance {
        return Err(EngineError::CenteringDivergence {
            axis: "total",
            target: line.total,
            actual: centered_total_mean,
        });
    }

    Ok(dist)
}

impl CenteredDistribution {
    pub fn len(&self) -> usize {
        self.home.len()
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_empty()
    }

    pub fn spreads(&self) -> Vec<f64> {
        self.home
            .iter()
            .zip(&self.away)
            .map(|(h, a)| h - a)
            .collect()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.home
            .iter()
            .zip(&self.away)
            .map(|(h, a)| h + a)
            .collect()
    }

    /// Empirical probability that the home side beats the spread.
    pub fn cover_probability(&self) -> f64 {
        let spreads = self.spreads();
        let covers = spreads.iter().filter(|&&s| s > self.line.spread).count();
        covers as f64 / spreads.len() as f64
    }

    /// Empirical probability the game goes over the total.
    pub fn over_probability(&self) -> f64 {
        let totals = self.totals();
        let overs = totals.iter().filter(|&&t| t > self.line.total).count();
        overs as f64 / totals.len() as f64
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            home: summarize(&self.home),
            away: summarize(&self.away),
            spread: summarize(&self.spreads()),
            total: summarize(&self.totals()),
        }
    }
}

/// Summary of the raw (uncentered) trials for diagnostic reporting.
pub fn raw_summary(trials: &[SimulatedGame]) -> ScoreSummary {
    let home: Vec<f64> = trials.iter().map(|g| g.home as f64).collect();
    let away: Vec<f64> = trials.iter().map(|g| g.away as f64).collect();
    let spreads: Vec<f64> = trials.iter().map(|g| g.spread()).collect();
    let totals: Vec<f64> = trials.iter().map(|g| g.total()).collect();
    ScoreSummary {
        home: summarize(&home),
        away: summarize(&away),
        spread: summarize(&spreads),
        total: summarize(&totals),
    }
}

pub fn summarize(values: &[f64]) -> SummaryStats {
    SummaryStats {
        mean: mean(values),
        median: median(values),
        sd: stdev(values),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(spread: f64, total: f64) -> MarketLine {
        MarketLine {
            away_team: "BUF".into(),
            home_team: "KC".into(),
            season: 2024,
            week: 5,
            spread,
            total,
        }
    }

    /// Trials with raw mean spread +1.0 and raw mean total 44.0.
    fn plus_one_spread_trials() -> Vec<SimulatedGame> {
        vec![
            SimulatedGame { home: 23, away: 22 },
            SimulatedGame { home: 22, away: 21 },
        ]
    }

    #[test]
    fn test_closed_form_shifts_match_hand_solution() {
        // Raw +1.0 / 44.0 against market -3.0 / 47.0:
        // home_shift - away_shift = -4.0, home_shift + away_shift = 3.0
        // => home_shift = -0.5, away_shift = 3.5.
        let trials = plus_one_spread_trials();
        let dist = center(&trials, &line(-3.0, 47.0), 0.1).unwrap();
        assert!((dist.home_shift - (-0.5)).abs() < 1e-9);
        assert!((dist.away_shift - 3.5).abs() < 1e-9);

        let spreads = dist.spreads();
        let totals = dist.totals();
        let mean_spread = spreads.iter().sum::<f64>() / spreads.len() as f64;
        let mean_total = totals.iter().sum::<f64>() / totals.len() as f64;
        assert!((mean_spread - (-3.0)).abs() < 1e-9);
        assert!((mean_total - 47.0).abs() < 1e-9);
    }

    #[test]
    fn test_centering_is_exact_for_arbitrary_lines() {
        let trials: Vec<SimulatedGame> = (0..500)
            .map(|i| SimulatedGame {
                home: 10 + (i * 7 % 30) as u16,
                away: 7 + (i * 11 % 28) as u16,
            })
            .collect();
        for (spread, total) in [(-6.5, 51.5), (0.0, 40.0), (9.5, 38.5)] {
            let dist = center(&trials, &line(spread, total), 0.1).unwrap();
            let spreads = dist.spreads();
            let mean_spread = spreads.iter().sum::<f64>() / spreads.len() as f64;
            assert!((mean_spread - spread).abs() < 0.1);
        }
    }

    #[test]
    fn test_translation_preserves_standard_deviation() {
        let trials: Vec<SimulatedGame> = (0..500)
            .map(|i| SimulatedGame {
                home: 10 + (i * 13 % 35) as u16,
                away: 3 + (i * 17 % 33) as u16,
            })
            .collect();
        let raw = raw_summary(&trials);
        let dist = center(&trials, &line(-7.0, 55.5), 0.1).unwrap();
        let centered = dist.summary();
        assert!((centered.spread.sd - raw.spread.sd).abs() < 1e-9);
        assert!((centered.total.sd - raw.total.sd).abs() < 1e-9);
        assert!((centered.home.sd - raw.home.sd).abs() < 1e-9);
    }

    #[test]
    fn test_nan_line_is_fatal() {
        let trials = plus_one_spread_trials();
        let err = center(&trials, &line(f64::NAN, 47.0), 0.1).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_trials_rejected() {
        let err = center(&[], &line(-3.0, 47.0), 0.1).unwrap_err();
        assert!(matches!(err, EngineError::EmptyTrials(_)));
    }

    #[test]
    fn test_cover_and_over_probabilities() {
        // Symmetric two-point distribution around the line: half cover.
        let trials = vec![
            SimulatedGame { home: 30, away: 20 },
            SimulatedGame { home: 20, away: 30 },
        ];
        let dist = center(&trials, &line(0.0, 50.0), 0.1).unwrap();
        assert!((dist.cover_probability() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert!((median(&[3.0, 1.0, 2.0]) - 2.0).abs() < 1e-12);
        assert!((median(&[4.0, 1.0, 2.0, 3.0]) - 2.5).abs() < 1e-12);
    }
}
