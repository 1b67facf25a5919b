//! Betting Recommendation
//!
//! Converts centered cover/over probabilities into a recommendation, gated by
//! the break-even probability plus a configurable edge threshold. A weak lean
//! is reported as an explicit no-bet, never rounded up to a play.

use serde::{Deserialize, Serialize};

use crate::config::MarketConfig;
use crate::market::center::CenteredDistribution;

/// Fraction of the probability edge expected to survive to the close.
const CLV_CAPTURE: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetSide {
    HomeCover,
    AwayCover,
    Over,
    Under,
}

/// Derived read-only view of a playable edge. Never persisted by the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BetTicket {
    pub side: BetSide,
    /// Model probability the side wins.
    pub probability: f64,
    /// Probability margin over break-even.
    pub edge: f64,
    /// 0-1, scaled by how far past break-even the probability sits.
    pub confidence: f64,
    /// Estimated closing-line value, in probability points.
    pub estimated_clv: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Recommendation {
    Bet(BetTicket),
    /// The best side fell short of the threshold.
    NoBet { best_side: BetSide, edge: f64 },
}

impl Recommendation {
    pub fn is_bet(&self) -> bool {
        matches!(self, Recommendation::Bet(_))
    }
}

/// Evaluate all four sides of the centered distribution and emit at most one
/// recommendation.
pub fn recommend(dist: &CenteredDistribution, config: &MarketConfig) -> Recommendation {
    let p_cover = dist.cover_probability();
    let p_over = dist.over_probability();

    let candidates = [
        (BetSide::HomeCover, p_cover),
        (BetSide::AwayCover, 1.0 - p_cover),
        (BetSide::Over, p_over),
        (BetSide::Under, 1.0 - p_over),
    ];
    let (side, probability) = candidates
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((BetSide::HomeCover, p_cover));

    let edge = probability - config.break_even;
    if edge <= config.edge_threshold {
        log::debug!(
            "{}@{}: best side {side:?} edge {edge:.4} below threshold {:.4}, no bet",
            dist.line.away_team,
            dist.line.home_team,
            config.edge_threshold
        );
        return Recommendation::NoBet { best_side: side, edge };
    }

    let confidence = (edge / (1.0 - config.break_even)).clamp(0.0, 1.0);
    log::info!(
        "{}@{}: {side:?} p={probability:.4} edge={edge:.4} confidence={confidence:.2}",
        dist.line.away_team,
        dist.line.home_team
    );
    Recommendation::Bet(BetTicket {
        side,
        probability,
        edge,
        confidence,
        estimated_clv: edge * CLV_CAPTURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::center::{center, MarketLine};
    use crate::sim::game::SimulatedGame;

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

    /// A right-skewed spread distribution: most mass a little under the line,
    /// a fat tail well above it. Totals stay balanced around their line so
    /// the spread shape is the only edge. Mean spread is pinned to the line
    /// by centering, but the cover probability is far from one half.
    fn skewed_trials() -> Vec<SimulatedGame> {
        let mut trials = Vec::new();
        for _ in 0..40 {
            trials.push(SimulatedGame { home: 21, away: 24 }); // spread -3, total 45
        }
        for _ in 0..40 {
            trials.push(SimulatedGame { home: 24, away: 27 }); // spread -3, total 51
        }
        for _ in 0..10 {
            trials.push(SimulatedGame { home: 38, away: 17 }); // spread +21, total 55
        }
        for _ in 0..10 {
            trials.push(SimulatedGame { home: 32, away: 11 }); // spread +21, total 43
        }
        trials
    }

    #[test]
    fn test_skewed_shape_produces_bet() {
        let dist = center(&skewed_trials(), &line(0.0, 48.0), 0.1).unwrap();
        let config = MarketConfig::default();
        let rec = recommend(&dist, &config);
        // 80% of centered spreads sit below the line.
        match rec {
            Recommendation::Bet(ticket) => {
                assert_eq!(ticket.side, BetSide::AwayCover);
                assert!(ticket.probability > 0.75);
                assert!(ticket.edge > config.edge_threshold);
                assert!(ticket.estimated_clv > 0.0);
                assert!((0.0..=1.0).contains(&ticket.confidence));
            }
            Recommendation::NoBet { .. } => panic!("expected a bet on the skewed shape"),
        }
    }

    #[test]
    fn test_balanced_distribution_is_no_bet() {
        let trials = vec![
            SimulatedGame { home: 27, away: 20 }, // spread +7, total 47
            SimulatedGame { home: 20, away: 29 }, // spread -9, total 49
        ];
        let dist = center(&trials, &line(0.0, 48.0), 0.1).unwrap();
        let rec = recommend(&dist, &MarketConfig::default());
        assert!(!rec.is_bet());
        match rec {
            Recommendation::NoBet { edge, .. } => assert!(edge < 0.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_threshold_gates_marginal_edges() {
        // 55/45 cover split: p = 0.55, edge over 0.5238 is ~0.026. Totals are
        // split close to even so the spread side stays the best candidate.
        let mut trials = Vec::new();
        for _ in 0..27 {
            trials.push(SimulatedGame { home: 30, away: 20 }); // spread +10, total 50
        }
        for _ in 0..28 {
            trials.push(SimulatedGame { home: 26, away: 20 }); // spread +6, total 46
        }
        for _ in 0..22 {
            trials.push(SimulatedGame { home: 20, away: 30 }); // spread -10, total 50
        }
        for _ in 0..23 {
            trials.push(SimulatedGame { home: 20, away: 26 }); // spread -6, total 46
        }
        let dist = center(&trials, &line(0.0, 48.0), 0.1).unwrap();

        let strict = MarketConfig {
            edge_threshold: 0.05,
            ..Default::default()
        };
        assert!(!recommend(&dist, &strict).is_bet());

        let loose = MarketConfig {
            edge_threshold: 0.02,
            ..Default::default()
        };
        assert!(recommend(&dist, &loose).is_bet());
    }

    #[test]
    fn test_recommendation_serializes_with_decision_tag() {
        let trials = skewed_trials();
        let dist = center(&trials, &line(0.0, 45.0), 0.1).unwrap();
        let rec = recommend(&dist, &MarketConfig::default());
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"decision\":\"bet\""), "{json}");
    }
}
