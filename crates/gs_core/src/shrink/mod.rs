//! Empirical-Bayes Shrinker
//!
//! `shrink(observed, n, prior, lambda) = n/(n+lambda) * observed
//!  + lambda/(n+lambda) * prior`.
//!
//! Two calibrated lambdas are in use: quarterback dropback statistics shrink
//! with lambda = 150 dropbacks, situational play-calling with lambda = 50
//! plays. The shrunk value always lies between the observed rate and the
//! prior, and converges to the observed rate as n grows.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::profile::record::QbRates;

/// A shrunk rate plus the sample size and weight that produced it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShrinkageResult {
    pub value: f64,
    /// `w = n / (n + lambda)`, the weight on the observed rate.
    pub weight: f64,
    pub n: f64,
}

/// Shrinks small-sample rates toward a league prior.
#[derive(Debug, Clone, Copy)]
pub struct Shrinker {
    lambda: f64,
}

impl Shrinker {
    /// An invalid lambda would corrupt every shrunk rate in a batch, so it is
    /// rejected here rather than defaulted.
    pub fn new(lambda: f64) -> Result<Self> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "shrinkage lambda must be positive and finite, got {lambda}"
            )));
        }
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn shrink(&self, observed: f64, n: f64, prior: f64) -> ShrinkageResult {
        let n = n.max(0.0);
        let weight = n / (n + self.lambda);
        ShrinkageResult {
            value: weight * observed + (1.0 - weight) * prior,
            weight,
            n,
        }
    }

    /// Field-by-field shrink over the named quarterback rate bundle, each
    /// field against its own prior.
    pub fn shrink_qb_rates(&self, observed: &QbRates, n: f64, priors: &QbRates) -> QbRates {
        QbRates {
            completion: self.shrink(observed.completion, n, priors.completion).value,
            interception: self
                .shrink(observed.interception, n, priors.interception)
                .value,
            sack: self.shrink(observed.sack, n, priors.sack).value,
            scramble: self.shrink(observed.scramble, n, priors.scramble).value,
            yards_per_attempt: self
                .shrink(observed.yards_per_attempt, n, priors.yards_per_attempt)
                .value,
            epa_per_play: self
                .shrink(observed.epa_per_play, n, priors.epa_per_play)
                .value,
        }
    }
}

/// Fixed league-reference priors, partitioned by pocket state.
#[derive(Debug, Clone, Copy)]
pub struct LeaguePassingPriors {
    pub clean: QbRates,
    pub pressured: QbRates,
}

/// League priors used whenever a quarterback sample is thin.
pub static LEAGUE_PASSING_PRIORS: Lazy<LeaguePassingPriors> = Lazy::new(|| LeaguePassingPriors {
    clean: QbRates::league_clean(),
    pressured: QbRates::league_pressured(),
});

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_new_rejects_bad_lambda() {
        assert!(Shrinker::new(0.0).is_err());
        assert!(Shrinker::new(-5.0).is_err());
        assert!(Shrinker::new(f64::NAN).is_err());
        assert!(Shrinker::new(f64::INFINITY).is_err());
        assert!(Shrinker::new(150.0).is_ok());
    }

    #[test]
    fn test_three_dropback_pressure_sample_stays_near_prior() {
        // 0.30 raw on 3 dropbacks, prior 0.21, lambda 150:
        // 3/153 * 0.30 + 150/153 * 0.21 = 0.21176...
        let shrinker = Shrinker::new(150.0).unwrap();
        let result = shrinker.shrink(0.30, 3.0, 0.21);
        assert!(approx_eq(result.value, 0.2118, 5e-4), "{}", result.value);
        assert!(approx_eq(result.weight, 3.0 / 153.0, 1e-12));
    }

    #[test]
    fn test_zero_sample_returns_prior() {
        let shrinker = Shrinker::new(50.0).unwrap();
        let result = shrinker.shrink(0.9, 0.0, 0.55);
        assert!(approx_eq(result.value, 0.55, 1e-12));
        assert!(approx_eq(result.weight, 0.0, 1e-12));
    }

    #[test]
    fn test_large_sample_converges_to_observed() {
        let shrinker = Shrinker::new(150.0).unwrap();
        let result = shrinker.shrink(0.30, 1e9, 0.21);
        assert!(approx_eq(result.value, 0.30, 1e-6));
    }

    #[test]
    fn test_monotone_in_n() {
        let shrinker = Shrinker::new(150.0).unwrap();
        let mut last = shrinker.shrink(0.30, 0.0, 0.21).value;
        for n in [1.0, 5.0, 25.0, 150.0, 1000.0, 100_000.0] {
            let next = shrinker.shrink(0.30, n, 0.21).value;
            assert!(next > last, "shrunk value must move toward observed as n grows");
            last = next;
        }
    }

    #[test]
    fn test_bundle_shrinks_each_field_toward_its_own_prior() {
        let shrinker = Shrinker::new(150.0).unwrap();
        let observed = QbRates {
            completion: 0.80,
            interception: 0.00,
            sack: 0.30,
            scramble: 0.20,
            yards_per_attempt: 9.5,
            epa_per_play: 0.60,
        };
        let priors = QbRates::league_pressured();
        let shrunk = shrinker.shrink_qb_rates(&observed, 20.0, &priors);

        assert!(shrunk.completion > priors.completion && shrunk.completion < observed.completion);
        assert!(shrunk.interception < priors.interception);
        assert!(shrunk.sack > priors.sack && shrunk.sack < observed.sack);
        assert!(
            shrunk.yards_per_attempt > priors.yards_per_attempt
                && shrunk.yards_per_attempt < observed.yards_per_attempt
        );
    }

    proptest! {
        /// The shrunk value never leaves the [observed, prior] interval and
        /// the weight stays in [0, 1].
        #[test]
        fn prop_shrunk_value_between_observed_and_prior(
            observed in 0.0f64..1.0,
            prior in 0.0f64..1.0,
            n in 0.0f64..10_000.0,
            lambda in 0.1f64..1_000.0,
        ) {
            let shrinker = Shrinker::new(lambda).unwrap();
            let result = shrinker.shrink(observed, n, prior);
            let lo = observed.min(prior) - 1e-12;
            let hi = observed.max(prior) + 1e-12;
            prop_assert!(result.value >= lo && result.value <= hi);
            prop_assert!(result.weight >= 0.0 && result.weight <= 1.0);
        }

        /// Strict monotonicity toward the observed rate as n increases, for
        /// observed != prior.
        #[test]
        fn prop_monotonic_in_n(
            observed in 0.0f64..1.0,
            prior in 0.0f64..1.0,
            n in 1.0f64..5_000.0,
        ) {
            prop_assume!((observed - prior).abs() > 1e-6);
            let shrinker = Shrinker::new(150.0).unwrap();
            let small = shrinker.shrink(observed, n, prior).value;
            let large = shrinker.shrink(observed, n * 2.0, prior).value;
            prop_assert!((large - observed).abs() < (small - observed).abs());
        }
    }
}
