//! Engine Configuration
//!
//! Calibrated defaults for shrinkage, pressure fitting, and market
//! recommendation thresholds. All values are validated once at batch start;
//! a bad value here would corrupt every trial, so validation failures are
//! fatal rather than defaulted.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Empirical-Bayes shrinkage lambdas (pseudo-observation counts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShrinkageConfig {
    /// Lambda for quarterback dropback statistics.
    pub qb_lambda: f64,
    /// Lambda for situational play-calling tendencies.
    pub tendency_lambda: f64,
}

impl Default for ShrinkageConfig {
    fn default() -> Self {
        Self {
            qb_lambda: 150.0,
            tendency_lambda: 50.0,
        }
    }
}

/// Pressure baseline fitting parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureConfig {
    /// EWMA smoothing factor applied to the newest week.
    pub alpha: f64,
    /// Bounded lookback window, in weeks.
    pub lookback_weeks: u8,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            alpha: 0.45,
            lookback_weeks: 5,
        }
    }
}

/// Market calibration and recommendation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Break-even win probability implied by the vig (0.5238 at -110).
    pub break_even: f64,
    /// Required probability margin above break-even before a bet is emitted.
    pub edge_threshold: f64,
    /// Maximum tolerated |centered mean - market target| in points.
    pub centering_tolerance: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            break_even: 110.0 / 210.0,
            edge_threshold: 0.025,
            centering_tolerance: 0.1,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub shrinkage: ShrinkageConfig,
    pub pressure: PressureConfig,
    pub market: MarketConfig,
    /// Monte Carlo trials per game.
    pub trials: u32,
    /// Keep the raw (uncentered) score pairs on each report for diagnostics.
    pub keep_raw_trials: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shrinkage: ShrinkageConfig::default(),
            pressure: PressureConfig::default(),
            market: MarketConfig::default(),
            trials: 10_000,
            keep_raw_trials: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        check_positive_finite("shrinkage.qb_lambda", self.shrinkage.qb_lambda)?;
        check_positive_finite("shrinkage.tendency_lambda", self.shrinkage.tendency_lambda)?;
        if !(self.pressure.alpha > 0.0 && self.pressure.alpha <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "pressure.alpha must be in (0, 1], got {}",
                self.pressure.alpha
            )));
        }
        if self.pressure.lookback_weeks == 0 {
            return Err(EngineError::InvalidConfig(
                "pressure.lookback_weeks must be >= 1".into(),
            ));
        }
        if !(self.market.break_even > 0.5 && self.market.break_even < 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "market.break_even must be in (0.5, 1), got {}",
                self.market.break_even
            )));
        }
        check_nonnegative_finite("market.edge_threshold", self.market.edge_threshold)?;
        check_positive_finite("market.centering_tolerance", self.market.centering_tolerance)?;
        if self.trials == 0 {
            return Err(EngineError::InvalidConfig("trials must be >= 1".into()));
        }
        Ok(())
    }
}

fn check_positive_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidConfig(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

fn check_nonnegative_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidConfig(format!(
            "{name} must be non-negative and finite, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_lambda_rejected() {
        let mut config = EngineConfig::default();
        config.shrinkage.qb_lambda = 0.0;
        assert!(config.validate().is_err());

        config.shrinkage.qb_lambda = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_break_even_bounds() {
        let mut config = EngineConfig::default();
        config.market.break_even = 0.5;
        assert!(config.validate().is_err());
        config.market.break_even = 0.55;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_trials_rejected() {
        let mut config = EngineConfig::default();
        config.trials = 0;
        assert!(config.validate().is_err());
    }
}
