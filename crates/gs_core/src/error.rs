use thiserror::Error;

/// Fatal engine errors. Recoverable conditions (missing metrics, thin
/// samples) never surface here; they resolve through the fallback chain and
/// are recorded on the profile for audit.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("look-ahead violation for ({season}, week {week}): {reason}")]
    LookAhead {
        season: u16,
        week: u8,
        reason: String,
    },

    #[error("centering divergence on {axis}: target {target:.3}, centered mean {actual:.3}")]
    CenteringDivergence {
        axis: &'static str,
        target: f64,
        actual: f64,
    },

    #[error("empty trial array: {0}")]
    EmptyTrials(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
