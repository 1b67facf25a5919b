//! Market-anchored calibration of simulated distributions and the betting
//! recommendation derived from them.

pub mod center;
pub mod recommend;

pub use center::{
    center, raw_summary, summarize, CenteredDistribution, MarketLine, ScoreSummary, SummaryStats,
};
pub use recommend::{recommend, BetSide, BetTicket, Recommendation};
