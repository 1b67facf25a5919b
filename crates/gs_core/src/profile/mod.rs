//! Team strength profiling: the immutable per-week record, its builder, and
//! the situational play-calling tendency table.

pub mod builder;
pub mod record;
pub mod tendency;

pub use builder::{ProfileBuilder, TeamContext};
pub use record::{
    DefaultedMetric, FallbackSource, MatchupGrades, QbRates, QbSplits, TeamWeekRecord,
};
pub use tendency::{
    DistanceBucket, ScoreBucket, SituationKey, TendencyLookup, TendencySource, TendencyTable,
    TimeBucket,
};
