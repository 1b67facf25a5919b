//! Weekly feature data: flat tables, the roll-forward loader, and the
//! repository object the rest of the engine reads through.

pub mod loader;
pub mod repository;
pub mod table;

pub use loader::{latest_per_team, rows_before, AsOfRow, AsOfStamp, WeeklyKeyed};
pub use repository::MetricRepository;
pub use table::{FeatureRow, FeatureTable, Metric, TableKind, TendencyRow};
