//! Data types shared between the batlog platform readers, the history
//! store and the insight computations.
//!
//! Everything here is plain data: values are produced once and never
//! mutated, so they can be handed across threads and serialized freely.

mod insights;
mod reading;
mod record;
mod trend;

pub use insights::{HealthStatus, Insights, Suggestion};
pub use reading::{BatteryReading, Capacity};
pub use record::HistoryRecord;
pub use trend::{TrendMetric, TrendPoint};
