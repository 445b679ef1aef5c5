pub mod history_store;
pub mod insights;
pub mod reconciler;
pub mod sampler;
pub mod trends;

pub use history_store::{DatabaseStats, HistoryStore};
pub use reconciler::BatterySource;
pub use sampler::{Sampler, TickOutcome};
