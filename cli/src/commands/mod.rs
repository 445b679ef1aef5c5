pub mod config;
pub mod history;
pub mod insights;
pub mod logs;
pub mod now;
pub mod record;

use batlog_platform::{detailed_reader, HardwareReader, SummaryReader};
use chrono::{DateTime, Local, Utc};
use color_eyre::eyre::{Result, WrapErr};

use crate::config::{SourcesConfig, UserConfig};
use crate::data::{BatterySource, HistoryStore};

/// Open the history database configured for this user.
pub fn open_store(config: &UserConfig) -> Result<HistoryStore> {
    let path = config.history.database_path();
    HistoryStore::open(&path)
        .wrap_err_with(|| format!("Failed to open history database at {}", path.display()))
}

/// Build the reader pair enabled in config.
pub fn battery_source(sources: &SourcesConfig) -> BatterySource {
    let summary = sources
        .summary
        .then(|| Box::new(SummaryReader::new()) as Box<dyn HardwareReader>);
    let detailed = if sources.detailed {
        detailed_reader()
    } else {
        None
    };
    BatterySource::new(summary, detailed)
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
