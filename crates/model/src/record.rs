use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BatteryReading;

/// A persisted, timestamped battery reading.
///
/// Absent source values are flattened to `0` on the way in, so a record
/// cannot tell "not reported" apart from a genuine zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Store-assigned identity, `None` until appended.
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub percentage: u8,
    pub cycle_count: u32,
    /// Volts.
    pub voltage: f64,
    /// Celsius.
    pub temperature: f64,
}

impl HistoryRecord {
    pub fn from_reading(reading: &BatteryReading, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            timestamp,
            percentage: reading.percentage,
            cycle_count: reading.cycle_count.unwrap_or(0),
            voltage: reading.voltage_volts.unwrap_or(0.0),
            temperature: reading.temperature_celsius.unwrap_or(0.0),
        }
    }
}
