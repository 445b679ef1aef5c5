use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A history-derived series that can be charted over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Voltage,
    Temperature,
    CycleCount,
    #[default]
    Charge,
    Health,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 5] = [
        TrendMetric::Voltage,
        TrendMetric::Temperature,
        TrendMetric::CycleCount,
        TrendMetric::Charge,
        TrendMetric::Health,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrendMetric::Voltage => "Voltage",
            TrendMetric::Temperature => "Temp",
            TrendMetric::CycleCount => "Cycle",
            TrendMetric::Charge => "Charge",
            TrendMetric::Health => "Health",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            TrendMetric::Voltage => "V",
            TrendMetric::Temperature => "°C",
            TrendMetric::CycleCount => "cycles",
            TrendMetric::Charge | TrendMetric::Health => "%",
        }
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TrendMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "voltage" | "volt" => Ok(TrendMetric::Voltage),
            "temperature" | "temp" => Ok(TrendMetric::Temperature),
            "cycle" | "cycles" | "cycle_count" => Ok(TrendMetric::CycleCount),
            "charge" | "percentage" => Ok(TrendMetric::Charge),
            "health" => Ok(TrendMetric::Health),
            other => Err(format!("unknown trend metric '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}
