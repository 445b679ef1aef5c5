use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical health band derived from `Insights::estimated_health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    /// No history to judge from.
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Bands an estimated health value.
    ///
    /// Lower bounds are inclusive and upper bounds exclusive, except the top
    /// band which includes 100.
    pub fn from_health(health: f64) -> Self {
        if (90.0..=100.0).contains(&health) {
            HealthStatus::Excellent
        } else if (80.0..90.0).contains(&health) {
            HealthStatus::Good
        } else if (65.0..80.0).contains(&health) {
            HealthStatus::Fair
        } else {
            HealthStatus::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Fair => "Fair",
            HealthStatus::Poor => "Poor",
            HealthStatus::Unknown => "Unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Battery capacity is close to new condition.",
            HealthStatus::Good => "Slight wear detected, but performance is still strong.",
            HealthStatus::Fair => "Battery shows signs of aging. Consider calibration soon.",
            HealthStatus::Poor => "Battery health is low. Replacement may be needed.",
            HealthStatus::Unknown => "Not enough history recorded yet.",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Advisory produced by the insight rules.
///
/// Variants are declared in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    HighTemperature,
    HighAverageCharge,
    HighCycleCount,
    Balanced,
}

impl Suggestion {
    pub fn message(&self) -> &'static str {
        match self {
            Suggestion::HighTemperature => {
                "Avoid high temperatures, they degrade the battery faster."
            }
            Suggestion::HighAverageCharge => {
                "Try to keep your charge level between 20-80% for longer lifespan."
            }
            Suggestion::HighCycleCount => {
                "Your battery has high cycle count, health degradation is expected."
            }
            Suggestion::Balanced => "Battery usage appears balanced. Keep up the good habits!",
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Aggregate statistics over the full recorded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub average_charge: f64,
    pub average_temperature: f64,
    /// Cycle count of the most recent record.
    pub total_cycles: u32,
    /// Latest charge relative to the historical average, capped at 100.
    pub estimated_health: f64,
    pub status: HealthStatus,
    pub suggestions: Vec<Suggestion>,
}

impl Insights {
    pub fn suggestion_messages(&self) -> Vec<&'static str> {
        self.suggestions.iter().map(Suggestion::message).collect()
    }
}
