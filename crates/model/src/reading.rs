use serde::{Deserialize, Serialize};

/// Raw capacity pair as reported by the battery registry.
///
/// Units are whatever the detailed source reports (usually mAh). The two
/// values only make sense together, so they are never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub current: u32,
    pub max: u32,
}

/// One reconciled battery snapshot.
///
/// Produced once per successful sampling tick. `percentage` is always in
/// `0..=100`; every other attribute is best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// Charge level (0-100).
    pub percentage: u8,

    /// Current and maximum capacity, if the detailed source reported both.
    pub capacity: Option<Capacity>,

    pub cycle_count: Option<u32>,

    /// Battery temperature in Celsius.
    pub temperature_celsius: Option<f64>,

    /// Battery voltage in volts.
    pub voltage_volts: Option<f64>,

    pub is_charging: bool,
}

impl BatteryReading {
    /// A reading carrying only a charge level.
    pub fn with_percentage(percentage: u8) -> Self {
        Self {
            percentage: percentage.min(100),
            capacity: None,
            cycle_count: None,
            temperature_celsius: None,
            voltage_volts: None,
            is_charging: false,
        }
    }

    pub fn current_capacity(&self) -> Option<u32> {
        self.capacity.map(|c| c.current)
    }

    pub fn max_capacity(&self) -> Option<u32> {
        self.capacity.map(|c| c.max)
    }

    /// Capacity ratio as a percentage: `current / max * 100`.
    ///
    /// Only defined when both capacities are known and `max > 0`. This is
    /// unrelated to the history-based `Insights::estimated_health`.
    pub fn health_percentage(&self) -> Option<f64> {
        let capacity = self.capacity?;
        if capacity.max == 0 {
            return None;
        }
        Some(capacity.current as f64 / capacity.max as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_percentage_from_capacities() {
        let mut reading = BatteryReading::with_percentage(50);
        reading.capacity = Some(Capacity {
            current: 4500,
            max: 5000,
        });
        assert_eq!(reading.health_percentage(), Some(90.0));
    }

    #[test]
    fn test_health_percentage_requires_capacities() {
        let reading = BatteryReading::with_percentage(50);
        assert_eq!(reading.health_percentage(), None);
        assert_eq!(reading.current_capacity(), None);
        assert_eq!(reading.max_capacity(), None);
    }

    #[test]
    fn test_health_percentage_zero_max() {
        let mut reading = BatteryReading::with_percentage(50);
        reading.capacity = Some(Capacity { current: 10, max: 0 });
        assert_eq!(reading.health_percentage(), None);
    }

    #[test]
    fn test_with_percentage_clamps() {
        assert_eq!(BatteryReading::with_percentage(250).percentage, 100);
    }
}
