//! The raw property bag produced by hardware readers.

/// Battery attributes as reported by a single OS source.
///
/// Every field is optional: a source reports what it knows and leaves the
/// rest unset. Values are kept in the source's native integer units and are
/// not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPropertyBag {
    /// Charge level, expected to already be 0-100.
    pub percentage: Option<i64>,

    /// Whether the battery is actively charging.
    pub is_charging: Option<bool>,

    /// Current capacity in native units (usually mAh).
    pub current_capacity: Option<i64>,

    /// Full-charge capacity in native units (usually mAh).
    pub max_capacity: Option<i64>,

    pub cycle_count: Option<i64>,

    /// Temperature in hundredths of a degree Celsius.
    pub temperature_raw: Option<i64>,

    /// Voltage in millivolts.
    pub voltage_mv: Option<i64>,
}

impl RawPropertyBag {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
