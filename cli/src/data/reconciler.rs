//! Merges the summary and detailed battery sources into one reading.

use batlog_model::{BatteryReading, Capacity};
use batlog_platform::{HardwareReader, RawPropertyBag};
use tracing::trace;

/// Registry temperatures are reported in hundredths of a degree.
const TEMPERATURE_DIVISOR: f64 = 100.0;
const MILLIVOLTS_PER_VOLT: f64 = 1000.0;

/// Reconcile two optional property bags into a canonical reading.
///
/// Percentage comes from the summary source, falling back to the capacity
/// ratio of the detailed source. Without either there is no reading.
/// Charging state comes only from the detailed source and defaults to
/// `false`; the summary source's charging flag is never used.
///
/// Implausible values (percentage outside 0-100, negative counts or
/// capacities, a capacity without its counterpart) are treated as if the
/// source had not reported them.
pub fn reconcile(
    summary: Option<&RawPropertyBag>,
    detailed: Option<&RawPropertyBag>,
) -> Option<BatteryReading> {
    let capacity = detailed.and_then(capacity_pair);

    let percentage = summary
        .and_then(|s| s.percentage)
        .and_then(|p| u8::try_from(p).ok())
        .filter(|p| *p <= 100)
        .or_else(|| capacity.and_then(percentage_from_capacity))?;

    let cycle_count = detailed
        .and_then(|d| d.cycle_count)
        .and_then(|c| u32::try_from(c).ok());
    let temperature_celsius = detailed
        .and_then(|d| d.temperature_raw)
        .map(|raw| raw as f64 / TEMPERATURE_DIVISOR);
    let voltage_volts = detailed
        .and_then(|d| d.voltage_mv)
        .map(|mv| mv as f64 / MILLIVOLTS_PER_VOLT);
    let is_charging = detailed.and_then(|d| d.is_charging).unwrap_or(false);

    Some(BatteryReading {
        percentage,
        capacity,
        cycle_count,
        temperature_celsius,
        voltage_volts,
        is_charging,
    })
}

fn capacity_pair(bag: &RawPropertyBag) -> Option<Capacity> {
    let current = u32::try_from(bag.current_capacity?).ok()?;
    let max = u32::try_from(bag.max_capacity?).ok()?;
    Some(Capacity { current, max })
}

fn percentage_from_capacity(capacity: Capacity) -> Option<u8> {
    if capacity.max == 0 {
        return None;
    }
    let ratio = capacity.current as f64 / capacity.max as f64 * 100.0;
    // A current capacity above max is a reporting glitch; cap at full.
    Some(ratio.round().min(100.0) as u8)
}

/// The hardware readers feeding one reconciled reading.
pub struct BatterySource {
    summary: Option<Box<dyn HardwareReader>>,
    detailed: Option<Box<dyn HardwareReader>>,
}

impl BatterySource {
    pub fn new(
        summary: Option<Box<dyn HardwareReader>>,
        detailed: Option<Box<dyn HardwareReader>>,
    ) -> Self {
        Self { summary, detailed }
    }

    /// Read both sources and reconcile them. `None` means the tick has no
    /// usable reading.
    pub fn sample(&mut self) -> Option<BatteryReading> {
        let summary = self.summary.as_mut().and_then(|r| r.read());
        let detailed = self.detailed.as_mut().and_then(|r| r.read());
        trace!(
            summary = summary.is_some(),
            detailed = detailed.is_some(),
            "Read hardware sources"
        );
        reconcile(summary.as_ref(), detailed.as_ref())
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.summary
            .iter()
            .chain(self.detailed.iter())
            .map(|r| r.name())
            .collect()
    }
}
