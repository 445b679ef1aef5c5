//! Summary source: the OS power-source API via `starship-battery`.

use starship_battery::units::ratio::percent;
use starship_battery::{Manager, State};
use tracing::debug;

use crate::bag::RawPropertyBag;
use crate::reader::HardwareReader;

/// Reports the charge percentage and charging state of the first battery.
#[derive(Debug, Default)]
pub struct SummaryReader;

impl SummaryReader {
    pub fn new() -> Self {
        Self
    }
}

impl HardwareReader for SummaryReader {
    fn name(&self) -> &'static str {
        "power-source"
    }

    fn read(&mut self) -> Option<RawPropertyBag> {
        // A fresh manager per read keeps the reader `Send` and picks up a
        // battery that appeared since the last tick.
        let manager = Manager::new()
            .map_err(|e| debug!(error = %e, "Battery manager unavailable"))
            .ok()?;
        let battery = manager.batteries().ok()?.next()?.ok()?;

        let charge = battery.state_of_charge().get::<percent>();
        Some(RawPropertyBag {
            percentage: charge.is_finite().then(|| charge.round() as i64),
            is_charging: Some(battery.state() == State::Charging),
            ..Default::default()
        })
    }

    fn is_supported() -> bool {
        Manager::new()
            .ok()
            .and_then(|m| m.batteries().ok())
            .and_then(|mut b| b.next())
            .and_then(|b| b.ok())
            .is_some()
    }
}
