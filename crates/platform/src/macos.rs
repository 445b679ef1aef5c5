//! Detailed source for macOS: the `AppleSmartBattery` IORegistry entry.
//!
//! `ioreg -a` prints the entry as an XML property list, which keeps the
//! parsing typed instead of scraping the human-readable `ioreg` output.

use std::time::Duration;

use plist::{Dictionary, Value};
use tracing::trace;

use crate::bag::RawPropertyBag;
use crate::command::output_with_timeout;
use crate::reader::HardwareReader;

const IOREG_TIMEOUT: Duration = Duration::from_secs(2);
const SERVICE_CLASS: &str = "AppleSmartBattery";

/// Reads capacities, cycle count, temperature and voltage from the
/// battery's IORegistry properties.
#[derive(Debug, Clone)]
pub struct RegistryReader {
    timeout: Duration,
}

impl RegistryReader {
    pub fn new() -> Self {
        Self {
            timeout: IOREG_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for RegistryReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareReader for RegistryReader {
    fn name(&self) -> &'static str {
        "ioreg"
    }

    fn read(&mut self) -> Option<RawPropertyBag> {
        let output = output_with_timeout("ioreg", &["-r", "-n", SERVICE_CLASS, "-a"], self.timeout)?;
        let bag = parse_registry_plist(&output);
        trace!(found = bag.is_some(), "Parsed ioreg output");
        bag
    }

    fn is_supported() -> bool {
        cfg!(target_os = "macos")
    }
}

/// Parse `ioreg -a` output into a bag.
///
/// `ioreg -r` prints an array of matching entries; the first one is used.
/// A bare dictionary is accepted too. Properties with an unexpected plist
/// type are left unset.
pub fn parse_registry_plist(bytes: &[u8]) -> Option<RawPropertyBag> {
    let value = Value::from_reader_xml(bytes).ok()?;
    let props = match &value {
        Value::Array(entries) => entries.iter().find_map(Value::as_dictionary)?,
        Value::Dictionary(dict) => dict,
        _ => return None,
    };
    Some(bag_from_properties(props))
}

fn bag_from_properties(props: &Dictionary) -> RawPropertyBag {
    RawPropertyBag {
        percentage: None,
        is_charging: bool_prop(props, "IsCharging"),
        current_capacity: int_prop(props, "CurrentCapacity"),
        max_capacity: int_prop(props, "MaxCapacity"),
        cycle_count: int_prop(props, "CycleCount"),
        temperature_raw: int_prop(props, "Temperature"),
        voltage_mv: int_prop(props, "Voltage"),
    }
}

fn int_prop(props: &Dictionary, key: &str) -> Option<i64> {
    match props.get(key)? {
        Value::Integer(i) => i.as_signed(),
        _ => None,
    }
}

fn bool_prop(props: &Dictionary, key: &str) -> Option<bool> {
    match props.get(key)? {
        Value::Boolean(b) => Some(*b),
        Value::Integer(i) => i.as_signed().map(|v| v != 0),
        _ => None,
    }
}
