//! Detailed source for Linux: `/sys/class/power_supply`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::bag::RawPropertyBag;
use crate::reader::HardwareReader;

const POWER_SUPPLY_PATH: &str = "/sys/class/power_supply";

/// Reads capacities, cycle count, temperature and voltage from the first
/// `Battery`-typed power supply.
#[derive(Debug, Clone)]
pub struct SysfsReader {
    root: PathBuf,
}

impl SysfsReader {
    pub fn new() -> Self {
        Self::with_root(POWER_SUPPLY_PATH)
    }

    /// Use a different `power_supply` directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareReader for SysfsReader {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn read(&mut self) -> Option<RawPropertyBag> {
        // Batteries can be hot-swapped, so look the device up on every read.
        let path = find_battery_path(&self.root)?;
        trace!(path = ?path, "Reading battery from sysfs");
        Some(read_battery_dir(&path))
    }

    fn is_supported() -> bool {
        Path::new(POWER_SUPPLY_PATH).exists()
    }
}

/// Build a bag from a single `power_supply/<name>` directory.
///
/// sysfs reports micro-units and tenths of a degree; values are rescaled to
/// the bag's milli-units and hundredths of a degree.
pub fn read_battery_dir(dir: &Path) -> RawPropertyBag {
    let (current_capacity, max_capacity) = match (
        read_int(dir, "charge_now"),
        read_int(dir, "charge_full"),
    ) {
        (Some(now), Some(full)) => (Some(now / 1000), Some(full / 1000)),
        _ => (
            read_int(dir, "energy_now").map(|v| v / 1000),
            read_int(dir, "energy_full").map(|v| v / 1000),
        ),
    };

    RawPropertyBag {
        percentage: None,
        is_charging: read_status(dir),
        current_capacity,
        max_capacity,
        cycle_count: read_int(dir, "cycle_count"),
        temperature_raw: read_int(dir, "temp").and_then(|tenths| tenths.checked_mul(10)),
        voltage_mv: read_int(dir, "voltage_now").map(|uv| uv / 1000),
    }
}

fn read_status(dir: &Path) -> Option<bool> {
    let status = fs::read_to_string(dir.join("status")).ok()?;
    match status.trim() {
        "Charging" => Some(true),
        "Discharging" | "Not charging" | "Full" => Some(false),
        _ => None,
    }
}

fn read_int(dir: &Path, name: &str) -> Option<i64> {
    fs::read_to_string(dir.join(name))
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()
}

fn find_battery_path(root: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(root)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    entries.into_iter().find(|path| {
        fs::read_to_string(path.join("type"))
            .map(|t| t.trim() == "Battery")
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, value: &str) {
        fs::write(dir.join(name), format!("{}\n", value)).unwrap();
    }

    fn make_supply(root: &Path, name: &str, kind: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        write(&dir, "type", kind);
        dir
    }

    #[test]
    fn test_reads_charge_based_battery() {
        let root = tempfile::tempdir().unwrap();
        make_supply(root.path(), "AC", "Mains");
        let bat = make_supply(root.path(), "BAT0", "Battery");
        write(&bat, "charge_now", "3120000");
        write(&bat, "charge_full", "4800000");
        write(&bat, "cycle_count", "412");
        write(&bat, "temp", "310");
        write(&bat, "voltage_now", "12450000");
        write(&bat, "status", "Discharging");

        let bag = SysfsReader::with_root(root.path()).read().unwrap();

        assert_eq!(bag.current_capacity, Some(3120));
        assert_eq!(bag.max_capacity, Some(4800));
        assert_eq!(bag.cycle_count, Some(412));
        assert_eq!(bag.temperature_raw, Some(3100));
        assert_eq!(bag.voltage_mv, Some(12450));
        assert_eq!(bag.is_charging, Some(false));
        assert_eq!(bag.percentage, None);
    }

    #[test]
    fn test_falls_back_to_energy_files() {
        let root = tempfile::tempdir().unwrap();
        let bat = make_supply(root.path(), "BAT1", "Battery");
        write(&bat, "energy_now", "25000000");
        write(&bat, "energy_full", "50000000");
        write(&bat, "status", "Charging");

        let bag = read_battery_dir(&bat);

        assert_eq!(bag.current_capacity, Some(25000));
        assert_eq!(bag.max_capacity, Some(50000));
        assert_eq!(bag.is_charging, Some(true));
        assert_eq!(bag.temperature_raw, None);
    }

    #[test]
    fn test_unparseable_values_are_absent() {
        let root = tempfile::tempdir().unwrap();
        let bat = make_supply(root.path(), "BAT0", "Battery");
        write(&bat, "cycle_count", "n/a");
        write(&bat, "status", "Unknown");

        let bag = read_battery_dir(&bat);

        assert_eq!(bag.cycle_count, None);
        assert_eq!(bag.is_charging, None);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_out_of_range_temperature_is_absent() {
        let root = tempfile::tempdir().unwrap();
        let bat = make_supply(root.path(), "BAT0", "Battery");
        write(&bat, "temp", &i64::MAX.to_string());
        write(&bat, "cycle_count", "12");

        let bag = read_battery_dir(&bat);

        assert_eq!(bag.temperature_raw, None);
        assert_eq!(bag.cycle_count, Some(12));
    }

    #[test]
    fn test_no_battery_is_none() {
        let root = tempfile::tempdir().unwrap();
        make_supply(root.path(), "AC", "Mains");

        assert!(SysfsReader::with_root(root.path()).read().is_none());
    }

    #[test]
    fn test_missing_root_is_none() {
        assert!(SysfsReader::with_root("/nonexistent/power_supply").read().is_none());
    }
}
