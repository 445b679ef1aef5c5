use std::fmt::Display;

use batlog_model::BatteryReading;
use color_eyre::eyre::{bail, Result};
use serde::Serialize;

use super::battery_source;
use crate::config::UserConfig;

#[derive(Serialize)]
struct NowOutput<'a> {
    #[serde(flatten)]
    reading: &'a BatteryReading,
    health_percentage: Option<f64>,
}

pub fn run(config: &UserConfig, json: bool) -> Result<()> {
    let mut source = battery_source(&config.sampler.sources);
    let Some(reading) = source.sample() else {
        bail!("No battery reading available (sources: {:?})", source.source_names());
    };

    if json {
        let output = NowOutput {
            reading: &reading,
            health_percentage: reading.health_percentage(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render(&reading));
    }
    Ok(())
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn render(reading: &BatteryReading) -> String {
    let state = if reading.is_charging {
        "charging"
    } else {
        "not charging"
    };
    let capacity = reading
        .capacity
        .map(|c| format!("{} / {}", c.current, c.max));

    let mut out = String::new();
    out.push_str("Battery\n");
    out.push_str(&format!("{}\n", "=".repeat(40)));
    out.push_str(&format!("Charge:         {}% ({})\n", reading.percentage, state));
    out.push_str(&format!("Capacity:       {}\n", or_na(capacity)));
    out.push_str(&format!(
        "Health:         {}\n",
        or_na(reading.health_percentage().map(|h| format!("{h:.1}%")))
    ));
    out.push_str(&format!("Cycle count:    {}\n", or_na(reading.cycle_count)));
    out.push_str(&format!(
        "Temperature:    {}\n",
        or_na(reading.temperature_celsius.map(|t| format!("{t:.1} °C")))
    ));
    out.push_str(&format!(
        "Voltage:        {}\n",
        or_na(reading.voltage_volts.map(|v| format!("{v:.2} V")))
    ));
    out
}
