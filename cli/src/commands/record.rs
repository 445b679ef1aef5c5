use std::sync::Arc;

use color_eyre::eyre::{bail, Result};
use tokio_stream::StreamExt;
use tracing::{info, warn};

use super::{battery_source, open_store};
use crate::config::UserConfig;
use crate::data::{Sampler, TickOutcome};

pub fn run(config: &UserConfig, once: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    if once {
        runtime.block_on(record_once(config))
    } else {
        runtime.block_on(record(config))
    }
}

async fn record_once(config: &UserConfig) -> Result<()> {
    let store = Arc::new(open_store(config)?);
    let source = battery_source(&config.sampler.sources);
    let sampler = Sampler::new(source, store, config.sampler.interval());

    let id = recorded_id(sampler.sample_now().await)?;
    if let Some(reading) = sampler.current() {
        println!("Recorded sample {} ({}%)", id, reading.percentage);
    }
    Ok(())
}

fn recorded_id(outcome: TickOutcome) -> Result<i64> {
    match outcome {
        TickOutcome::Recorded { id } => Ok(id),
        TickOutcome::Skipped => bail!("No battery reading available"),
        TickOutcome::PersistFailed => bail!("Failed to store the battery sample"),
    }
}

async fn record(config: &UserConfig) -> Result<()> {
    let store = Arc::new(open_store(config)?);
    let source = battery_source(&config.sampler.sources);

    let sources = source.source_names();
    if sources.is_empty() {
        warn!("No battery sources enabled, nothing will be recorded");
    }

    let mut sampler = Sampler::new(source, Arc::clone(&store), config.sampler.interval());
    let readings = sampler.readings();
    tokio::pin!(readings);

    info!(
        ?sources,
        database = ?store.path(),
        interval = %humantime::format_duration(sampler.interval()),
        "Recording battery history"
    );
    sampler.start().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Shutting down");
                break;
            }
            Some(reading) = readings.next() => {
                info!(
                    percentage = reading.percentage,
                    charging = reading.is_charging,
                    cycles = ?reading.cycle_count,
                    temperature = ?reading.temperature_celsius,
                    voltage = ?reading.voltage_volts,
                    "Battery reading"
                );
            }
        }
    }

    sampler.stop().await;

    if let Some(last) = sampler.current() {
        info!(percentage = last.percentage, "Last recorded charge");
    }
    Ok(())
}
