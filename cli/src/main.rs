mod cli;
mod commands;
mod config;
mod data;
mod logging;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{debug, warn};

use cli::{Cli, Commands};
use config::{config_path, LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let log_level_override = cli.log_level.as_deref().and_then(LogLevel::from_str);

    // An unusable config still lets the command run on defaults; the error
    // is reported once logging is up.
    let (mut config, config_error) = match UserConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (UserConfig::default(), Some(e)),
    };

    let command = cli.command.unwrap_or(Commands::Record {
        interval: None,
        once: false,
    });

    let mode = match command {
        Commands::Record { once: false, .. } => LogMode::Recorder,
        _ => LogMode::Console,
    };
    let _guard = logging::init(config.log_level, mode, log_level_override);

    if let Some(e) = config_error {
        warn!(path = ?config_path(), error = %e, "Ignoring unusable config file, using defaults");
    }

    match command {
        Commands::Record { interval, once } => {
            if config.merge_with_args(interval) {
                debug!(secs = config.sampler.sample_interval_secs, "Interval set from command line");
            }
            commands::record::run(&config, once)
        }
        Commands::Now { json } => commands::now::run(&config, json),
        Commands::Insights { json } => commands::insights::run(&config, json),
        Commands::History { command } => commands::history::run(&config, command),
        Commands::Config { path, reset } => commands::config::run(&config, path, reset),
        Commands::Logs { lines, follow } => commands::logs::run(lines, follow),
    }
}
