mod history;

pub use history::HistoryCommands;

use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sample the battery in the foreground and record history (default)
    #[command(alias = "rec")]
    Record {
        /// Sampling interval, e.g. 30s, 5m (overrides config)
        #[arg(short, long, value_parser = humantime::parse_duration)]
        interval: Option<Duration>,

        /// Take and store a single sample, then exit
        #[arg(long, conflicts_with = "interval")]
        once: bool,
    },

    /// Print one reconciled battery reading
    Now {
        #[arg(long)]
        json: bool,
    },

    /// Summarize recorded history into health insights
    Insights {
        #[arg(long)]
        json: bool,
    },

    /// View and manage recorded history
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },

    /// Show the effective configuration, or manage the config file
    Config {
        /// Print config file path
        #[arg(long, conflicts_with = "reset")]
        path: bool,

        /// Reset config to defaults
        #[arg(long)]
        reset: bool,
    },

    /// View recorder logs
    Logs {
        /// Number of lines to show
        #[arg(short, long, default_value_t = 50)]
        lines: usize,

        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },
}

/// Battery telemetry recorder with history and health insights
#[derive(Debug, Parser)]
#[command(name = "batlog", version, verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}
