use batlog_model::{HistoryRecord, TrendMetric, TrendPoint};
use color_eyre::eyre::{eyre, Result};

use super::{format_timestamp, open_store};
use crate::cli::HistoryCommands;
use crate::config::UserConfig;
use crate::data::{trends, DatabaseStats, HistoryStore};

pub fn run(config: &UserConfig, command: Option<HistoryCommands>) -> Result<()> {
    let cmd = command.unwrap_or(HistoryCommands::List {
        limit: None,
        json: false,
    });

    let store = open_store(config)?;

    match cmd {
        HistoryCommands::List { limit, json } => {
            let records = latest(store.list_all()?, limit);

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No history recorded yet.");
                println!("\nStart the recorder to collect samples:");
                println!("  batlog record");
            } else {
                print!("{}", render_records(&records));
            }
        }
        HistoryCommands::Delete { ids } => {
            for id in ids {
                if store.delete(id)? {
                    println!("Deleted record {}", id);
                } else {
                    println!("No record with id {}", id);
                }
            }
        }
        HistoryCommands::Stats => {
            let stats = store.get_stats()?;
            print!("{}", render_stats(&store, &stats));
        }
        HistoryCommands::Trends { metric, json } => {
            let metric: TrendMetric = metric.parse().map_err(|e: String| eyre!(e))?;
            let points = trends::series(&store.list_all()?, metric);

            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                print!("{}", render_trend(metric, &points));
            }
        }
    }

    Ok(())
}

/// Keep the newest `limit` records, still oldest first.
fn latest(mut records: Vec<HistoryRecord>, limit: Option<usize>) -> Vec<HistoryRecord> {
    if let Some(limit) = limit {
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
    }
    records
}

fn render_records(records: &[HistoryRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6} {:<20} {:>7} {:>7} {:>9} {:>9}\n",
        "ID", "Time", "Charge", "Cycles", "Voltage", "Temp"
    ));
    out.push_str(&format!("{}\n", "-".repeat(63)));
    for record in records {
        out.push_str(&format!(
            "{:>6} {:<20} {:>6}% {:>7} {:>7.2} V {:>6.1} °C\n",
            record.id.unwrap_or_default(),
            format_timestamp(record.timestamp),
            record.percentage,
            record.cycle_count,
            record.voltage,
            record.temperature
        ));
    }
    out
}

fn render_stats(store: &HistoryStore, stats: &DatabaseStats) -> String {
    let location = store
        .path()
        .map_or_else(|| "(in memory)".to_string(), |p| p.display().to_string());

    let mut out = String::new();
    out.push_str("History Database\n");
    out.push_str(&format!("{}\n", "=".repeat(50)));
    out.push_str(&format!("Location:       {}\n", location));
    out.push_str(&format!("Records:        {}\n", stats.record_count));
    out.push_str(&format!(
        "Oldest:         {}\n",
        stats.oldest_record.map_or("-".to_string(), format_timestamp)
    ));
    out.push_str(&format!(
        "Newest:         {}\n",
        stats.newest_record.map_or("-".to_string(), format_timestamp)
    ));
    out.push_str(&format!("Size:           {}\n", stats.size_formatted()));
    out
}

fn render_trend(metric: TrendMetric, points: &[TrendPoint]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", metric, metric.unit()));
    out.push_str(&format!("{}\n", "=".repeat(40)));

    let Some((min, max, mean)) = trends::summarize(points) else {
        out.push_str("No data recorded yet.\n");
        return out;
    };

    for point in points {
        out.push_str(&format!(
            "{:<20} {:>10.2}\n",
            format_timestamp(point.timestamp),
            point.value
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(40)));
    out.push_str(&format!(
        "min {:.2}  max {:.2}  mean {:.2}\n",
        min, max, mean
    ));
    out
}
