use std::path::{Path, PathBuf};

use color_eyre::eyre::Result;

use crate::logging;

pub fn run(lines: usize, follow: bool) -> Result<()> {
    let log_dir = logging::log_dir();

    let Some(path) = latest_log_file(&log_dir) else {
        println!("No log files found in {:?}", log_dir);
        println!("Log files are created by `batlog record`.");
        return Ok(());
    };

    let mut tail = std::process::Command::new("tail");
    if follow {
        tail.arg("-f");
    }
    tail.args(["-n", &lines.to_string()]).arg(&path).status()?;

    Ok(())
}

/// Daily-rotated files sort by date, so the last name is the newest.
fn latest_log_file(dir: &Path) -> Option<PathBuf> {
    let mut log_files: Vec<_> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with(logging::LOG_PREFIX) && name.ends_with(".log")
        })
        .map(|e| e.path())
        .collect();

    log_files.sort();
    log_files.pop()
}
