//! Bounded helper-process execution.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `program` and return its stdout, or `None` if it fails to start,
/// exits unsuccessfully, or is still running after `timeout`.
pub(crate) fn output_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Option<Vec<u8>> {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!(program, error = %e, "Failed to spawn helper");
            return None;
        }
    };

    // Drain stdout on a separate thread so a large output can't fill the
    // pipe and stall the child while we poll.
    let mut stdout = child.stdout.take()?;
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!(program, timeout_ms = timeout.as_millis() as u64, "Helper timed out");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                debug!(program, error = %e, "Failed to wait on helper");
                return None;
            }
        }
    };

    let output = reader.join().ok()?.ok()?;
    if !status.success() {
        debug!(program, code = ?status.code(), "Helper exited unsuccessfully");
        return None;
    }
    Some(output)
}
