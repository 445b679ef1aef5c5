//! Periodic battery sampling.
//!
//! The [`Sampler`] owns a background task that reconciles a reading on
//! every tick, publishes it as the current reading and appends it to the
//! history store. The current reading lives in a `watch` channel: the
//! sampling task is its only writer and any number of readers can borrow
//! the latest snapshot or wait for the next one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use batlog_model::{BatteryReading, HistoryRecord};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::data::{BatterySource, HistoryStore};

pub type CurrentReading = Option<Arc<BatteryReading>>;

/// Tokio intervals cannot tick with a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Recorded { id: i64 },
    /// No source produced a charge level.
    Skipped,
    /// The reading was published but could not be stored.
    PersistFailed,
}

struct TickState {
    source: BatterySource,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Everything a tick touches. Cheap to clone into the background task.
#[derive(Clone)]
struct TickContext {
    state: Arc<Mutex<TickState>>,
    store: Arc<HistoryStore>,
    current: Arc<watch::Sender<CurrentReading>>,
}

impl TickContext {
    /// One complete tick. Runs on the blocking pool because hardware
    /// readers may shell out.
    fn tick_blocking(&self) -> TickOutcome {
        // Holding the state lock for the whole tick keeps ticks strictly
        // sequential, even across a restart or an out-of-band sample.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(reading) = state.source.sample() else {
            debug!("No battery reading available, skipping tick");
            return TickOutcome::Skipped;
        };

        let timestamp = monotonic_timestamp(state.last_timestamp, Utc::now());
        state.last_timestamp = Some(timestamp);

        let record = HistoryRecord::from_reading(&reading, timestamp);
        self.current.send_replace(Some(Arc::new(reading)));

        match self.store.append(&record) {
            Ok(id) => {
                debug!(id, percentage = record.percentage, "Recorded battery sample");
                TickOutcome::Recorded { id }
            }
            Err(e) => {
                error!(error = %e, "Failed to persist battery sample");
                TickOutcome::PersistFailed
            }
        }
    }

    async fn tick(&self) -> TickOutcome {
        let ctx = self.clone();
        match tokio::task::spawn_blocking(move || ctx.tick_blocking()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Sampling tick panicked");
                TickOutcome::Skipped
            }
        }
    }
}

/// Never lets a wall-clock step backwards reorder history.
fn monotonic_timestamp(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match last {
        Some(last) if now < last => last,
        _ => now,
    }
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Sampler {
    ctx: TickContext,
    interval: Duration,
    task: Option<RunningTask>,
}

impl Sampler {
    pub fn new(source: BatterySource, store: Arc<HistoryStore>, interval: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            ctx: TickContext {
                state: Arc::new(Mutex::new(TickState {
                    source,
                    last_timestamp: None,
                })),
                store,
                current: Arc::new(current),
            },
            interval,
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The latest published reading.
    pub fn current(&self) -> CurrentReading {
        self.ctx.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CurrentReading> {
        self.ctx.current.subscribe()
    }

    /// Stream of published readings, starting with the current one if any.
    pub fn readings(&self) -> impl Stream<Item = Arc<BatteryReading>> {
        WatchStream::new(self.subscribe()).filter_map(|reading| reading)
    }

    /// Take one sample right now, outside the schedule.
    pub async fn sample_now(&self) -> TickOutcome {
        self.ctx.tick().await
    }

    /// Start sampling: one immediate sample, then one per interval.
    ///
    /// A running schedule is stopped first and its in-flight tick allowed to
    /// finish, so two schedules never overlap.
    pub async fn start(&mut self) {
        self.stop().await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(sampling_loop(
            self.ctx.clone(),
            self.interval,
            cancel.clone(),
        ));

        info!(interval_secs = self.interval.as_secs_f64(), "Sampler started");
        self.task = Some(RunningTask { cancel, handle });
    }

    /// Stop sampling. A tick in progress completes before this returns;
    /// no further tick starts. Does nothing if not running.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        task.cancel.cancel();
        if let Err(e) = task.handle.await {
            warn!(error = %e, "Sampling task ended abnormally");
        }
        info!("Sampler stopped");
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.cancel.cancel();
        }
    }
}

async fn sampling_loop(ctx: TickContext, interval: Duration, cancel: CancellationToken) {
    if cancel.is_cancelled() {
        return;
    }
    log_outcome(ctx.tick().await);

    let period = interval.max(MIN_PERIOD);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Sampling loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                log_outcome(ctx.tick().await);
            }
        }
    }
}

fn log_outcome(outcome: TickOutcome) {
    if outcome == TickOutcome::Skipped {
        debug!("Tick skipped");
    }
}
