// Polling aggregator: fixed-interval fetch → validate → apply to PollingState → publish.
// One poller per dashboard session. Idle → Polling on activate, → Stopped on deactivate (terminal).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval, interval_at};
use tracing::instrument;

use crate::error::{PollerError, SourceError};
use crate::models::{Phase, PollingState, PollingView, TelemetrySnapshot};
use crate::source::TelemetrySource;

/// Rate limit for the "no subscribers" debug line.
const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    pub history_capacity: usize,
    /// true: first tick fires on activation, then every `interval`.
    /// false: first tick fires one `interval` after activation.
    pub fire_on_start: bool,
    /// Capacity of the view broadcast channel (slow subscribers lag).
    pub broadcast_capacity: usize,
    /// How often to log tick counters at INFO.
    pub stats_log_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            history_capacity: crate::models::DEFAULT_HISTORY_CAPACITY,
            fire_on_start: true,
            broadcast_capacity: 16,
            stats_log_interval: Duration::from_secs(60),
        }
    }
}

impl PollerConfig {
    fn check(&self) -> Result<(), PollerError> {
        if self.interval.is_zero() {
            return Err(PollerError::InvalidConfig("interval"));
        }
        if self.stats_log_interval.is_zero() {
            return Err(PollerError::InvalidConfig("stats_log_interval"));
        }
        Ok(())
    }
}

/// Tick outcome counters, shared with the polling task.
#[derive(Debug, Default)]
pub struct TickCounters {
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
    /// Fetches that resolved after deactivation and were dropped.
    pub discarded: AtomicU64,
}

struct Inner {
    phase: Phase,
    state: PollingState,
}

/// Cloneable read side of a poller, for routes and other observers.
#[derive(Clone)]
pub struct StateReader {
    inner: Arc<Mutex<Inner>>,
    tx: broadcast::Sender<PollingView>,
    counters: Arc<TickCounters>,
}

impl StateReader {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Mutations never panic half-way, so a poisoned state is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent copy of the whole state (history series never torn).
    pub fn view(&self) -> PollingView {
        let inner = self.lock();
        inner.state.view(inner.phase)
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Receives a view after every applied tick.
    pub fn subscribe(&self) -> broadcast::Receiver<PollingView> {
        self.tx.subscribe()
    }

    pub fn counters(&self) -> &TickCounters {
        &self.counters
    }
}

struct Running {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

pub struct Poller<S: TelemetrySource> {
    source: Option<S>,
    config: PollerConfig,
    reader: StateReader,
    running: Option<Running>,
}

impl<S: TelemetrySource> Poller<S> {
    /// Builds an idle poller with empty state; nothing runs until `activate`.
    pub fn new(source: S, config: PollerConfig) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        let inner = Inner {
            phase: Phase::Idle,
            state: PollingState::new(config.history_capacity),
        };
        Self {
            source: Some(source),
            config,
            reader: StateReader {
                inner: Arc::new(Mutex::new(inner)),
                tx,
                counters: Arc::new(TickCounters::default()),
            },
            running: None,
        }
    }

    /// Starts the polling task. Calling it while already polling is a no-op;
    /// a stopped poller cannot be restarted. Zero intervals are rejected and
    /// leave the poller idle. Must be called inside a Tokio runtime.
    pub fn activate(&mut self) -> Result<(), PollerError> {
        self.config.check()?;
        {
            let mut inner = self.reader.lock();
            match inner.phase {
                Phase::Polling => {
                    tracing::debug!("activate ignored: already polling");
                    return Ok(());
                }
                Phase::Stopped => return Err(PollerError::Stopped),
                Phase::Idle => inner.phase = Phase::Polling,
            }
        }
        let Some(source) = self.source.take() else {
            return Err(PollerError::Stopped);
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(
            source,
            self.config.clone(),
            self.reader.clone(),
            shutdown_rx,
        ));
        self.running = Some(Running {
            shutdown_tx: Some(shutdown_tx),
            handle,
        });
        tracing::info!(
            interval_ms = self.config.interval.as_millis() as u64,
            history_capacity = self.config.history_capacity,
            fire_on_start = self.config.fire_on_start,
            "Polling activated"
        );
        Ok(())
    }

    /// Stops polling. Idempotent. Once this returns, no tick mutates the
    /// state, even if a fetch that was in flight resolves afterwards.
    pub fn deactivate(&mut self) {
        {
            let mut inner = self.reader.lock();
            if inner.phase == Phase::Stopped {
                return;
            }
            inner.phase = Phase::Stopped;
        }
        self.source = None;
        if let Some(running) = self.running.as_mut()
            && let Some(tx) = running.shutdown_tx.take()
        {
            let _ = tx.send(());
        }
        tracing::info!("Polling deactivated");
    }

    /// Deactivates and waits for the polling task to exit.
    pub async fn shutdown(mut self) {
        self.deactivate();
        if let Some(running) = self.running.take()
            && let Err(e) = running.handle.await
        {
            tracing::warn!(error = %e, "polling task join failed");
        }
    }

    pub fn phase(&self) -> Phase {
        self.reader.phase()
    }

    pub fn view(&self) -> PollingView {
        self.reader.view()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollingView> {
        self.reader.subscribe()
    }

    pub fn reader(&self) -> StateReader {
        self.reader.clone()
    }
}

impl<S: TelemetrySource> Drop for Poller<S> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Ticks are serialised: the fetch is awaited inside the loop, so a new tick
/// never starts while one is in flight, and ticks missed meanwhile are skipped.
#[instrument(
    name = "poller",
    skip_all,
    fields(interval_ms = config.interval.as_millis() as u64)
)]
async fn run<S: TelemetrySource>(
    source: S,
    config: PollerConfig,
    reader: StateReader,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let start = if config.fire_on_start {
        Instant::now()
    } else {
        Instant::now() + config.interval
    };
    let mut tick = interval_at(start, config.interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(config.stats_log_interval);
    stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_no_receivers_log: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                // A result that is already in hand is handed to apply_tick, which
                // drops it if the poller was stopped meanwhile.
                let fetched = tokio::select! {
                    biased;
                    result = source.fetch_snapshot() => Some(result),
                    _ = &mut shutdown_rx => None,
                };
                let Some(result) = fetched else {
                    tracing::debug!("Poller shutting down with fetch in flight");
                    break;
                };
                let Some(view) = apply_tick(&reader, result) else {
                    break;
                };
                if reader.tx.send(view).is_err() {
                    let should_log = last_no_receivers_log
                        .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL);
                    if should_log {
                        tracing::debug!(
                            operation = "publish_view",
                            "No subscribers; view not broadcast"
                        );
                        last_no_receivers_log = Some(Instant::now());
                    }
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Poller shutting down");
                break;
            }
            _ = stats_log_tick.tick() => {
                tracing::info!(
                    ticks_succeeded = reader.counters.succeeded.load(Ordering::Relaxed),
                    ticks_failed = reader.counters.failed.load(Ordering::Relaxed),
                    subscribers = reader.tx.receiver_count(),
                    "poller stats"
                );
            }
        }
    }
}

/// Applies one fetch result under the state lock. Returns the resulting view,
/// or `None` if the poller was deactivated while the fetch was in flight.
fn apply_tick(
    reader: &StateReader,
    result: Result<TelemetrySnapshot, SourceError>,
) -> Option<PollingView> {
    let result = result.and_then(|snapshot| snapshot.validate().map(|()| snapshot));
    let mut inner = reader.lock();
    if inner.phase != Phase::Polling {
        reader.counters.discarded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Discarding fetch that resolved after deactivation");
        return None;
    }
    match result {
        Ok(snapshot) => {
            inner.state.apply_success(snapshot, now_ms());
            reader.counters.succeeded.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                operation = "fetch_snapshot",
                "telemetry tick failed"
            );
            inner.state.apply_failure(e.to_string());
            reader.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
    Some(inner.state.view(inner.phase))
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
        0
    })
}
