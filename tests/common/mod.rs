// Shared test helpers: scripted telemetry source and fixtures

#![allow(dead_code)]

use kinetika::error::SourceError;
use kinetika::models::TelemetrySnapshot;
use kinetika::poller::PollerConfig;
use kinetika::source::TelemetrySource;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::mpsc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn snapshot(speed: f64, battery: f64) -> TelemetrySnapshot {
    TelemetrySnapshot {
        speed,
        battery,
        current: 1.0,
        weight: 20.0,
        obstacle_detected: false,
        temperature: 25.0,
        gas_detected: false,
        lifting_status: false,
    }
}

pub fn test_poller_config(history_capacity: usize) -> PollerConfig {
    PollerConfig {
        interval: Duration::from_millis(2000),
        history_capacity,
        fire_on_start: true,
        broadcast_capacity: 32,
        stats_log_interval: Duration::from_secs(3600),
    }
}

/// Returns queued results in order, each after `delay`. Once the script runs
/// out every call fails. Tracks call count and peak concurrency.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Result<TelemetrySnapshot, SourceError>>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(
        steps: impl IntoIterator<Item = Result<TelemetrySnapshot, SourceError>>,
        delay: Duration,
    ) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Source that returns one good snapshot per battery value.
    pub fn batteries(values: &[f64], delay: Duration) -> Self {
        Self::new(values.iter().map(|b| Ok(snapshot(1.0, *b))), delay)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TelemetrySource for ScriptedSource {
    async fn fetch_snapshot(&self) -> Result<TelemetrySnapshot, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        tokio::time::sleep(self.delay).await;
        let step = self.steps.lock().unwrap().pop_front();
        step.unwrap_or_else(|| Err(SourceError::Unavailable("script exhausted".into())))
    }
}

/// Blocks inside `fetch_snapshot` until released, so a test can act while the
/// fetch is known to be mid-flight and then let it complete.
pub struct GatedSource {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
    value: TelemetrySnapshot,
}

pub struct Gate {
    pub entered: mpsc::Receiver<()>,
    pub release: mpsc::Sender<()>,
}

impl GatedSource {
    pub fn new(value: TelemetrySnapshot) -> (Self, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let source = Self {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            value,
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (source, gate)
    }
}

impl TelemetrySource for GatedSource {
    async fn fetch_snapshot(&self) -> Result<TelemetrySnapshot, SourceError> {
        let _ = self.entered.lock().unwrap().send(());
        // Blocks the worker thread on purpose: the fetch cannot observe shutdown.
        let released = self.release.lock().unwrap().recv();
        match released {
            Ok(()) => Ok(self.value),
            Err(_) => Err(SourceError::Unavailable("gate dropped".into())),
        }
    }
}
