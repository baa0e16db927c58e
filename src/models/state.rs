// Polling state owned by one dashboard session, and the view handed to readers

use serde::{Deserialize, Serialize};

use super::{RollingHistory, TelemetrySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Polling,
    Stopped,
}

/// Mutable state behind the poller. Only tick completions write to it.
#[derive(Debug, Clone)]
pub struct PollingState {
    current: Option<TelemetrySnapshot>,
    history: RollingHistory,
    loading: bool,
    error: Option<String>,
    ticks: u64,
}

impl PollingState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            current: None,
            history: RollingHistory::with_capacity(history_capacity),
            loading: true,
            error: None,
            ticks: 0,
        }
    }

    /// Successful tick: replace the current snapshot, clear the error, extend the history.
    pub fn apply_success(&mut self, snapshot: TelemetrySnapshot, timestamp_ms: u64) {
        self.loading = false;
        self.error = None;
        self.history.push(timestamp_ms, snapshot.speed, snapshot.battery);
        self.current = Some(snapshot);
        self.ticks += 1;
    }

    /// Failed tick: keep the last good snapshot and history, record the message.
    pub fn apply_failure(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
        self.ticks += 1;
    }

    pub fn current(&self) -> Option<&TelemetrySnapshot> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &RollingHistory {
        &self.history
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self, phase: Phase) -> PollingView {
        PollingView {
            phase,
            tick: self.ticks,
            loading: self.loading,
            error: self.error.clone(),
            current_snapshot: self.current,
            history: self.history.clone(),
        }
    }
}

/// Owned copy of the polling state taken under a single lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingView {
    pub phase: Phase,
    /// Number of ticks applied so far (successes and failures).
    pub tick: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub current_snapshot: Option<TelemetrySnapshot>,
    pub history: RollingHistory,
}
