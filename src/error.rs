// Domain errors for the telemetry source and the poller lifecycle

use thiserror::Error;

/// Why a tick produced no usable snapshot. Every variant is treated as
/// "source unavailable" by the poller: the tick is dropped, the message is
/// surfaced through `error`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("telemetry source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed snapshot: {field} = {value} is out of range")]
    Malformed { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PollerError {
    /// A stopped poller cannot be restarted; build a new one.
    #[error("poller has been stopped and cannot be reactivated")]
    Stopped,
    #[error("invalid poller config: {0} must be non-zero")]
    InvalidConfig(&'static str),
}
