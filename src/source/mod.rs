// Telemetry source boundary: anything that can produce one snapshot per call

mod mock;

pub use mock::{MockSource, MockSourceConfig};

use std::future::Future;
use std::sync::Arc;

use crate::error::SourceError;
use crate::models::TelemetrySnapshot;

/// One snapshot per call. Implementations must not retry internally; the
/// poller's interval is the retry cadence.
pub trait TelemetrySource: Send + Sync + 'static {
    fn fetch_snapshot(
        &self,
    ) -> impl Future<Output = Result<TelemetrySnapshot, SourceError>> + Send;
}

impl<S: TelemetrySource> TelemetrySource for Arc<S> {
    fn fetch_snapshot(
        &self,
    ) -> impl Future<Output = Result<TelemetrySnapshot, SourceError>> + Send {
        self.as_ref().fetch_snapshot()
    }
}
