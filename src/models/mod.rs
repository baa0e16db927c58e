// Domain models: snapshot, rolling history, polling state, status badges

mod history;
mod snapshot;
mod state;
mod status;

pub use history::{DEFAULT_HISTORY_CAPACITY, RollingHistory};
pub use snapshot::TelemetrySnapshot;
pub use state::{Phase, PollingState, PollingView};
pub use status::{Badge, DEFAULT_TEMPERATURE_ALERT_CELSIUS, LiftingState, StatusReport};
