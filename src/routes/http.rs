// GET handlers: version, polling state, status badges, session count

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::atomic::Ordering;

use super::AppState;
use crate::models::StatusReport;
use crate::source::TelemetrySource;

/// Package name and version from Cargo.toml at build time.
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /version — returns service name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/state — consistent copy of current snapshot, flags and history.
pub(super) async fn state_handler<S: TelemetrySource + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    axum::Json(state.reader.view())
}

/// GET /api/status — badges for the latest snapshot; 503 until one has arrived.
pub(super) async fn status_handler<S: TelemetrySource + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let view = state.reader.view();
    match view.current_snapshot {
        Some(snapshot) => {
            let report = StatusReport::from_snapshot(
                &snapshot,
                state.config.status.temperature_alert_celsius,
            );
            (StatusCode::OK, axum::Json(serde_json::json!(report)))
        }
        None => {
            let message = view
                .error
                .unwrap_or_else(|| "no telemetry received yet".to_string());
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(serde_json::json!({ "error": message })),
            )
        }
    }
}

/// GET /api/sessions — number of open /ws/telemetry dashboard sessions.
pub(super) async fn sessions_handler<S: TelemetrySource + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "active": state.ws_sessions.load(Ordering::Relaxed),
    }))
}
