// HTTP + WebSocket routes
//
// The HTTP endpoints read the service session owned by the binary. Every
// /ws/telemetry connection is its own dashboard session with a private poller.

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::poller::StateReader;
use crate::source::TelemetrySource;

#[derive(Clone)]
pub(crate) struct AppState<S> {
    pub(crate) reader: StateReader,
    /// Cloned into a fresh poller for each WebSocket session.
    pub(crate) source: S,
    pub(crate) ws_sessions: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app<S>(
    reader: StateReader,
    source: S,
    ws_sessions: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router
where
    S: TelemetrySource + Clone,
{
    let state = AppState {
        reader,
        source,
        ws_sessions,
        config,
    };
    Router::new()
        .route("/", get(|| async { "KINETIKA robot dashboard" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/state", get(http::state_handler::<S>)) // GET /api/state
        .route("/api/status", get(http::status_handler::<S>)) // GET /api/status
        .route("/api/sessions", get(http::sessions_handler::<S>)) // GET /api/sessions
        .route("/ws/telemetry", get(ws::ws_telemetry::<S>)) // WS /ws/telemetry
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
