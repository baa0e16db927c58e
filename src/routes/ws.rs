// WebSocket dashboard sessions: one poller per connection, views streamed as they apply

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::PollingView;
use crate::poller::Poller;
use crate::source::TelemetrySource;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Counts open sessions: +1 on creation, -1 on drop.
struct WsSessionGuard(Arc<AtomicUsize>);

impl WsSessionGuard {
    fn open(sessions: Arc<AtomicUsize>) -> Self {
        let active = sessions.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(active_sessions = active, "Dashboard session opened");
        Self(sessions)
    }
}

impl Drop for WsSessionGuard {
    fn drop(&mut self) {
        let active = self.0.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        tracing::info!(active_sessions = active, "Dashboard session closed");
    }
}

pub(super) async fn ws_telemetry<S: TelemetrySource + Clone>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let source = state.source.clone();
    let poller_config = state.config.poller_config();
    let sessions = state.ws_sessions.clone();
    ws.on_upgrade(move |socket| async move {
        let _guard = WsSessionGuard::open(sessions);
        let mut poller = Poller::new(source, poller_config);
        // Subscribe before activating so the first tick cannot be missed.
        let mut rx = poller.subscribe();
        if let Err(e) = poller.activate() {
            tracing::warn!(error = %e, "Dashboard session poller failed to start");
            return;
        }
        let welcome = poller.view();
        if let Err(e) = stream_telemetry(socket, &mut rx, welcome).await {
            tracing::info!("Telemetry stream error: {}", e);
        }
        poller.shutdown().await;
    })
}

/// Sends `msg`, returning false if the client is gone or too slow.
async fn send_or_close(socket: &mut WebSocket, msg: Message) -> bool {
    matches!(timeout(WS_SEND_TIMEOUT, socket.send(msg)).await, Ok(Ok(())))
}

async fn stream_telemetry(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<PollingView>,
    welcome: PollingView,
) -> anyhow::Result<()> {
    let welcome = serde_json::json!({ "type": "state", "state": welcome });
    let welcome_json = serde_json::to_string(&welcome)?;
    if !send_or_close(&mut socket, Message::Text(welcome_json.into())).await {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(view) => {
                        let json = serde_json::to_string(&view)?;
                        if !send_or_close(&mut socket, Message::Text(json.into())).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/telemetry client lagged, skipped {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => {
                // Client close or transport error ends the session.
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = ping_interval.tick() => {
                if !send_or_close(&mut socket, Message::Ping(Bytes::new())).await {
                    break;
                }
            }
        }
    }
    Ok(())
}
