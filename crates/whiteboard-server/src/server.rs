//! HTTP surface: WebSocket endpoint, health check and static files.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use whiteboard_core::ClientEvent;

use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::relay::Relay;

/// Shared application state
pub struct AppState {
    pub relay: Relay,
    static_dir: PathBuf,
    max_message_size: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            relay: Relay::new(config.clear_password.clone()),
            static_dir: config.static_dir.clone(),
            max_message_size: config.max_message_size,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: Config) -> ServerResult<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    let state = Arc::new(AppState::new(&config));
    serve_on(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> ServerResult<()> {
    let addr = listener.local_addr()?;
    info!("Whiteboard server listening on {}", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);
    info!("Serving static files from {}", state.static_dir.display());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.max_message_size(state.max_message_size)
        .max_frame_size(state.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let relay = &state.relay;
    let (id, mut outbound) = relay.connect().await;
    info!("New connection: {} ({} connected)", id, relay.connection_count());

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            // Handle incoming messages from client
            msg = receiver.next() => {
                let decoded = match msg {
                    Some(Ok(Message::Text(text))) => ClientEvent::from_json(text.as_str()),
                    Some(Ok(Message::Binary(data))) => ClientEvent::from_slice(&data),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue, // Ignore ping/pong
                    Some(Err(e)) => {
                        // Includes frames over the size limit.
                        warn!("WebSocket error for {}: {}", id, e);
                        break;
                    }
                };
                match decoded {
                    Ok(event) => relay.dispatch(id, event).await,
                    Err(e) => relay.reject(id, &e),
                }
            }

            // Frames queued for this client by the relay
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if sender.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        }
    }

    relay.disconnect(id);
    info!("Connection closed: {} ({} connected)", id, relay.connection_count());
}
