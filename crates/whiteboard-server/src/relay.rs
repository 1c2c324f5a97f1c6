//! Applies client events to the board and relays them.
//!
//! The board lock is held across apply and fan-out, so every client sees
//! events in the order the board applied them, and a new connection's `init`
//! snapshot is followed by exactly the events applied after it.

use axum::extract::ws::Utf8Bytes;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use whiteboard_core::{Board, BoardState, ClearRequest, ClientEvent, DecodeError, ServerEvent};

use crate::registry::{ConnectionId, Outbound, Registry};

pub struct Relay {
    board: Mutex<Board>,
    registry: Registry,
    clear_password: String,
}

impl Relay {
    pub fn new(clear_password: impl Into<String>) -> Self {
        Self {
            board: Mutex::new(Board::new()),
            registry: Registry::new(),
            clear_password: clear_password.into(),
        }
    }

    /// Admit a connection and queue the current board for it.
    pub async fn connect(&self) -> (ConnectionId, Outbound) {
        let board = self.board.lock().await;
        let (id, outbound) = self.registry.register();
        if let Some(frame) = encode(&ServerEvent::Init(board.snapshot())) {
            self.registry.send_to(id, frame);
        }
        debug!("Sent init to {} ({} items)", id, board.len());
        (id, outbound)
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.registry.unregister(id);
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub async fn snapshot(&self) -> BoardState {
        self.board.lock().await.snapshot()
    }

    /// Apply an event from `from` and relay it.
    ///
    /// Everything except `clear` goes to all other connections, whether or not
    /// the board changed. `clear` goes to everyone on success and only back to
    /// `from` on failure.
    pub async fn dispatch(&self, from: ConnectionId, event: ClientEvent) {
        // Relayed events share the client envelope, so the inbound event is
        // encoded as-is.
        let frame = match &event {
            ClientEvent::Clear(request) => return self.clear(from, request).await,
            relayed => match encode(relayed) {
                Some(frame) => frame,
                None => return,
            },
        };
        let name = event.name();

        let mut board = self.board.lock().await;
        match event {
            ClientEvent::Draw(stroke) => board.append_stroke(stroke),
            ClientEvent::TextAdd(text) => board.append_text(text),
            ClientEvent::TextMove(text) => {
                board.upsert_text(text);
            }
            ClientEvent::MediaAdd(item) => {
                let kind = board.append_media(item);
                debug!("{} added {:?} media", from, kind);
            }
            ClientEvent::MediaMove(request) => {
                board.move_item(&request);
            }
            ClientEvent::Clear(_) => return,
        }
        let delivered = self.registry.broadcast(&frame, Some(from));
        drop(board);

        debug!("Relayed {} from {} to {} peers", name, from, delivered);
    }

    /// Tell `from` its frame could not be decoded.
    pub fn reject(&self, from: ConnectionId, err: &DecodeError) {
        warn!("Invalid message from {}: {}", from, err);
        let reply = ServerEvent::Error {
            message: format!("Invalid message: {}", err),
        };
        if let Some(frame) = encode(&reply) {
            self.registry.send_to(from, frame);
        }
    }

    async fn clear(&self, from: ConnectionId, request: &ClearRequest) {
        if !request.is_authorized(&self.clear_password) {
            warn!("Rejected clear from {}", from);
            if let Some(frame) = encode(&ServerEvent::clear_denied()) {
                self.registry.send_to(from, frame);
            }
            return;
        }
        let Some(frame) = encode(&ServerEvent::Clear) else {
            return;
        };

        let mut board = self.board.lock().await;
        let removed = board.len();
        board.clear();
        self.registry.broadcast(&frame, None);
        drop(board);

        info!("Board cleared by {} ({} items removed)", from, removed);
    }
}

fn encode<T: Serialize>(event: &T) -> Option<Utf8Bytes> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json.into()),
        Err(e) => {
            error!("Failed to encode event: {}", e);
            None
        }
    }
}
