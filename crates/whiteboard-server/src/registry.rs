//! Live connections and fan-out.

use axum::extract::ws::Utf8Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Encoded frames queued for one connection.
pub type Outbound = mpsc::UnboundedReceiver<Utf8Bytes>;

/// Outbound queues of every connected client.
#[derive(Default)]
pub struct Registry {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Utf8Bytes>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new connection and hand back its queue.
    pub fn register(&self) -> (ConnectionId, Outbound) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(id, tx);
        (id, rx)
    }

    pub fn unregister(&self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Queue a frame for a single connection.
    pub fn send_to(&self, id: ConnectionId, frame: Utf8Bytes) -> bool {
        self.connections
            .get(&id)
            .is_some_and(|tx| tx.send(frame).is_ok())
    }

    /// Queue a frame for every connection except `exclude`.
    ///
    /// Returns how many queues accepted it. Queues whose socket task is gone
    /// are skipped.
    pub fn broadcast(&self, frame: &Utf8Bytes, exclude: Option<ConnectionId>) -> usize {
        self.connections
            .iter()
            .filter(|entry| Some(*entry.key()) != exclude)
            .filter(|entry| entry.value().send(frame.clone()).is_ok())
            .count()
    }
}
