//! Whiteboard Relay Server
//!
//! Holds the one shared board in memory and relays every change to the other
//! connected clients.
//!
//! ## Endpoints
//!
//! - `GET /ws` upgrades to a WebSocket speaking the JSON envelopes from
//!   [`whiteboard_core::protocol`]. The new connection first receives
//!   `{"event":"init","data":<board>}`.
//! - `GET /health` answers `ok`.
//! - Anything else is served from the static directory.

pub mod config;
pub mod error;
pub mod registry;
pub mod relay;
pub mod server;

pub use config::Config;
pub use error::ServerError;
pub use registry::{ConnectionId, Registry};
pub use relay::Relay;
pub use server::{AppState, router, serve, serve_on};
