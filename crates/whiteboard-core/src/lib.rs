//! Whiteboard Core Library
//!
//! Board state and wire protocol for the shared whiteboard. No I/O happens here;
//! the server crate owns the transport and decides who receives what.

pub mod board;
pub mod model;
pub mod protocol;

pub use board::Board;
pub use model::{
    BoardState, Fields, MediaItem, MediaKind, MoveRequest, MoveTarget, Payload, Stroke,
    TextAnnotation,
};
pub use protocol::{CLEAR_DENIED_MESSAGE, ClearRequest, ClientEvent, DecodeError, ServerEvent};
