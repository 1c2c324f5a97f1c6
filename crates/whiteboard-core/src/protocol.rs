//! Wire protocol between clients and the relay server.
//!
//! Every frame is a JSON envelope naming the event and carrying its payload:
//! ```json
//! { "event": "draw", "data": { "from": {"x": 0, "y": 0}, "to": {"x": 10, "y": 10}, "size": 2, "color": "#000" } }
//! { "event": "media_move", "data": { "id": "m1", "type": "image", "x": 5, "y": 5 } }
//! { "event": "clear", "data": { "password": "..." } }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{BoardState, MediaItem, MoveRequest, Stroke, TextAnnotation};

/// Sent privately to a client whose `clear` was rejected.
pub const CLEAR_DENIED_MESSAGE: &str = "Wrong password";

/// Errors decoding an inbound frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
    #[error("Invalid {event} payload: {source}")]
    Payload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Payload of `clear`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClearRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ClearRequest {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
        }
    }

    /// Never fails: anything other than an object with a string `password`
    /// becomes a request without a password.
    fn from_value(data: &Value) -> Self {
        Self {
            password: data
                .get("password")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }

    /// Constant-time comparison against the configured secret.
    pub fn is_authorized(&self, secret: &str) -> bool {
        let Some(password) = self.password.as_deref() else {
            return false;
        };
        let (a, b) = (password.as_bytes(), secret.as_bytes());
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

/// An event received from a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A new stroke.
    Draw(Stroke),
    /// A new text annotation.
    TextAdd(TextAnnotation),
    /// Replace an existing text annotation wholesale.
    TextMove(TextAnnotation),
    /// A new image or video.
    MediaAdd(MediaItem),
    /// Reposition an existing text or media item.
    MediaMove(MoveRequest),
    /// Wipe the board, gated by the admin secret.
    Clear(ClearRequest),
}

impl ClientEvent {
    /// Decode a text frame.
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        Self::from_envelope(serde_json::from_str(text)?)
    }

    /// Decode a binary frame holding the same JSON envelope.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_envelope(serde_json::from_slice(bytes)?)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self, DecodeError> {
        let Envelope { event, data } = envelope;
        // A missing payload decodes like an empty one.
        let data = if data.is_null() {
            Value::Object(Map::new())
        } else {
            data
        };
        match event.as_str() {
            "draw" => Ok(Self::Draw(payload("draw", data)?)),
            "text_add" => Ok(Self::TextAdd(payload("text_add", data)?)),
            "text_move" => Ok(Self::TextMove(payload("text_move", data)?)),
            "media_add" => Ok(Self::MediaAdd(payload("media_add", data)?)),
            "media_move" => Ok(Self::MediaMove(payload("media_move", data)?)),
            "clear" => Ok(Self::Clear(ClearRequest::from_value(&data))),
            other => Err(DecodeError::UnknownEvent(other.to_string())),
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draw(_) => "draw",
            Self::TextAdd(_) => "text_add",
            Self::TextMove(_) => "text_move",
            Self::MediaAdd(_) => "media_add",
            Self::MediaMove(_) => "media_move",
            Self::Clear(_) => "clear",
        }
    }
}

fn payload<T: DeserializeOwned>(event: &'static str, data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload { event, source })
}

/// An event sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full board, sent once right after connecting.
    Init(BoardState),
    Draw(Stroke),
    TextAdd(TextAnnotation),
    TextMove(TextAnnotation),
    MediaAdd(MediaItem),
    MediaMove(MoveRequest),
    /// The board was wiped.
    Clear,
    /// The requester's `clear` was rejected.
    ClearDenied { msg: String },
    /// The requester sent a frame that could not be decoded.
    Error { message: String },
}

impl ServerEvent {
    pub fn clear_denied() -> Self {
        Self::ClearDenied {
            msg: CLEAR_DENIED_MESSAGE.to_string(),
        }
    }

    /// Serialize to a text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
