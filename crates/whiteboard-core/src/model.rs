//! Board items as they travel over the wire and sit in the store.
//!
//! Clients are trusted: each item is the JSON object the client sent, kept
//! verbatim so peers and late joiners see exactly what was drawn. The server
//! only reads the handful of fields it needs (`id`, `type`, `text`, `x`, `y`)
//! and ignores the shape of everything else.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A payload object exactly as the client sent it.
pub type Fields = Map<String, Value>;

/// Read access shared by every payload object.
pub trait Payload {
    fn fields(&self) -> &Fields;

    fn fields_mut(&mut self) -> &mut Fields;

    /// Client-chosen identifier. Any JSON value works (clients use both
    /// strings and timestamps); `null` counts as absent.
    fn id(&self) -> Option<&Value> {
        self.fields().get("id").filter(|v| !v.is_null())
    }

    /// Ids match by JSON value equality, so `1` and `"1"` are different items.
    fn has_id(&self, id: &Value) -> bool {
        self.id() == Some(id)
    }

    /// A numeric field, if present and a number.
    fn number(&self, key: &str) -> Option<f64> {
        self.fields().get(key).and_then(Value::as_f64)
    }

    /// A string field, if present and a string.
    fn string(&self, key: &str) -> Option<&str> {
        self.fields().get(key).and_then(Value::as_str)
    }
}

macro_rules! payload_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Fields);

        impl Payload for $name {
            fn fields(&self) -> &Fields {
                &self.0
            }

            fn fields_mut(&mut self) -> &mut Fields {
                &mut self.0
            }
        }

        impl From<Fields> for $name {
            fn from(fields: Fields) -> Self {
                Self(fields)
            }
        }

        impl From<$name> for Fields {
            fn from(payload: $name) -> Self {
                payload.0
            }
        }
    };
}

payload_type!(
    /// A single line segment drawn by a client, in world coordinates.
    Stroke
);

payload_type!(
    /// A text label placed on the board.
    TextAnnotation
);

payload_type!(
    /// An image or video dropped onto the board. `data` is the encoded payload
    /// (usually a data URL) sent inline with the event.
    MediaItem
);

payload_type!(
    /// Payload of `media_move`: reposition an existing text or media item.
    MoveRequest
);

fn object(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

fn point_of(value: Option<&Value>) -> Option<Point> {
    let value = value?;
    Some(Point::new(value.get("x")?.as_f64()?, value.get("y")?.as_f64()?))
}

impl Stroke {
    /// Create a fully specified stroke.
    pub fn new(from: Point, to: Point, size: f64, color: &str) -> Self {
        Self(object(json!({
            "from": { "x": from.x, "y": from.y },
            "to": { "x": to.x, "y": to.y },
            "size": size,
            "color": color,
        })))
    }

    pub fn start(&self) -> Option<Point> {
        point_of(self.0.get("from"))
    }

    pub fn end(&self) -> Option<Point> {
        point_of(self.0.get("to"))
    }
}

impl TextAnnotation {
    /// Create a text annotation at `(x, y)`.
    pub fn new(id: impl Into<Value>, text: &str, x: f64, y: f64) -> Self {
        Self(object(json!({ "id": id.into(), "text": text, "x": x, "y": y })))
    }

    pub fn text(&self) -> Option<&str> {
        self.string("text")
    }
}

/// Which media list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a `type` hint. Only the exact string `"image"` is an image;
    /// everything else, including a missing hint, is treated as video.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some("image") => MediaKind::Image,
            _ => MediaKind::Video,
        }
    }
}

impl MediaItem {
    /// Create a media item of the given `type` at `(x, y)`.
    pub fn new(id: impl Into<Value>, kind: &str, data: &str, x: f64, y: f64) -> Self {
        Self(object(json!({ "id": id.into(), "type": kind, "data": data, "x": x, "y": y })))
    }

    /// The list this item is filed under.
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_hint(self.string("type"))
    }
}

/// Where a move request looks for its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Texts,
    Media(MediaKind),
}

impl MoveRequest {
    /// Create a move request for a media item of the given `type`.
    pub fn media(id: impl Into<Value>, kind: &str, x: f64, y: f64) -> Self {
        Self(object(json!({ "id": id.into(), "type": kind, "x": x, "y": y })))
    }

    /// Create a move request for a text annotation.
    pub fn text(id: impl Into<Value>, text: &str, x: f64, y: f64) -> Self {
        Self(object(json!({ "id": id.into(), "text": text, "x": x, "y": y })))
    }

    /// A non-null `text` field wins over any `type` field.
    pub fn target(&self) -> MoveTarget {
        match self.0.get("text") {
            Some(text) if !text.is_null() => MoveTarget::Texts,
            _ => MoveTarget::Media(MediaKind::from_hint(self.string("type"))),
        }
    }

    /// Copy the coordinates this request carries onto `item`, as sent.
    pub fn apply_to(&self, item: &mut Fields) {
        for key in ["x", "y"] {
            if let Some(value) = self.0.get(key).filter(|v| !v.is_null()) {
                item.insert(key.to_string(), value.clone());
            }
        }
    }
}

/// The whole board: everything a newly connected client needs to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub strokes: Vec<Stroke>,
    pub texts: Vec<TextAnnotation>,
    pub images: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
}
