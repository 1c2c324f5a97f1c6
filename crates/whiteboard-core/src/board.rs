//! The board store: the single document every connection appends to.

use crate::model::{
    BoardState, MediaItem, MediaKind, MoveRequest, MoveTarget, Payload, Stroke, TextAnnotation,
};

/// In-memory board. Not synchronized; the owner serializes access.
#[derive(Debug, Default)]
pub struct Board {
    state: BoardState,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the full current state.
    pub fn snapshot(&self) -> BoardState {
        self.state.clone()
    }

    /// Borrow the current state without copying it.
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn append_stroke(&mut self, stroke: Stroke) {
        self.state.strokes.push(stroke);
    }

    pub fn append_text(&mut self, text: TextAnnotation) {
        self.state.texts.push(text);
    }

    /// Replace the first text whose `id` matches `text.id`.
    ///
    /// Returns `false` and leaves the board untouched when nothing matches.
    pub fn upsert_text(&mut self, text: TextAnnotation) -> bool {
        let Some(id) = text.id().cloned() else {
            return false;
        };
        match self.state.texts.iter_mut().find(|t| t.has_id(&id)) {
            Some(slot) => {
                *slot = text;
                true
            }
            None => {
                log::debug!("text_move for unknown id {id}");
                false
            }
        }
    }

    /// File a media item under images or videos according to its `type`.
    pub fn append_media(&mut self, item: MediaItem) -> MediaKind {
        let kind = item.media_kind();
        match kind {
            MediaKind::Image => self.state.images.push(item),
            MediaKind::Video => self.state.videos.push(item),
        }
        kind
    }

    /// Reposition an item. Only the list selected by [`MoveRequest::target`] is
    /// searched and only the coordinates present in the request are written.
    ///
    /// Returns `false` when no item in that list has the requested `id`.
    pub fn move_item(&mut self, request: &MoveRequest) -> bool {
        let Some(id) = request.id() else {
            return false;
        };
        let target = request.target();
        let item = match target {
            MoveTarget::Texts => self
                .state
                .texts
                .iter_mut()
                .find(|t| t.has_id(id))
                .map(|t| t.fields_mut()),
            MoveTarget::Media(kind) => self
                .media_mut(kind)
                .iter_mut()
                .find(|m| m.has_id(id))
                .map(|m| m.fields_mut()),
        };
        match item {
            Some(fields) => {
                request.apply_to(fields);
                true
            }
            None => {
                log::debug!("media_move for unknown id {id} in {target:?}");
                false
            }
        }
    }

    /// Empty every list.
    pub fn clear(&mut self) {
        self.state = BoardState::default();
    }

    /// Total number of items on the board.
    pub fn len(&self) -> usize {
        self.state.strokes.len()
            + self.state.texts.len()
            + self.state.images.len()
            + self.state.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn media_mut(&mut self, kind: MediaKind) -> &mut Vec<MediaItem> {
        match kind {
            MediaKind::Image => &mut self.state.images,
            MediaKind::Video => &mut self.state.videos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use serde_json::{Value, json};

    fn stroke(n: f64) -> Stroke {
        Stroke::new(Point::new(0.0, 0.0), Point::new(n, n), 2.0, "#000")
    }

    fn parse<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.snapshot(), BoardState::default());
    }

    #[test]
    fn test_appends_keep_arrival_order() {
        let mut board = Board::new();
        board.append_stroke(stroke(1.0));
        board.append_stroke(stroke(2.0));
        board.append_stroke(stroke(1.0));
        board.append_text(TextAnnotation::new("t1", "a", 0.0, 0.0));
        board.append_text(TextAnnotation::new("t1", "b", 0.0, 0.0));

        let snap = board.snapshot();
        assert_eq!(snap.strokes, vec![stroke(1.0), stroke(2.0), stroke(1.0)]);
        assert_eq!(snap.texts.len(), 2, "duplicate ids are not merged");
        assert_eq!(board.len(), 5);
    }

    #[test]
    fn test_oddly_typed_fields_are_stored() {
        let mut board = Board::new();
        let odd: Stroke = parse(json!({"size": "3", "color": 5}));
        board.append_stroke(odd.clone());
        assert_eq!(board.state().strokes, vec![odd]);
    }

    #[test]
    fn test_media_is_filed_by_type() {
        let mut board = Board::new();
        assert_eq!(
            board.append_media(MediaItem::new("v1", "video", "data:", 0.0, 0.0)),
            MediaKind::Video
        );
        assert_eq!(
            board.append_media(MediaItem::new("i1", "image", "data:", 0.0, 0.0)),
            MediaKind::Image
        );
        board.append_media(MediaItem::new("v2", "video", "data:", 0.0, 0.0));

        let snap = board.snapshot();
        assert!(snap.images.iter().all(|m| m.media_kind() == MediaKind::Image));
        assert!(snap.videos.iter().all(|m| m.media_kind() == MediaKind::Video));
        assert_eq!(snap.images.len(), 1);
        assert_eq!(snap.videos.len(), 2);
    }

    #[test]
    fn test_upsert_text_replaces_whole_record() {
        let mut board = Board::new();
        board.append_text(parse(json!({"id": "t1", "text": "hello", "x": 1, "y": 1, "color": "#f00"})));

        let replacement = TextAnnotation::new("t1", "hello", 5.0, 6.0);
        assert!(board.upsert_text(replacement.clone()));
        assert_eq!(board.state().texts, vec![replacement]);
    }

    #[test]
    fn test_upsert_text_with_numeric_id() {
        let mut board = Board::new();
        board.append_text(TextAnnotation::new(1697000000000u64, "hi", 0.0, 0.0));
        board.append_text(TextAnnotation::new("1697000000000", "other", 0.0, 0.0));

        let moved = TextAnnotation::new(1697000000000u64, "hi", 30.0, 40.0);
        assert!(board.upsert_text(moved.clone()));
        assert_eq!(board.state().texts[0], moved);
        assert_eq!(board.state().texts[1].text(), Some("other"));
    }

    #[test]
    fn test_upsert_text_only_touches_first_match() {
        let mut board = Board::new();
        board.append_text(TextAnnotation::new("t1", "a", 0.0, 0.0));
        board.append_text(TextAnnotation::new("t1", "b", 0.0, 0.0));

        assert!(board.upsert_text(TextAnnotation::new("t1", "c", 9.0, 9.0)));
        let texts = &board.state().texts;
        assert_eq!(texts[0].text(), Some("c"));
        assert_eq!(texts[1].text(), Some("b"));
    }

    #[test]
    fn test_upsert_text_miss_is_noop() {
        let mut board = Board::new();
        board.append_text(TextAnnotation::new("t1", "a", 0.0, 0.0));
        let before = board.snapshot();

        assert!(!board.upsert_text(TextAnnotation::new("nope", "x", 1.0, 1.0)));
        assert!(!board.upsert_text(TextAnnotation::default()));
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_move_media_updates_coordinates_only() {
        let mut board = Board::new();
        board.append_media(MediaItem::new("i1", "image", "data:x", 0.0, 0.0));

        assert!(board.move_item(&MoveRequest::media("i1", "image", 7.0, 8.0)));
        let item = &board.state().images[0];
        assert_eq!((item.number("x"), item.number("y")), (Some(7.0), Some(8.0)));
        assert_eq!(item.string("data"), Some("data:x"));
    }

    #[test]
    fn test_move_text_via_text_hint() {
        let mut board = Board::new();
        board.append_text(TextAnnotation::new("t1", "hi", 0.0, 0.0));

        let req: MoveRequest = parse(json!({"id": "t1", "type": "image", "text": "hi", "x": 3, "y": 4}));
        assert!(board.move_item(&req));
        assert_eq!(board.state().texts[0].number("x"), Some(3.0));
    }

    #[test]
    fn test_move_text_with_numeric_id() {
        let mut board = Board::new();
        board.append_text(TextAnnotation::new(1697000000000u64, "hi", 0.0, 0.0));

        assert!(board.move_item(&MoveRequest::text(1697000000000u64, "hi", 12.0, 13.0)));
        let text = &board.state().texts[0];
        assert_eq!((text.number("x"), text.number("y")), (Some(12.0), Some(13.0)));
    }

    #[test]
    fn test_text_hint_never_reaches_media_lists() {
        let mut board = Board::new();
        board.append_media(MediaItem::new("t1", "image", "data:", 0.0, 0.0));
        let before = board.snapshot();

        assert!(!board.move_item(&MoveRequest::text("t1", "hi", 5.0, 5.0)));
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_move_searches_declared_list_only() {
        let mut board = Board::new();
        board.append_media(MediaItem::new("m1", "image", "data:", 0.0, 0.0));
        let before = board.snapshot();

        // No type hint means video, so the image is not found.
        let req: MoveRequest = parse(json!({"id": "m1", "x": 1, "y": 1}));
        assert!(!board.move_item(&req));
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_move_with_partial_coordinates() {
        let mut board = Board::new();
        board.append_media(MediaItem::new("v1", "video", "data:", 1.0, 2.0));

        let req: MoveRequest = parse(json!({"id": "v1", "type": "video", "x": 10}));
        assert!(board.move_item(&req));
        let item = &board.state().videos[0];
        assert_eq!((item.number("x"), item.number("y")), (Some(10.0), Some(2.0)));
    }

    #[test]
    fn test_move_without_id_is_noop() {
        let mut board = Board::new();
        board.append_text(parse(json!({"text": "no id"})));
        let before = board.snapshot();

        let req: MoveRequest = parse(json!({"text": "no id", "x": 1}));
        assert!(!board.move_item(&req));
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut board = Board::new();
        board.append_stroke(stroke(1.0));
        board.append_text(TextAnnotation::new("t1", "a", 0.0, 0.0));
        board.append_media(MediaItem::new("i1", "image", "data:", 0.0, 0.0));
        board.append_media(MediaItem::new("v1", "video", "data:", 0.0, 0.0));

        board.clear();
        assert!(board.is_empty());
        assert_eq!(board.snapshot(), BoardState::default());
    }
}
