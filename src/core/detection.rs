use serde::{Deserialize, Serialize};

/// Game a detection run is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Game {
    Poker,
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poker => write!(f, "POKER"),
        }
    }
}

/// A detected region in fractional image coordinates with a card code label.
///
/// Coordinates are fractions of the frame size in `[0, 1]`; the label is a
/// two-character card code such as `AS` (ace of spades).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub label: String,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            w,
            h,
            label: label.into(),
        }
    }
}

/// Note attached to table-read responses
pub const TABLE_READ_NOTE: &str = "mocked results";

/// Note attached to inline analysis responses
pub const PARTIAL_READ_NOTE: &str = "from cv_service (mocked)";

/// The canned full-table read: two hole cards and three community cards.
///
/// These are literal constants with no relation to any submitted image; they
/// exist so the frontend can exercise its rendering before a real detector
/// lands. Output never varies by input.
#[must_use]
pub fn table_read_boxes() -> Vec<BoundingBox> {
    vec![
        BoundingBox::new(0.1, 0.6, 0.12, 0.2, "AS"),
        BoundingBox::new(0.25, 0.6, 0.12, 0.2, "KH"),
        BoundingBox::new(0.45, 0.5, 0.12, 0.2, "7D"),
        BoundingBox::new(0.6, 0.5, 0.12, 0.2, "2C"),
        BoundingBox::new(0.75, 0.5, 0.12, 0.2, "9S"),
    ]
}

/// The shorter canned read returned by inline analysis.
#[must_use]
pub fn partial_read_boxes() -> Vec<BoundingBox> {
    vec![
        BoundingBox::new(0.1, 0.6, 0.12, 0.2, "AS"),
        BoundingBox::new(0.25, 0.6, 0.12, 0.2, "KH"),
        BoundingBox::new(0.45, 0.5, 0.12, 0.2, "7D"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_read_is_fixed() {
        let boxes = table_read_boxes();
        assert_eq!(boxes.len(), 5);

        let labels: Vec<&str> = boxes.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["AS", "KH", "7D", "2C", "9S"]);

        assert_eq!(boxes[0].x, 0.1);
        assert_eq!(boxes[0].y, 0.6);
        assert_eq!(boxes[4].x, 0.75);
        assert_eq!(boxes[4].y, 0.5);

        // Two calls return the same literals
        assert_eq!(boxes, table_read_boxes());
    }

    #[test]
    fn test_partial_read_prefix_of_table_read() {
        let partial = partial_read_boxes();
        assert_eq!(partial.len(), 3);
        assert_eq!(partial[..], table_read_boxes()[..3]);
    }

    #[test]
    fn test_boxes_within_unit_square() {
        for b in table_read_boxes() {
            assert!((0.0..=1.0).contains(&b.x));
            assert!((0.0..=1.0).contains(&b.y));
            assert!(b.x + b.w <= 1.0);
            assert!(b.y + b.h <= 1.0);
        }
    }

    #[test]
    fn test_game_serialization() {
        assert_eq!(serde_json::to_string(&Game::Poker).unwrap(), "\"POKER\"");
        assert_eq!(Game::Poker.to_string(), "POKER");
    }

    #[test]
    fn test_bounding_box_serialization() {
        let json = serde_json::to_value(BoundingBox::new(0.1, 0.6, 0.12, 0.2, "AS")).unwrap();
        assert_eq!(json["x"], 0.1);
        assert_eq!(json["y"], 0.6);
        assert_eq!(json["w"], 0.12);
        assert_eq!(json["h"], 0.2);
        assert_eq!(json["label"], "AS");
    }
}
