//! Text shape.

use super::Coords;
use crate::hit::Position;
use crate::text::TextMeasure;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A single-line text label.
///
/// The box is measured once, on the first commit of its content, and is not
/// recomputed when the text is edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub coords: Coords,
    #[serde(default)]
    pub text: String,
    /// Whether the box has been measured yet.
    #[serde(default)]
    pub measured: bool,
}

impl TextBox {
    /// Create a text box with a placeholder extent.
    pub fn new(coords: Coords) -> Self {
        Self {
            coords,
            text: String::new(),
            measured: false,
        }
    }

    /// Replace the content. The first call fixes the box from `metrics`.
    pub fn set_text(&mut self, text: &str, metrics: &dyn TextMeasure) {
        self.text = text.to_string();
        if !self.measured {
            let Coords { x1, y1, .. } = self.coords;
            self.coords = Coords::new(x1, y1, x1 + metrics.width(text), y1 + metrics.line_height());
            self.measured = true;
        }
    }

    pub(crate) fn position_at(&self, point: Point) -> Option<Position> {
        let rect = self.coords.as_rect();
        let inside =
            point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1;
        inside.then_some(Position::Inside)
    }
}
