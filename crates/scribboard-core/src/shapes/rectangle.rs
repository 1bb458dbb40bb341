//! Rectangle shape.

use super::Coords;
use crate::hit::{HitTolerance, Position, near_point};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle. After normalization `(x1, y1)` is the
/// top-left corner and `(x2, y2)` the bottom-right one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub coords: Coords,
}

impl Rectangle {
    pub fn new(coords: Coords) -> Self {
        Self { coords }
    }

    pub fn corners(&self) -> [(Point, Position); 4] {
        let Coords { x1, y1, x2, y2 } = self.coords;
        [
            (Point::new(x1, y1), Position::TopLeft),
            (Point::new(x2, y1), Position::TopRight),
            (Point::new(x1, y2), Position::BottomLeft),
            (Point::new(x2, y2), Position::BottomRight),
        ]
    }

    /// Corners win over edges, edges over the interior.
    pub(crate) fn position_at(&self, point: Point, tolerance: &HitTolerance) -> Option<Position> {
        let radius = tolerance.handle_radius;
        if let Some((_, position)) = self
            .corners()
            .into_iter()
            .find(|(corner, _)| near_point(point, *corner, radius))
        {
            return Some(position);
        }

        let Coords { x1, y1, x2, y2 } = self.coords;
        let rect = self.coords.as_rect();
        let within_x = point.x >= rect.x0 && point.x <= rect.x1;
        let within_y = point.y >= rect.y0 && point.y <= rect.y1;
        if within_x && (point.y - y1).abs() < radius {
            return Some(Position::Top);
        }
        if within_x && (point.y - y2).abs() < radius {
            return Some(Position::Bottom);
        }
        if within_y && (point.x - x1).abs() < radius {
            return Some(Position::Left);
        }
        if within_y && (point.x - x2).abs() < radius {
            return Some(Position::Right);
        }

        (within_x && within_y).then_some(Position::Inside)
    }
}
