//! Straight line shape.

use super::{Coords, point_to_segment_dist};
use crate::hit::{HitTolerance, Position, near_point};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A line segment from `(x1, y1)` to `(x2, y2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub coords: Coords,
}

impl Line {
    pub fn new(coords: Coords) -> Self {
        Self { coords }
    }

    /// Endpoints take precedence over the body so they stay grabbable.
    pub(crate) fn position_at(&self, point: Point, tolerance: &HitTolerance) -> Option<Position> {
        let radius = tolerance.handle_radius;
        if near_point(point, self.coords.start(), radius) {
            return Some(Position::Start);
        }
        if near_point(point, self.coords.end(), radius) {
            return Some(Position::End);
        }
        let dist = point_to_segment_dist(point, self.coords.start(), self.coords.end());
        (dist <= tolerance.line_tolerance).then_some(Position::Inside)
    }
}
