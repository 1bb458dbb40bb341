//! Freehand pencil stroke.

use super::point_to_segment_dist;
use crate::hit::{HitTolerance, Position};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A sampled stroke point with its input pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A freehand drawing (series of points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PencilRepr")]
pub struct Pencil {
    /// Never empty; the first point is the stroke anchor.
    pub points: Vec<StrokePoint>,
}

/// Wire form of [`Pencil`], checked on the way in.
#[derive(Deserialize)]
struct PencilRepr {
    points: Vec<StrokePoint>,
}

impl TryFrom<PencilRepr> for Pencil {
    type Error = String;

    fn try_from(repr: PencilRepr) -> Result<Self, Self::Error> {
        if repr.points.is_empty() {
            return Err("pencil stroke has no points".to_string());
        }
        Ok(Self { points: repr.points })
    }
}

impl Pencil {
    /// Start a stroke at `anchor`.
    pub fn new(anchor: StrokePoint) -> Self {
        Self {
            points: vec![anchor],
        }
    }

    pub fn anchor(&self) -> Option<StrokePoint> {
        self.points.first().copied()
    }

    /// Add a point to the stroke.
    pub fn push_point(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Bounding box of the sampled points. Zero-sized at the origin if empty.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.anchor() else {
            return Rect::ZERO;
        };
        let first = first.point();
        self.points
            .iter()
            .skip(1)
            .fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p.point()))
    }

    /// A stroke is hit anywhere within half its width of the polyline.
    pub(crate) fn position_at(
        &self,
        point: Point,
        size: f64,
        tolerance: &HitTolerance,
    ) -> Option<Position> {
        let threshold = (size / 2.0).max(tolerance.line_tolerance);
        let hit = match self.points.as_slice() {
            [] => false,
            [only] => point.distance(only.point()) <= threshold,
            points => points
                .windows(2)
                .any(|w| point_to_segment_dist(point, w[0].point(), w[1].point()) <= threshold),
        };
        hit.then_some(Position::Inside)
    }
}
