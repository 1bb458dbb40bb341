//! Element definitions for the whiteboard.

mod capture;
mod line;
mod pencil;
mod rectangle;
mod text;

pub use capture::Capture;
pub use line::Line;
pub use pencil::{Pencil, StrokePoint};
pub use rectangle::Rectangle;
pub use text::TextBox;

use crate::error::EngineError;
use crate::hit::{HitTolerance, Position};
use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke properties shared by every element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Stroke width (pencil, line, rectangle).
    pub size: f64,
    /// Optional color override.
    #[serde(default)]
    pub color: Option<SerializableColor>,
    /// Last known input pressure, 0..=1.
    pub pressure: f64,
}

impl ElementStyle {
    /// Resolve the stroke color against the host's default.
    pub fn color_or(&self, default: Color) -> Color {
        self.color.map(Color::from).unwrap_or(default)
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            size: crate::config::DEFAULT_PENCIL_SIZE,
            color: None,
            pressure: 1.0,
        }
    }
}

/// Stable element identifier.
///
/// Allocated from a monotonic counter and never reused, so it keeps naming
/// the same element after others are erased in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Pencil,
    Line,
    Rectangle,
    Text,
    Capture,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Pencil => "pencil",
            ElementKind::Line => "line",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Text => "text",
            ElementKind::Capture => "capture",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pencil" => Ok(ElementKind::Pencil),
            "line" => Ok(ElementKind::Line),
            "rectangle" => Ok(ElementKind::Rectangle),
            "text" => Ok(ElementKind::Text),
            "capture" => Ok(ElementKind::Capture),
            other => Err(EngineError::UnknownElementType(other.to_string())),
        }
    }
}

/// World-space bounding coordinates of a two-point element.
///
/// `(x1, y1)` is the anchor where drawing started; the pair is only ordered
/// after normalization (see [`crate::resize`]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Coords {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Signed extent along x.
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Signed extent along y.
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Ordered rectangle spanned by the two points.
    pub fn as_rect(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    /// Same extent, anchored at a new `(x1, y1)`.
    pub fn moved_to(&self, origin: Point) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + self.width(),
            origin.y + self.height(),
        )
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Geometry of an element, one variant per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Pencil(Pencil),
    Line(Line),
    Rectangle(Rectangle),
    Text(TextBox),
    Capture(Capture),
}

impl Shape {
    pub fn kind(&self) -> ElementKind {
        match self {
            Shape::Pencil(_) => ElementKind::Pencil,
            Shape::Line(_) => ElementKind::Line,
            Shape::Rectangle(_) => ElementKind::Rectangle,
            Shape::Text(_) => ElementKind::Text,
            Shape::Capture(_) => ElementKind::Capture,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Pencil(s) => s.bounds(),
            Shape::Line(s) => s.coords.as_rect(),
            Shape::Rectangle(s) => s.coords.as_rect(),
            Shape::Text(s) => s.coords.as_rect(),
            Shape::Capture(s) => s.coords.as_rect(),
        }
    }

    /// Two-point coordinates, for every kind except pencil.
    pub fn coords(&self) -> Option<Coords> {
        match self {
            Shape::Pencil(_) => None,
            Shape::Line(s) => Some(s.coords),
            Shape::Rectangle(s) => Some(s.coords),
            Shape::Text(s) => Some(s.coords),
            Shape::Capture(s) => Some(s.coords),
        }
    }

    /// Replace the two-point coordinates. Returns false for pencil strokes.
    pub fn set_coords(&mut self, coords: Coords) -> bool {
        match self {
            Shape::Pencil(_) => return false,
            Shape::Line(s) => s.coords = coords,
            Shape::Rectangle(s) => s.coords = coords,
            Shape::Text(s) => s.coords = coords,
            Shape::Capture(s) => s.coords = coords,
        }
        true
    }

    /// Which part of this shape, if any, lies under `point`.
    pub fn position_at(
        &self,
        point: Point,
        size: f64,
        tolerance: &HitTolerance,
    ) -> Option<Position> {
        match self {
            Shape::Pencil(s) => s.position_at(point, size, tolerance),
            Shape::Line(s) => s.position_at(point, tolerance),
            Shape::Rectangle(s) => s.position_at(point, tolerance),
            Shape::Text(s) => s.position_at(point),
            Shape::Capture(_) => None,
        }
    }
}

/// The atomic drawable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub shape: Shape,
    pub style: ElementStyle,
}

impl Element {
    /// Create an element of `kind` spanning `(x1, y1)-(x2, y2)`.
    ///
    /// Pencil strokes start with a single point at `(x1, y1)`; the second
    /// corner is ignored for them. Text starts with the given placeholder box
    /// and empty content.
    pub fn create(
        id: ElementId,
        kind: ElementKind,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        size: f64,
    ) -> Self {
        let coords = Coords::new(x1, y1, x2, y2);
        let style = ElementStyle {
            size,
            ..ElementStyle::default()
        };
        let shape = match kind {
            ElementKind::Pencil => {
                Shape::Pencil(Pencil::new(StrokePoint::new(x1, y1, style.pressure)))
            }
            ElementKind::Line => Shape::Line(Line::new(coords)),
            ElementKind::Rectangle => Shape::Rectangle(Rectangle::new(coords)),
            ElementKind::Text => Shape::Text(TextBox::new(coords)),
            ElementKind::Capture => Shape::Capture(Capture::new(coords)),
        };
        Self { id, shape, style }
    }

    /// Set the input pressure, including the anchor point of a fresh stroke.
    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.style.pressure = pressure;
        if let Shape::Pencil(pencil) = &mut self.shape {
            if pencil.points.len() == 1 {
                pencil.points[0].pressure = pressure;
            }
        }
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    pub fn coords(&self) -> Option<Coords> {
        self.shape.coords()
    }

    pub fn set_coords(&mut self, coords: Coords) -> bool {
        self.shape.set_coords(coords)
    }

    pub fn position_at(&self, point: Point, tolerance: &HitTolerance) -> Option<Position> {
        self.shape.position_at(point, self.style.size, tolerance)
    }

    pub fn as_text(&self) -> Option<&TextBox> {
        match &self.shape {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Ordered element collection, back to front.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementList {
    elements: Vec<Element>,
}

impl ElementList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Storage index of an element.
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Remove an element, keeping the order of the rest.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.position(id)?;
        Some(self.elements.remove(index))
    }

    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Largest element id present, if any.
    pub fn max_id(&self) -> Option<ElementId> {
        self.elements.iter().map(|e| e.id).max()
    }
}

impl<'a> IntoIterator for &'a ElementList {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl FromIterator<Element> for ElementList {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
