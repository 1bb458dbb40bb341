//! Handle-driven resizing and coordinate normalization.

use crate::hit::Position;
use crate::shapes::{Coords, Element, ElementKind, Shape};
use kurbo::Point;

/// Coordinates after dragging the handle at `position` to `point`.
///
/// The corner or edge opposite the handle stays where it is; edge handles
/// move a single axis.
pub fn resized_coordinates(point: Point, position: Position, coords: Coords) -> Coords {
    let Coords { x1, y1, x2, y2 } = coords;
    let (x, y) = (point.x, point.y);
    match position {
        Position::TopLeft | Position::Start => Coords::new(x, y, x2, y2),
        Position::TopRight => Coords::new(x1, y, x, y2),
        Position::BottomLeft => Coords::new(x, y1, x2, y),
        Position::BottomRight | Position::End => Coords::new(x1, y1, x, y),
        Position::Top => Coords::new(x1, y, x2, y2),
        Position::Bottom => Coords::new(x1, y1, x2, y),
        Position::Left => Coords::new(x, y1, x2, y2),
        Position::Right => Coords::new(x1, y1, x, y2),
        Position::Inside => coords,
    }
}

/// Whether elements of `kind` need their coordinates reordered after an edit.
pub fn adjustment_required(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::Line | ElementKind::Rectangle)
}

/// Rectangle order: `(x1, y1)` is the minimum corner.
pub fn normalize_rectangle(coords: Coords) -> Coords {
    let Coords { x1, y1, x2, y2 } = coords;
    Coords::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

/// Line order: the endpoint with the smaller x (then smaller y) comes first.
pub fn normalize_line(coords: Coords) -> Coords {
    let Coords { x1, y1, x2, y2 } = coords;
    if x1 < x2 || (x1 == x2 && y1 <= y2) {
        coords
    } else {
        Coords::new(x2, y2, x1, y1)
    }
}

/// Normalized coordinates for an element, or None when its kind has no
/// axis order to enforce.
pub fn adjust_element_coordinates(element: &Element) -> Option<Coords> {
    match &element.shape {
        Shape::Rectangle(r) => Some(normalize_rectangle(r.coords)),
        Shape::Line(l) => Some(normalize_line(l.coords)),
        Shape::Pencil(_) | Shape::Text(_) | Shape::Capture(_) => None,
    }
}
