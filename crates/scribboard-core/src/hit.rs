//! Hit-testing and cursor resolution.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::shapes::{ElementId, ElementList};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Part of an element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "inside")]
    Inside,
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "end")]
    End,
    #[serde(rename = "t")]
    Top,
    #[serde(rename = "b")]
    Bottom,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Inside => "inside",
            Position::TopLeft => "tl",
            Position::TopRight => "tr",
            Position::BottomLeft => "bl",
            Position::BottomRight => "br",
            Position::Start => "start",
            Position::End => "end",
            Position::Top => "t",
            Position::Bottom => "b",
            Position::Left => "l",
            Position::Right => "r",
        }
    }

    /// Whether grabbing here moves the element rather than resizing it.
    pub fn is_body(self) -> bool {
        self == Position::Inside
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inside" => Ok(Position::Inside),
            "tl" => Ok(Position::TopLeft),
            "tr" => Ok(Position::TopRight),
            "bl" => Ok(Position::BottomLeft),
            "br" => Ok(Position::BottomRight),
            "start" => Ok(Position::Start),
            "end" => Ok(Position::End),
            "t" => Ok(Position::Top),
            "b" => Ok(Position::Bottom),
            "l" => Ok(Position::Left),
            "r" => Ok(Position::Right),
            other => Err(EngineError::UnknownPosition(other.to_string())),
        }
    }
}

/// Hit radii in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    /// Box half-size around handles (corners, edges, endpoints).
    pub handle_radius: f64,
    /// Perpendicular distance for line bodies.
    pub line_tolerance: f64,
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self {
            handle_radius: crate::config::DEFAULT_HANDLE_RADIUS,
            line_tolerance: crate::config::DEFAULT_LINE_TOLERANCE,
        }
    }
}

impl From<&EngineConfig> for HitTolerance {
    fn from(config: &EngineConfig) -> Self {
        Self {
            handle_radius: config.handle_radius,
            line_tolerance: config.line_tolerance,
        }
    }
}

/// Whether `point` falls in the square of half-size `radius` around `target`.
pub(crate) fn near_point(point: Point, target: Point, radius: f64) -> bool {
    (point.x - target.x).abs() < radius && (point.y - target.y).abs() < radius
}

/// Result of a successful hit-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: ElementId,
    pub position: Position,
}

/// Find the topmost element under `point` (world coordinates).
///
/// Elements are scanned back to front of the draw order, so the one painted
/// last wins on overlap.
pub fn element_at_position(
    point: Point,
    elements: &ElementList,
    tolerance: &HitTolerance,
) -> Option<Hit> {
    elements.iter().rev().find_map(|element| {
        element.position_at(point, tolerance).map(|position| Hit {
            id: element.id,
            position,
        })
    })
}

/// Pointer cursor shown for a hover position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Move,
    NwseResize,
    NeswResize,
    NsResize,
    EwResize,
}

impl Cursor {
    /// CSS cursor name.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Move => "move",
            Cursor::NwseResize => "nwse-resize",
            Cursor::NeswResize => "nesw-resize",
            Cursor::NsResize => "ns-resize",
            Cursor::EwResize => "ew-resize",
        }
    }
}

/// Map a hit position to the cursor that advertises what dragging does.
pub fn cursor_for_position(position: Option<Position>) -> Cursor {
    match position {
        None => Cursor::Default,
        Some(Position::TopLeft | Position::BottomRight | Position::Start | Position::End) => {
            Cursor::NwseResize
        }
        Some(Position::TopRight | Position::BottomLeft) => Cursor::NeswResize,
        Some(Position::Top | Position::Bottom) => Cursor::NsResize,
        Some(Position::Left | Position::Right) => Cursor::EwResize,
        Some(Position::Inside) => Cursor::Move,
    }
}

/// Like [`cursor_for_position`] for untyped tokens; unknown input gets the
/// default cursor.
pub fn cursor_for_token(token: &str) -> Cursor {
    match token.parse::<Position>() {
        Ok(position) => cursor_for_position(Some(position)),
        Err(_) => Cursor::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Element, ElementKind};

    fn rect(id: u64, x1: f64, y1: f64, x2: f64, y2: f64) -> Element {
        Element::create(ElementId(id), ElementKind::Rectangle, x1, y1, x2, y2, 2.0)
    }

    #[test]
    fn test_topmost_wins() {
        let mut list = ElementList::new();
        list.push(rect(0, 0.0, 0.0, 100.0, 100.0));
        list.push(rect(1, 50.0, 50.0, 150.0, 150.0));

        let tolerance = HitTolerance::default();
        let hit = element_at_position(Point::new(75.0, 75.0), &list, &tolerance).unwrap();
        assert_eq!(hit.id, ElementId(1));
        assert_eq!(hit.position, Position::Inside);

        let hit = element_at_position(Point::new(25.0, 25.0), &list, &tolerance).unwrap();
        assert_eq!(hit.id, ElementId(0));
    }

    #[test]
    fn test_miss_returns_none() {
        let mut list = ElementList::new();
        list.push(rect(0, 0.0, 0.0, 10.0, 10.0));
        let tolerance = HitTolerance::default();
        assert!(element_at_position(Point::new(500.0, 500.0), &list, &tolerance).is_none());
        assert!(element_at_position(Point::ZERO, &ElementList::new(), &tolerance).is_none());
    }

    #[test]
    fn test_tl_handle_two_px_outside_stroke() {
        let mut list = ElementList::new();
        list.push(rect(0, 10.0, 10.0, 60.0, 60.0));
        let tolerance = HitTolerance {
            handle_radius: 6.0,
            line_tolerance: 1.0,
        };
        // Stroke width 2 puts its outer edge at 9; 2px beyond that is 7.
        let hit = element_at_position(Point::new(7.0, 7.0), &list, &tolerance).unwrap();
        assert_eq!(hit.position, Position::TopLeft);
    }

    #[test]
    fn test_capture_is_not_hittable() {
        let mut list = ElementList::new();
        list.push(Element::create(ElementId(0), ElementKind::Capture, 0.0, 0.0, 100.0, 100.0, 1.0));
        let tolerance = HitTolerance::default();
        assert!(element_at_position(Point::new(50.0, 50.0), &list, &tolerance).is_none());
    }

    #[test]
    fn test_cursor_mapping() {
        assert_eq!(cursor_for_position(Some(Position::TopLeft)), Cursor::NwseResize);
        assert_eq!(cursor_for_position(Some(Position::End)), Cursor::NwseResize);
        assert_eq!(cursor_for_position(Some(Position::TopRight)), Cursor::NeswResize);
        assert_eq!(cursor_for_position(Some(Position::Top)), Cursor::NsResize);
        assert_eq!(cursor_for_position(Some(Position::Right)), Cursor::EwResize);
        assert_eq!(cursor_for_position(Some(Position::Inside)), Cursor::Move);
        assert_eq!(cursor_for_position(None), Cursor::Default);
    }

    #[test]
    fn test_cursor_for_unknown_token() {
        assert_eq!(cursor_for_token("bl"), Cursor::NeswResize);
        assert_eq!(cursor_for_token("sideways"), Cursor::Default);
        assert_eq!(cursor_for_token(""), Cursor::Default);
    }

    #[test]
    fn test_position_tokens_roundtrip() {
        for token in ["inside", "tl", "tr", "bl", "br", "start", "end", "t", "b", "l", "r"] {
            let position: Position = token.parse().unwrap();
            assert_eq!(position.as_str(), token);
        }
    }
}
