//! Renderer abstraction.
//!
//! The engine never paints. It hands a [`RenderFrame`] to whatever backend the
//! host plugs in.

use crate::shapes::{Element, ElementId, ElementList, SerializableColor, Shape};
use crate::viewport::Viewport;
use kurbo::{Affine, Point, Rect};
use peniko::Color;
use serde::Serialize;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    /// The live element snapshot.
    pub elements: &'a ElementList,
    pub viewport: &'a Viewport,
    /// Element being edited in the text overlay (skip it to avoid drawing it twice).
    pub editing: Option<ElementId>,
}

impl<'a> RenderFrame<'a> {
    /// Elements to paint, back to front.
    pub fn visible_elements(&self) -> impl Iterator<Item = &'a Element> + 'a {
        let editing = self.editing;
        self.elements.iter().filter(move |e| Some(e.id) != editing)
    }

    /// World-to-screen transform for this frame.
    pub fn transform(&self) -> Affine {
        self.viewport.transform()
    }
}

/// Trait for rendering backends.
pub trait SceneRenderer {
    /// Paint a frame.
    fn render(&mut self, frame: &RenderFrame<'_>) -> RenderResult<()>;

    /// Stroke color for elements without an override.
    fn default_color(&self) -> Color {
        Color::from_rgba8(0, 0, 0, 255)
    }
}

/// A backend-neutral draw command in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Polyline {
        points: Vec<Point>,
        width: f64,
        color: SerializableColor,
    },
    Rect {
        rect: Rect,
        width: f64,
        color: SerializableColor,
    },
    Text {
        origin: Point,
        text: String,
        color: SerializableColor,
    },
    /// Dashed marquee for a capture area.
    Marquee { rect: Rect },
}

/// Renderer that flattens a frame into [`DrawCommand`]s.
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    commands: Vec<DrawCommand>,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}

impl SceneRenderer for DisplayListRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) -> RenderResult<()> {
        let transform = frame.transform();
        let scale = frame.viewport.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RendererError::RenderFailed(format!("invalid scale {}", scale)));
        }
        let default = self.default_color();

        self.commands.clear();
        for element in frame.visible_elements() {
            let color = SerializableColor::from(element.style.color_or(default));
            let width = element.style.size * scale;
            let command = match &element.shape {
                Shape::Pencil(pencil) => DrawCommand::Polyline {
                    points: pencil.points.iter().map(|p| transform * p.point()).collect(),
                    width,
                    color,
                },
                Shape::Line(line) => DrawCommand::Polyline {
                    points: vec![transform * line.coords.start(), transform * line.coords.end()],
                    width,
                    color,
                },
                Shape::Rectangle(rect) => DrawCommand::Rect {
                    rect: transform.transform_rect_bbox(rect.coords.as_rect()),
                    width,
                    color,
                },
                Shape::Text(text) => DrawCommand::Text {
                    origin: transform * text.coords.start(),
                    text: text.text.clone(),
                    color,
                },
                Shape::Capture(area) => DrawCommand::Marquee {
                    rect: transform.transform_rect_bbox(area.coords.as_rect()),
                },
            };
            self.commands.push(command);
        }
        log::trace!("Built {} draw commands", self.commands.len());
        Ok(())
    }
}
