//! Viewport module for pan/zoom transforms.

use crate::config::EngineConfig;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Viewport manages the view transform for the canvas.
///
/// Zoom is centred on the drawing surface: `scale_offset` shifts the scaled
/// surface back so its centre stays put. The paint-time transform is
/// `translate(pan * scale - scale_offset) * scale(scale)`, and input points are
/// mapped through its exact inverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current pan, in world units.
    pub pan_offset: Vec2,
    /// Current zoom level.
    pub scale: f64,
    /// Centering correction, recomputed from `surface` and `scale`.
    pub scale_offset: Vec2,
    /// Size of the drawing surface in screen pixels.
    pub surface: Size,
    /// Minimum allowed zoom level
    pub min_scale: f64,
    /// Maximum allowed zoom level
    pub max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Viewport {
    /// Create a viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut viewport = Self {
            pan_offset: Vec2::ZERO,
            scale: 1.0,
            scale_offset: Vec2::ZERO,
            surface: Size::new(config.surface_width, config.surface_height),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        };
        viewport.recompute_scale_offset();
        viewport
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan_offset * self.scale - self.scale_offset)
            * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling (screen to world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale)
            * Affine::translate(self.scale_offset - self.pan_offset * self.scale)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_offset.x * self.scale + self.scale_offset.x) / self.scale,
            (screen.y - self.pan_offset.y * self.scale + self.scale_offset.y) / self.scale,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.pan_offset.x * self.scale - self.scale_offset.x,
            world.y * self.scale + self.pan_offset.y * self.scale - self.scale_offset.y,
        )
    }

    /// Screen position for the text-entry overlay of a box anchored at `world`.
    pub fn text_overlay_origin(&self, world: Point) -> Point {
        self.world_to_screen(Point::new(world.x, world.y - 2.0))
    }

    /// Recompute the centering offset after a surface or scale change.
    pub fn recompute_scale_offset(&mut self) {
        let scaled = self.surface * self.scale;
        self.scale_offset = Vec2::new(
            (scaled.width - self.surface.width) / 2.0,
            (scaled.height - self.surface.height) / 2.0,
        );
    }

    /// The drawing surface changed size.
    pub fn resize_surface(&mut self, surface: Size) {
        self.surface = surface;
        self.recompute_scale_offset();
    }

    /// Set the zoom level, clamped to the allowed range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(self.min_scale, self.max_scale);
        self.recompute_scale_offset();
    }

    /// Step the zoom level by `delta`. Returns false when already at the limit.
    pub fn zoom(&mut self, delta: f64) -> bool {
        let previous = self.scale;
        self.set_scale(self.scale + delta);
        (self.scale - previous).abs() > 1e-12
    }

    /// Reset zoom to 100%.
    pub fn reset_zoom(&mut self) {
        self.set_scale(1.0);
    }

    /// Scroll the view by a wheel delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_offset -= delta;
    }

    /// Zoom level as a whole percentage, for display.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }
}
