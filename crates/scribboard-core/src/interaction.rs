//! Pointer-driven interaction state machine.
//!
//! [`Whiteboard`] owns everything an input host needs to drive the scene:
//! the history of element snapshots, the viewport, the active tool and the
//! in-flight action. Hosts feed it screen-space pointer, keyboard and wheel
//! events and read the live snapshot back for painting.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::history::{CommitMode, History};
use crate::hit::{Cursor, HitTolerance, Position, cursor_for_position, element_at_position};
use crate::regions::{RegionDetector, RegionError, RegionExporter, RegionInput};
use crate::render::RenderFrame;
use crate::resize::{adjust_element_coordinates, adjustment_required, resized_coordinates};
use crate::shapes::{Coords, Element, ElementId, ElementKind, ElementList, Shape, StrokePoint};
use crate::storage::SceneDocument;
use crate::text::{MonospaceMetrics, TextMeasure};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Key token for the space bar, as reported by web-style hosts.
pub const SPACE_KEY: &str = " ";

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    None,
    Drawing,
    Moving,
    Resizing,
    Panning,
    Erasing,
    Writing,
}

/// The active toolbar tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Selection,
    Pencil,
    Line,
    #[default]
    Rectangle,
    Text,
    Eraser,
    Capture,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Selection,
        Tool::Pencil,
        Tool::Line,
        Tool::Rectangle,
        Tool::Text,
        Tool::Eraser,
        Tool::Capture,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Selection => "selection",
            Tool::Pencil => "pencil",
            Tool::Line => "line",
            Tool::Rectangle => "rectangle",
            Tool::Text => "text",
            Tool::Eraser => "eraser",
            Tool::Capture => "capture",
        }
    }

    /// Kind of element this tool creates on pointer-down, if any.
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            Tool::Pencil => Some(ElementKind::Pencil),
            Tool::Line => Some(ElementKind::Line),
            Tool::Rectangle => Some(ElementKind::Rectangle),
            Tool::Text => Some(ElementKind::Text),
            Tool::Capture => Some(ElementKind::Capture),
            Tool::Selection | Tool::Eraser => None,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| EngineError::UnknownTool(s.to_string()))
    }
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Point,
    #[serde(default)]
    pub button: PointerButton,
    /// Device pressure in 0..=1, when the device reports one.
    #[serde(default)]
    pub pressure: Option<f64>,
}

impl PointerInput {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Primary,
            pressure: None,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub fn command() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Where the grabbed geometry sits relative to the pointer.
#[derive(Debug, Clone)]
enum GrabOffset {
    /// One offset per stroke point.
    Points(Vec<Vec2>),
    /// Offset of `(x1, y1)`.
    Origin(Vec2),
}

/// The element an action is operating on.
#[derive(Debug, Clone)]
struct Selection {
    id: ElementId,
    kind: ElementKind,
    position: Position,
    /// Geometry at pointer-down.
    coords: Option<Coords>,
    grab: Option<GrabOffset>,
    /// World point of the pointer-down that started the action.
    anchor: Point,
}

#[derive(Debug, Clone, Copy)]
struct PanAnchor {
    screen: Point,
    pan_offset: Vec2,
}

/// Scene interaction engine.
pub struct Whiteboard {
    config: EngineConfig,
    tolerance: HitTolerance,
    history: History<ElementList>,
    viewport: Viewport,
    tool: Tool,
    action: Action,
    selection: Option<Selection>,
    pan_anchor: Option<PanAnchor>,
    pressed_keys: HashSet<String>,
    next_id: u64,
    cursor: Cursor,
    capture_area: Option<Coords>,
    regions: Vec<Rect>,
    metrics: Box<dyn TextMeasure + Send>,
    document_id: String,
    document_name: String,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl fmt::Debug for Whiteboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Whiteboard")
            .field("tool", &self.tool)
            .field("action", &self.action)
            .field("elements", &self.elements().len())
            .field("history_index", &self.history.index())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Whiteboard {
    /// Create a whiteboard with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a whiteboard from a validated configuration.
    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            tolerance: HitTolerance::from(&config),
            history: History::new(ElementList::new()).with_limit(config.history_limit),
            viewport: Viewport::from_config(&config),
            tool: Tool::default(),
            action: Action::None,
            selection: None,
            pan_anchor: None,
            pressed_keys: HashSet::new(),
            next_id: 0,
            cursor: Cursor::Default,
            capture_area: None,
            regions: Vec::new(),
            metrics: Box::new(MonospaceMetrics::from_config(&config)),
            document_id: uuid::Uuid::new_v4().to_string(),
            document_name: "Untitled".to_string(),
            config,
        }
    }

    /// Replace the text metrics used to size committed text.
    pub fn with_text_measure(mut self, metrics: Box<dyn TextMeasure + Send>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The live element snapshot.
    pub fn elements(&self) -> &ElementList {
        self.history.current()
    }

    pub fn history(&self) -> &History<ElementList> {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Hover cursor from the last pointer-move.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selection.as_ref().map(|s| s.id)
    }

    /// The text element being edited, which renderers should skip.
    pub fn editing_id(&self) -> Option<ElementId> {
        if self.action == Action::Writing {
            self.selected_id()
        } else {
            None
        }
    }

    /// Screen position for the text-entry overlay of the element being edited.
    pub fn text_overlay_origin(&self) -> Option<Point> {
        let id = self.editing_id()?;
        let coords = self.elements().get(id)?.coords()?;
        Some(self.viewport.text_overlay_origin(coords.start()))
    }

    /// Marquee of the most recent capture drag.
    pub fn capture_area(&self) -> Option<Coords> {
        self.capture_area
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Switch tools. The current action is left alone.
    pub fn set_tool(&mut self, tool: Tool) {
        log::debug!("Tool: {} -> {}", self.tool, tool);
        self.tool = tool;
        if tool != Tool::Selection {
            self.cursor = Cursor::Default;
        }
    }

    fn alloc_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    fn pressure_of(&self, input: &PointerInput) -> f64 {
        input.pressure.unwrap_or(self.config.default_pressure)
    }

    // --- Pointer handling ---

    pub fn pointer_down(&mut self, input: PointerInput) {
        if self.action == Action::Writing {
            log::warn!("Pointer-down ignored while writing");
            return;
        }

        let world = self.viewport.screen_to_world(input.position);
        let pressure = self.pressure_of(&input);

        if input.button == PointerButton::Middle || self.is_key_pressed(SPACE_KEY) {
            self.pan_anchor = Some(PanAnchor {
                screen: input.position,
                pan_offset: self.viewport.pan_offset,
            });
            self.set_action(Action::Panning);
            return;
        }

        match self.tool {
            Tool::Eraser => {
                self.set_action(Action::Erasing);
                self.erase_at(world);
            }
            Tool::Selection => self.grab_at(world),
            Tool::Capture => {
                let element = self.create_element(ElementKind::Capture, world, pressure);
                self.capture_area = element.coords();
                self.start_drawing(element, world, Action::Drawing);
            }
            Tool::Text => {
                let element = self.create_element(ElementKind::Text, world, pressure);
                self.start_drawing(element, world, Action::Writing);
            }
            Tool::Pencil | Tool::Line | Tool::Rectangle => {
                let Some(kind) = self.tool.element_kind() else {
                    return;
                };
                let element = self.create_element(kind, world, pressure);
                self.start_drawing(element, world, Action::Drawing);
            }
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let world = self.viewport.screen_to_world(input.position);
        let pressure = self.pressure_of(&input);

        match self.action {
            Action::Panning => {
                if let Some(anchor) = self.pan_anchor {
                    self.viewport.pan_offset =
                        anchor.pan_offset + (input.position - anchor.screen) / self.viewport.scale;
                }
                return;
            }
            Action::Erasing => {
                self.erase_at(world);
                return;
            }
            _ => {}
        }

        if self.tool == Tool::Selection {
            let hit = element_at_position(world, self.elements(), &self.tolerance);
            self.cursor = cursor_for_position(hit.map(|h| h.position));
        }

        let Some(selection) = self.selection.clone() else {
            return;
        };

        match self.action {
            Action::Drawing => self.extend_drawing(&selection, world, pressure),
            Action::Moving => self.move_selection(&selection, world),
            Action::Resizing => {
                let Some(coords) = selection.coords else {
                    return;
                };
                let resized = resized_coordinates(world, selection.position, coords);
                log::trace!("Resize {} via {} to {:?}", selection.id, selection.position, resized);
                edit_element(&mut self.history, CommitMode::Overwrite, selection.id, |element| {
                    element.set_coords(resized);
                });
            }
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        let world = self.viewport.screen_to_world(input.position);

        if let Some(selection) = self.selection.clone() {
            if self.action == Action::Moving
                && selection.kind == ElementKind::Text
                && (world - selection.anchor).hypot() < 1e-9
            {
                self.set_action(Action::Writing);
                return;
            }

            if matches!(self.action, Action::Drawing | Action::Resizing)
                && adjustment_required(selection.kind)
            {
                let adjusted = self
                    .elements()
                    .get(selection.id)
                    .and_then(adjust_element_coordinates);
                if let Some(coords) = adjusted {
                    edit_element(&mut self.history, CommitMode::Overwrite, selection.id, |element| {
                        element.set_coords(coords);
                    });
                }
            }
        }

        if self.action == Action::Drawing {
            log::debug!("Stroke finished ({} elements)", self.elements().len());
        }

        if self.action == Action::Writing {
            return;
        }

        self.finish();
    }

    /// The text-entry overlay lost focus: commit `text` and stop writing.
    pub fn blur(&mut self, text: &str) {
        if self.action != Action::Writing {
            log::warn!("Blur ignored while {:?}", self.action);
            return;
        }
        if let Some(selection) = self.selection.take() {
            let metrics = &self.metrics;
            edit_element(&mut self.history, CommitMode::Overwrite, selection.id, |element| {
                if let Shape::Text(text_box) = &mut element.shape {
                    text_box.set_text(text, &**metrics);
                }
            });
            log::debug!("Committed text {} ({} chars)", selection.id, text.chars().count());
        }
        self.set_action(Action::None);
    }

    /// Abandon the current action without touching history.
    pub fn cancel(&mut self) {
        if self.action != Action::None {
            log::debug!("Cancelled {:?}", self.action);
        }
        self.finish();
    }

    fn finish(&mut self) {
        self.set_action(Action::None);
        self.selection = None;
        self.pan_anchor = None;
    }

    fn set_action(&mut self, action: Action) {
        if self.action != action {
            log::debug!("Action: {:?} -> {:?}", self.action, action);
            self.action = action;
        }
    }

    fn create_element(&mut self, kind: ElementKind, world: Point, pressure: f64) -> Element {
        let id = self.alloc_id();
        let size = self.config.pencil_size;
        Element::create(id, kind, world.x, world.y, world.x, world.y, size).with_pressure(pressure)
    }

    fn start_drawing(&mut self, element: Element, world: Point, action: Action) {
        log::debug!("Created {} {}", element.kind(), element.id);
        self.selection = Some(Selection {
            id: element.id,
            kind: element.kind(),
            position: Position::Inside,
            coords: element.coords(),
            grab: None,
            anchor: world,
        });
        self.history.update(CommitMode::Append, |current| {
            let mut next = current.clone();
            next.push(element);
            next
        });
        self.set_action(action);
    }

    fn grab_at(&mut self, world: Point) {
        let Some(hit) = element_at_position(world, self.elements(), &self.tolerance) else {
            return;
        };
        let Some(element) = self.elements().get(hit.id) else {
            return;
        };

        let grab = match &element.shape {
            Shape::Pencil(pencil) => {
                GrabOffset::Points(pencil.points.iter().map(|p| world - p.point()).collect())
            }
            _ => GrabOffset::Origin(world - element.coords().map(|c| c.start()).unwrap_or(world)),
        };
        let selection = Selection {
            id: hit.id,
            kind: element.kind(),
            position: hit.position,
            coords: element.coords(),
            grab: Some(grab),
            anchor: world,
        };
        log::debug!("Grabbed {} at {}", selection.id, selection.position);
        self.selection = Some(selection);

        // The gesture gets its own undo step; later moves overwrite it.
        let snapshot = self.elements().clone();
        self.history.commit(CommitMode::Append, snapshot);

        if hit.position.is_body() {
            self.set_action(Action::Moving);
        } else {
            self.set_action(Action::Resizing);
        }
    }

    fn erase_at(&mut self, world: Point) {
        let Some(hit) = element_at_position(world, self.elements(), &self.tolerance) else {
            return;
        };
        self.history.update(CommitMode::Append, |current| {
            let mut next = current.clone();
            next.remove(hit.id);
            next
        });
        log::debug!("Erased {}", hit.id);
    }

    fn extend_drawing(&mut self, selection: &Selection, world: Point, pressure: f64) {
        let mut capture = None;
        edit_element(&mut self.history, CommitMode::Overwrite, selection.id, |element| {
            match &mut element.shape {
                Shape::Pencil(pencil) => {
                    pencil.push_point(StrokePoint::new(world.x, world.y, pressure))
                }
                Shape::Line(line) => {
                    line.coords.x2 = world.x;
                    line.coords.y2 = world.y;
                }
                Shape::Rectangle(rect) => {
                    rect.coords.x2 = world.x;
                    rect.coords.y2 = world.y;
                }
                Shape::Capture(area) => {
                    area.coords.x2 = world.x;
                    area.coords.y2 = world.y;
                    capture = Some(area.coords);
                }
                Shape::Text(_) => return,
            }
            element.style.pressure = pressure;
        });
        if capture.is_some() {
            self.capture_area = capture;
        }
        log::trace!("Drawing {} at ({:.1}, {:.1})", selection.id, world.x, world.y);
    }

    fn move_selection(&mut self, selection: &Selection, world: Point) {
        let Some(grab) = &selection.grab else {
            return;
        };
        let original = selection.coords;
        edit_element(&mut self.history, CommitMode::Overwrite, selection.id, |element| match grab {
            GrabOffset::Points(offsets) => {
                if let Shape::Pencil(pencil) = &mut element.shape {
                    for (point, offset) in pencil.points.iter_mut().zip(offsets) {
                        point.x = world.x - offset.x;
                        point.y = world.y - offset.y;
                    }
                }
            }
            GrabOffset::Origin(offset) => {
                if let Some(coords) = original {
                    element.set_coords(coords.moved_to(world - *offset));
                }
            }
        });
        log::trace!("Move {} to ({:.1}, {:.1})", selection.id, world.x, world.y);
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        log::debug!("Undo -> index {} (changed: {})", self.history.index(), moved);
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        log::debug!("Redo -> index {} (changed: {})", self.history.index(), moved);
        moved
    }

    // --- Keyboard, wheel and surface ---

    /// A key went down. Returns true when it triggered a shortcut.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        self.pressed_keys.insert(key.to_string());
        if !modifiers.is_command() {
            return false;
        }
        match key.to_lowercase().as_str() {
            "z" if modifiers.shift => {
                self.redo();
                true
            }
            "z" => {
                self.undo();
                true
            }
            "y" => {
                self.redo();
                true
            }
            "=" | "+" => {
                self.zoom(self.config.zoom_step);
                true
            }
            "-" => {
                self.zoom(-self.config.zoom_step);
                true
            }
            _ => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.pressed_keys.remove(key);
    }

    /// Wheel input: zoom while Control or Meta is held, pan otherwise.
    pub fn wheel(&mut self, delta: Vec2) {
        if self.is_key_pressed("Control") || self.is_key_pressed("Meta") {
            let step = if delta.y < 0.0 { self.config.zoom_step } else { -self.config.zoom_step };
            self.zoom(step);
        } else {
            self.viewport.pan_by(delta);
        }
    }

    /// Step the zoom level. Returns false at the limits.
    pub fn zoom(&mut self, delta: f64) -> bool {
        let changed = self.viewport.zoom(delta);
        if changed {
            log::debug!("Zoom: {}%", self.viewport.zoom_percent());
        }
        changed
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
    }

    pub fn resize_surface(&mut self, width: f64, height: f64) {
        self.viewport.resize_surface(Size::new(width, height));
    }

    // --- Collaborators ---

    /// Everything a renderer needs to paint the current frame.
    pub fn render_frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            elements: self.elements(),
            viewport: &self.viewport,
            editing: self.editing_id(),
        }
    }

    /// A consistent `(elements, viewport)` pair for region detection.
    pub fn region_input(&self) -> RegionInput {
        RegionInput {
            elements: self.elements().clone(),
            pan_offset: self.viewport.pan_offset,
            scale: self.viewport.scale,
            scale_offset: self.viewport.scale_offset,
        }
    }

    /// Run `detector` over the scene and remember the regions it found.
    pub fn detect_regions(&mut self, detector: &dyn RegionDetector) -> &[Rect] {
        self.regions = detector.detect(&self.region_input());
        log::info!("Detected {} regions", self.regions.len());
        &self.regions
    }

    pub fn regions(&self) -> &[Rect] {
        &self.regions
    }

    /// Hand the detected regions to `exporter`.
    pub fn download_regions(&self, exporter: &mut dyn RegionExporter) -> Result<(), RegionError> {
        if self.regions.is_empty() {
            return Err(RegionError::NoRegions);
        }
        exporter.download(&self.regions, &self.region_input())
    }

    // --- Documents ---

    /// Snapshot the live scene as a persistable document.
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            id: self.document_id.clone(),
            name: self.document_name.clone(),
            elements: self.elements().clone(),
            pan_offset: self.viewport.pan_offset,
            scale: self.viewport.scale,
        }
    }

    /// Replace the scene with `document`. History restarts from it.
    pub fn load_document(&mut self, document: SceneDocument) {
        log::info!(
            "Loading document {} ({}) with {} elements",
            document.name,
            document.id,
            document.elements.len()
        );
        self.finish();
        self.next_id = document.elements.max_id().map_or(0, |id| id.0 + 1);
        self.history.reset(document.elements);
        self.viewport.pan_offset = if document.pan_offset.is_finite() {
            document.pan_offset
        } else {
            log::warn!("Ignoring non-finite pan offset {:?}", document.pan_offset);
            Vec2::ZERO
        };
        let scale = if document.scale.is_finite() {
            document.scale
        } else {
            log::warn!("Ignoring non-finite scale {}", document.scale);
            1.0
        };
        self.viewport.set_scale(scale);
        self.capture_area = None;
        self.regions.clear();
        self.document_id = document.id;
        self.document_name = document.name;
    }

    pub fn set_document_name(&mut self, name: impl Into<String>) {
        self.document_name = name.into();
    }
}

/// Apply `f` to element `id` in a copy of the live snapshot and commit it.
fn edit_element(
    history: &mut History<ElementList>,
    mode: CommitMode,
    id: ElementId,
    f: impl FnOnce(&mut Element),
) {
    history.update(mode, |current| {
        let mut next = current.clone();
        if let Some(element) = next.get_mut(id) {
            f(element);
        }
        next
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(tool: Tool) -> Whiteboard {
        let mut board = Whiteboard::new();
        board.set_tool(tool);
        board
    }

    fn drag(board: &mut Whiteboard, from: (f64, f64), to: (f64, f64)) {
        board.pointer_down(PointerInput::new(from.0, from.1));
        board.pointer_move(PointerInput::new(to.0, to.1));
        board.pointer_up(PointerInput::new(to.0, to.1));
    }

    #[test]
    fn test_tool_from_str() {
        assert_eq!("eraser".parse::<Tool>().unwrap(), Tool::Eraser);
        assert!(matches!(
            "lasso".parse::<Tool>(),
            Err(EngineError::UnknownTool(t)) if t == "lasso"
        ));
    }

    #[test]
    fn test_pencil_stroke_is_one_undo_step() {
        let mut board = board(Tool::Pencil);
        board.pointer_down(PointerInput::new(0.0, 0.0));
        board.pointer_move(PointerInput::new(5.0, 5.0));
        board.pointer_move(PointerInput::new(10.0, 0.0));
        board.pointer_up(PointerInput::new(10.0, 0.0));

        let Shape::Pencil(pencil) = &board.elements().as_slice()[0].shape else {
            panic!("expected pencil");
        };
        assert_eq!(pencil.len(), 3);
        assert_eq!(board.action(), Action::None);

        assert!(board.undo());
        assert!(board.elements().is_empty());
    }

    #[test]
    fn test_missing_pressure_defaults() {
        let mut board = board(Tool::Pencil);
        board.pointer_down(PointerInput::new(0.0, 0.0));
        board.pointer_move(PointerInput::new(1.0, 1.0).with_pressure(0.8));
        let Shape::Pencil(pencil) = &board.elements().as_slice()[0].shape else {
            panic!("expected pencil");
        };
        assert!((pencil.points[0].pressure - 0.5).abs() < f64::EPSILON);
        assert!((pencil.points[1].pressure - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rectangle_normalized_on_pointer_up() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (10.0, 10.0), (-5.0, 50.0));
        let element = &board.elements().as_slice()[0];
        assert_eq!(element.coords(), Some(Coords::new(-5.0, 10.0, 10.0, 50.0)));
        // Normalization overwrote the creation step
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_line_normalized_on_pointer_up() {
        let mut board = board(Tool::Line);
        drag(&mut board, (40.0, 0.0), (0.0, 30.0));
        let element = &board.elements().as_slice()[0];
        assert_eq!(element.coords(), Some(Coords::new(0.0, 30.0, 40.0, 0.0)));
    }

    #[test]
    fn test_ids_stay_stable_after_erase() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (0.0, 0.0), (20.0, 20.0));
        drag(&mut board, (100.0, 100.0), (120.0, 120.0));
        drag(&mut board, (200.0, 200.0), (220.0, 220.0));

        board.set_tool(Tool::Eraser);
        board.pointer_down(PointerInput::new(10.0, 10.0));
        board.pointer_up(PointerInput::new(10.0, 10.0));
        assert_eq!(board.elements().len(), 2);

        // Moving the last element still finds it by id
        board.set_tool(Tool::Selection);
        drag(&mut board, (210.0, 210.0), (310.0, 210.0));
        let moved = board.elements().get(ElementId(2)).unwrap();
        assert_eq!(moved.coords(), Some(Coords::new(300.0, 200.0, 320.0, 220.0)));
        assert_eq!(
            board.elements().get(ElementId(1)).unwrap().coords(),
            Some(Coords::new(100.0, 100.0, 120.0, 120.0))
        );
    }

    #[test]
    fn test_each_erase_is_undoable() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (0.0, 0.0), (20.0, 20.0));
        drag(&mut board, (100.0, 0.0), (120.0, 20.0));

        board.set_tool(Tool::Eraser);
        board.pointer_down(PointerInput::new(10.0, 10.0));
        board.pointer_move(PointerInput::new(110.0, 10.0));
        board.pointer_up(PointerInput::new(110.0, 10.0));
        assert!(board.elements().is_empty());

        board.undo();
        assert_eq!(board.elements().len(), 1);
        board.undo();
        assert_eq!(board.elements().len(), 2);
    }

    #[test]
    fn test_move_pencil_preserves_offsets() {
        let mut board = board(Tool::Pencil);
        board.pointer_down(PointerInput::new(0.0, 0.0));
        board.pointer_move(PointerInput::new(10.0, 0.0));
        board.pointer_up(PointerInput::new(10.0, 0.0));

        board.set_tool(Tool::Selection);
        drag(&mut board, (5.0, 0.0), (5.0, 20.0));
        let Shape::Pencil(pencil) = &board.elements().as_slice()[0].shape else {
            panic!("expected pencil");
        };
        assert_eq!(pencil.points[0].point(), Point::new(0.0, 20.0));
        assert_eq!(pencil.points[1].point(), Point::new(10.0, 20.0));

        // The whole drag is one step on top of the stroke
        board.undo();
        let Shape::Pencil(pencil) = &board.elements().as_slice()[0].shape else {
            panic!("expected pencil");
        };
        assert_eq!(pencil.points[0].point(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_resize_from_corner_normalizes() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (10.0, 10.0), (60.0, 60.0));

        board.set_tool(Tool::Selection);
        board.pointer_down(PointerInput::new(60.0, 60.0));
        assert_eq!(board.action(), Action::Resizing);
        board.pointer_move(PointerInput::new(0.0, 0.0));
        board.pointer_up(PointerInput::new(0.0, 0.0));

        assert_eq!(
            board.elements().as_slice()[0].coords(),
            Some(Coords::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(board.action(), Action::None);
    }

    #[test]
    fn test_selection_miss_does_nothing() {
        let mut board = board(Tool::Selection);
        board.pointer_down(PointerInput::new(50.0, 50.0));
        assert_eq!(board.action(), Action::None);
        assert!(!board.history().can_undo());
    }

    #[test]
    fn test_text_tool_writes_until_blur() {
        let mut board = board(Tool::Text);
        board.pointer_down(PointerInput::new(20.0, 30.0));
        assert_eq!(board.action(), Action::Writing);
        board.pointer_up(PointerInput::new(20.0, 30.0));
        assert_eq!(board.action(), Action::Writing);
        assert_eq!(board.editing_id(), Some(ElementId(0)));

        // Pointer-down is ignored until the overlay blurs
        board.pointer_down(PointerInput::new(300.0, 300.0));
        assert_eq!(board.elements().len(), 1);

        board.blur("hello");
        assert_eq!(board.action(), Action::None);
        assert!(board.editing_id().is_none());
        let text = board.elements().as_slice()[0].as_text().unwrap();
        assert_eq!(text.text, "hello");
        assert_eq!(text.coords, Coords::new(20.0, 30.0, 20.0 + 5.0 * 13.0, 54.0));
    }

    #[test]
    fn test_click_on_text_reenters_writing() {
        let mut board = board(Tool::Text);
        board.pointer_down(PointerInput::new(0.0, 0.0));
        board.pointer_up(PointerInput::new(0.0, 0.0));
        board.blur("abc");

        board.set_tool(Tool::Selection);
        board.pointer_down(PointerInput::new(10.0, 10.0));
        board.pointer_up(PointerInput::new(10.0, 10.0));
        assert_eq!(board.action(), Action::Writing);

        board.blur("a much longer label");
        let text = board.elements().as_slice()[0].as_text().unwrap();
        assert_eq!(text.text, "a much longer label");
        assert_eq!(text.coords, Coords::new(0.0, 0.0, 39.0, 24.0));
    }

    #[test]
    fn test_blur_outside_writing_is_ignored() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (0.0, 0.0), (10.0, 10.0));
        let before = board.elements().clone();
        board.blur("stray");
        assert_eq!(*board.elements(), before);
    }

    #[test]
    fn test_panning_tracks_pointer() {
        let mut board = board(Tool::Pencil);
        board.pointer_down(PointerInput::new(100.0, 100.0).with_button(PointerButton::Middle));
        assert_eq!(board.action(), Action::Panning);
        board.pointer_move(PointerInput::new(130.0, 80.0));
        board.pointer_up(PointerInput::new(130.0, 80.0));
        assert_eq!(board.viewport().pan_offset, Vec2::new(30.0, -20.0));
        assert!(board.elements().is_empty());
        assert!(!board.history().can_undo());
    }

    #[test]
    fn test_panning_keeps_content_under_pointer_when_zoomed() {
        let mut board = board(Tool::Rectangle);
        board.resize_surface(800.0, 600.0);
        board.zoom(1.0);
        assert!((board.viewport().scale - 2.0).abs() < f64::EPSILON);
        let corner = board.viewport().screen_to_world(Point::new(100.0, 100.0));

        board.pointer_down(PointerInput::new(100.0, 100.0).with_button(PointerButton::Middle));
        board.pointer_move(PointerInput::new(140.0, 110.0));
        board.pointer_up(PointerInput::new(140.0, 110.0));

        let screen = board.viewport().world_to_screen(corner);
        assert!((screen.x - 140.0).abs() < 1e-9);
        assert!((screen.y - 110.0).abs() < 1e-9);
        assert_eq!(board.viewport().pan_offset, Vec2::new(20.0, 5.0));
    }

    #[test]
    fn test_space_held_pans() {
        let mut board = board(Tool::Rectangle);
        board.key_down(SPACE_KEY, Modifiers::default());
        board.pointer_down(PointerInput::new(0.0, 0.0));
        assert_eq!(board.action(), Action::Panning);
        board.pointer_up(PointerInput::new(0.0, 0.0));
        board.key_up(SPACE_KEY);
        board.pointer_down(PointerInput::new(0.0, 0.0));
        assert_eq!(board.action(), Action::Drawing);
    }

    #[test]
    fn test_hover_cursor_with_selection_tool() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (0.0, 0.0), (100.0, 100.0));
        board.set_tool(Tool::Selection);

        board.pointer_move(PointerInput::new(50.0, 50.0));
        assert_eq!(board.cursor(), Cursor::Move);
        board.pointer_move(PointerInput::new(100.0, 0.0));
        assert_eq!(board.cursor(), Cursor::NeswResize);
        board.pointer_move(PointerInput::new(500.0, 500.0));
        assert_eq!(board.cursor(), Cursor::Default);
        assert_eq!(board.action(), Action::None);
    }

    #[test]
    fn test_zoom_shortcuts_clamp() {
        let mut board = Whiteboard::new();
        for _ in 0..10 {
            board.key_down("=", Modifiers::command());
        }
        assert!((board.viewport().scale - 2.0).abs() < 1e-9);
        assert!(!board.zoom(0.1));
        board.key_down("-", Modifiers::command());
        assert!((board.viewport().scale - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_pans_or_zooms() {
        let mut board = Whiteboard::new();
        board.wheel(Vec2::new(5.0, 10.0));
        assert_eq!(board.viewport().pan_offset, Vec2::new(-5.0, -10.0));

        board.key_down("Control", Modifiers::command());
        board.wheel(Vec2::new(0.0, -1.0));
        assert!((board.viewport().scale - 1.1).abs() < 1e-9);
        board.key_up("Control");
        board.wheel(Vec2::new(0.0, -1.0));
        assert!((board.viewport().scale - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_undo_redo_shortcuts() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (0.0, 0.0), (10.0, 10.0));
        assert!(board.key_down("z", Modifiers::command()));
        assert!(board.elements().is_empty());
        let redo = Modifiers {
            shift: true,
            ..Modifiers::command()
        };
        assert!(board.key_down("Z", redo));
        assert_eq!(board.elements().len(), 1);
        assert!(!board.key_down("z", Modifiers::default()));
    }

    #[test]
    fn test_drawing_under_zoom_uses_world_coordinates() {
        let mut board = board(Tool::Rectangle);
        board.resize_surface(800.0, 600.0);
        board.zoom(1.0);
        drag(&mut board, (400.0, 300.0), (600.0, 400.0));
        let coords = board.elements().as_slice()[0].coords().unwrap();
        assert!((coords.x1 - 400.0).abs() < 1e-9);
        assert!((coords.x2 - 500.0).abs() < 1e-9);
        assert!((coords.y2 - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_capture_updates_area() {
        let mut board = board(Tool::Capture);
        drag(&mut board, (0.0, 0.0), (40.0, 30.0));
        assert_eq!(board.capture_area(), Some(Coords::new(0.0, 0.0, 40.0, 30.0)));
    }

    #[test]
    fn test_cancel_unsticks_action() {
        let mut board = board(Tool::Pencil);
        board.pointer_down(PointerInput::new(0.0, 0.0));
        board.pointer_move(PointerInput::new(5.0, 5.0));
        let index = board.history().index();
        board.cancel();
        assert_eq!(board.action(), Action::None);
        assert!(board.selected_id().is_none());
        assert_eq!(board.history().index(), index);
    }

    #[test]
    fn test_set_tool_keeps_action() {
        let mut board = board(Tool::Pencil);
        board.pointer_down(PointerInput::new(0.0, 0.0));
        board.set_tool(Tool::Eraser);
        assert_eq!(board.action(), Action::Drawing);
    }

    #[test]
    fn test_load_document_bumps_ids() {
        let mut source = board(Tool::Rectangle);
        drag(&mut source, (0.0, 0.0), (10.0, 10.0));
        drag(&mut source, (20.0, 20.0), (30.0, 30.0));
        let document = source.to_document();

        let mut board = board(Tool::Line);
        board.load_document(document);
        assert_eq!(board.elements().len(), 2);
        assert!(!board.history().can_undo());
        drag(&mut board, (50.0, 50.0), (60.0, 60.0));
        assert_eq!(board.elements().last().unwrap().id, ElementId(2));
    }

    #[test]
    fn test_load_document_with_nan_scale_falls_back() {
        let mut document = SceneDocument::new();
        document.scale = f64::NAN;
        document.pan_offset = Vec2::new(f64::INFINITY, 0.0);

        let mut board = board(Tool::Rectangle);
        board.load_document(document);
        assert!((board.viewport().scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(board.viewport().pan_offset, Vec2::ZERO);
        drag(&mut board, (10.0, 10.0), (20.0, 20.0));
        assert_eq!(
            board.elements().as_slice()[0].coords(),
            Some(Coords::new(10.0, 10.0, 20.0, 20.0))
        );
    }

    struct CountingExporter {
        exported: usize,
    }

    impl RegionExporter for CountingExporter {
        fn download(&mut self, regions: &[Rect], _input: &RegionInput) -> Result<(), RegionError> {
            self.exported += regions.len();
            Ok(())
        }
    }

    #[test]
    fn test_download_requires_detected_regions() {
        let mut board = board(Tool::Capture);
        let mut exporter = CountingExporter { exported: 0 };
        assert!(matches!(board.download_regions(&mut exporter), Err(RegionError::NoRegions)));

        drag(&mut board, (0.0, 0.0), (50.0, 50.0));
        assert_eq!(board.detect_regions(&crate::regions::CaptureRegionDetector).len(), 1);
        board.download_regions(&mut exporter).unwrap();
        assert_eq!(exporter.exported, 1);
    }

    #[test]
    fn test_render_frame_hides_text_being_edited() {
        let mut board = board(Tool::Rectangle);
        drag(&mut board, (0.0, 0.0), (10.0, 10.0));
        board.set_tool(Tool::Text);
        board.pointer_down(PointerInput::new(50.0, 50.0));

        let frame = board.render_frame();
        assert_eq!(frame.editing, Some(ElementId(1)));
        assert_eq!(frame.visible_elements().count(), 1);
        assert_eq!(board.text_overlay_origin(), Some(Point::new(50.0, 48.0)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            min_scale: 3.0,
            ..EngineConfig::default()
        };
        assert!(matches!(Whiteboard::with_config(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_history_limit_from_config() {
        let config = EngineConfig {
            history_limit: Some(2),
            ..EngineConfig::default()
        };
        let mut board = Whiteboard::with_config(config).unwrap();
        board.set_tool(Tool::Rectangle);
        for i in 0..4 {
            let x = i as f64 * 50.0;
            drag(&mut board, (x, 0.0), (x + 10.0, 10.0));
        }
        assert!(board.undo());
        assert!(!board.undo());
        assert_eq!(board.elements().len(), 3);
    }
}
