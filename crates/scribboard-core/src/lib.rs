//! Scribboard Core Library
//!
//! Platform-agnostic scene interaction engine for the Scribboard whiteboard:
//! element model, viewport math, hit-testing, resize handling, the pointer
//! state machine and undo/redo history.

pub mod config;
pub mod error;
pub mod history;
pub mod hit;
pub mod interaction;
pub mod regions;
pub mod render;
pub mod resize;
pub mod shapes;
pub mod storage;
pub mod text;
pub mod viewport;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use history::{CommitMode, History};
pub use hit::{Cursor, Hit, HitTolerance, Position, cursor_for_position, element_at_position};
pub use interaction::{Action, Modifiers, PointerButton, PointerInput, Tool, Whiteboard};
pub use render::{RenderFrame, SceneRenderer};
pub use resize::{adjust_element_coordinates, adjustment_required, resized_coordinates};
pub use shapes::{Coords, Element, ElementId, ElementKind, ElementList, Shape, StrokePoint};
pub use storage::{SceneDocument, Storage};
pub use viewport::Viewport;
