//! Input scripts: recorded host events replayed against a [`Whiteboard`].

use kurbo::{Point, Vec2};
use scribboard_core::interaction::{Modifiers, PointerButton, PointerInput};
use scribboard_core::regions::CaptureRegionDetector;
use scribboard_core::{EngineError, Tool, Whiteboard};
use serde::Deserialize;

/// One host event, in screen coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Tool {
        tool: String,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
        #[serde(default)]
        pressure: Option<f64>,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        pressure: Option<f64>,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    Blur {
        text: String,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: String,
    },
    Wheel {
        dx: f64,
        dy: f64,
    },
    Zoom {
        delta: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
    Undo,
    Redo,
    Cancel,
    DetectRegions,
}

/// A whole script file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: Option<String>,
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn pointer(x: f64, y: f64, pressure: Option<f64>) -> PointerInput {
    PointerInput {
        position: Point::new(x, y),
        button: PointerButton::Primary,
        pressure,
    }
}

/// Feed one event to the board.
pub fn apply(board: &mut Whiteboard, event: &ScriptEvent) -> Result<(), EngineError> {
    log::trace!("Replaying {:?}", event);
    match event {
        ScriptEvent::Tool { tool } => board.set_tool(tool.parse::<Tool>()?),
        ScriptEvent::PointerDown { x, y, button, pressure } => {
            board.pointer_down(pointer(*x, *y, *pressure).with_button(*button));
        }
        ScriptEvent::PointerMove { x, y, pressure } => {
            board.pointer_move(pointer(*x, *y, *pressure))
        }
        ScriptEvent::PointerUp { x, y } => board.pointer_up(pointer(*x, *y, None)),
        ScriptEvent::Blur { text } => board.blur(text),
        ScriptEvent::KeyDown { key, modifiers } => {
            board.key_down(key, *modifiers);
        }
        ScriptEvent::KeyUp { key } => board.key_up(key),
        ScriptEvent::Wheel { dx, dy } => board.wheel(Vec2::new(*dx, *dy)),
        ScriptEvent::Zoom { delta } => {
            board.zoom(*delta);
        }
        ScriptEvent::Resize { width, height } => board.resize_surface(*width, *height),
        ScriptEvent::Undo => {
            board.undo();
        }
        ScriptEvent::Redo => {
            board.redo();
        }
        ScriptEvent::Cancel => board.cancel(),
        ScriptEvent::DetectRegions => {
            board.detect_regions(&CaptureRegionDetector);
        }
    }
    Ok(())
}

/// Replay every event in order, stopping at the first bad one.
pub fn run(board: &mut Whiteboard, script: &Script) -> Result<(), (usize, EngineError)> {
    for (index, event) in script.events.iter().enumerate() {
        apply(board, event).map_err(|e| (index, e))?;
    }
    log::debug!("Replayed {} events", script.events.len());
    Ok(())
}
