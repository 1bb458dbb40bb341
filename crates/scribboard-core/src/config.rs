//! Engine configuration.
//!
//! Values come from compiled-in defaults, optionally replaced by a JSON file
//! and then by `SCRIBBOARD_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_HANDLE_RADIUS: f64 = 5.0;
pub const DEFAULT_LINE_TOLERANCE: f64 = 1.0;
pub const DEFAULT_PENCIL_SIZE: f64 = 3.0;
pub const DEFAULT_PRESSURE: f64 = 0.5;
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;
pub const DEFAULT_MIN_SCALE: f64 = 0.1;
pub const DEFAULT_MAX_SCALE: f64 = 2.0;
pub const DEFAULT_TEXT_CHAR_WIDTH: f64 = 13.0;
pub const DEFAULT_TEXT_LINE_HEIGHT: f64 = 24.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for hit-testing, drawing defaults and the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Radius around corners, edges and line endpoints that counts as a handle.
    pub handle_radius: f64,
    /// Maximum perpendicular distance for a line body hit.
    pub line_tolerance: f64,
    /// Stroke width given to new pencil, line and rectangle elements.
    pub pencil_size: f64,
    /// Pressure assumed when the input device reports none.
    pub default_pressure: f64,
    /// Scale delta applied per zoom step.
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Advance width per character used by the built-in text metrics.
    pub text_char_width: f64,
    /// Fixed height of a committed text box.
    pub text_line_height: f64,
    /// Maximum number of history snapshots (None = unbounded).
    pub history_limit: Option<usize>,
    /// Initial drawing surface size.
    pub surface_width: f64,
    pub surface_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handle_radius: DEFAULT_HANDLE_RADIUS,
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            pencil_size: DEFAULT_PENCIL_SIZE,
            default_pressure: DEFAULT_PRESSURE,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            text_char_width: DEFAULT_TEXT_CHAR_WIDTH,
            text_line_height: DEFAULT_TEXT_LINE_HEIGHT,
            history_limit: None,
            surface_width: 800.0,
            surface_height: 600.0,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Apply `SCRIBBOARD_*` environment overrides on top of this config.
    ///
    /// Recognised variables:
    /// - `SCRIBBOARD_HANDLE_RADIUS`
    /// - `SCRIBBOARD_LINE_TOLERANCE`
    /// - `SCRIBBOARD_PENCIL_SIZE`
    /// - `SCRIBBOARD_ZOOM_STEP`
    /// - `SCRIBBOARD_HISTORY_LIMIT`
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = parse_var(&lookup, "SCRIBBOARD_HANDLE_RADIUS", "handle_radius")? {
            self.handle_radius = v;
        }
        if let Some(v) = parse_var(&lookup, "SCRIBBOARD_LINE_TOLERANCE", "line_tolerance")? {
            self.line_tolerance = v;
        }
        if let Some(v) = parse_var(&lookup, "SCRIBBOARD_PENCIL_SIZE", "pencil_size")? {
            self.pencil_size = v;
        }
        if let Some(v) = parse_var(&lookup, "SCRIBBOARD_ZOOM_STEP", "zoom_step")? {
            self.zoom_step = v;
        }
        if let Some(v) = parse_var::<usize>(&lookup, "SCRIBBOARD_HISTORY_LIMIT", "history_limit")? {
            self.history_limit = Some(v);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("handle_radius", self.handle_radius),
            ("line_tolerance", self.line_tolerance),
            ("zoom_step", self.zoom_step),
            ("min_scale", self.min_scale),
            ("text_char_width", self.text_char_width),
            ("text_line_height", self.text_line_height),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid {
                field: "min_scale",
                reason: format!("{} exceeds max_scale {}", self.min_scale, self.max_scale),
            });
        }
        if !(0.0..=1.0).contains(&self.default_pressure) {
            return Err(ConfigError::Invalid {
                field: "default_pressure",
                reason: format!("must be within 0..=1, got {}", self.default_pressure),
            });
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "history_limit",
                reason: "must keep at least one snapshot".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    field: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                field,
                reason: format!("{}={}: {}", key, raw, e),
            }),
        None => Ok(None),
    }
}
