//! Engine error types.

use thiserror::Error;

/// Errors raised by the engine at its string-typed boundaries.
///
/// Geometry operations themselves are total over [`crate::ElementKind`], so
/// these only surface when a host hands the engine an untyped token.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Type not recognised: {0}")]
    UnknownElementType(String),
    #[error("Tool not recognised: {0}")]
    UnknownTool(String),
    #[error("Position not recognised: {0}")]
    UnknownPosition(String),
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
