//! Capture marquee.

use super::Coords;
use serde::{Deserialize, Serialize};

/// A region the user drags out for export. Drawn like a rectangle while
/// active but never hit-tested, so it cannot be selected or erased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub coords: Coords,
}

impl Capture {
    pub fn new(coords: Coords) -> Self {
        Self { coords }
    }
}
