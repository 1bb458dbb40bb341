//! Region detection and export collaborators.
//!
//! Detectors find drawn areas worth exporting; exporters turn them into
//! files. Both only see a [`RegionInput`], a consistent copy of the scene and
//! the view it was taken under.

use crate::shapes::{ElementKind, ElementList};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Region errors.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("No regions to export")]
    NoRegions,
    #[error("Export failed: {0}")]
    Export(String),
}

/// Scene and view captured together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInput {
    pub elements: ElementList,
    pub pan_offset: Vec2,
    pub scale: f64,
    pub scale_offset: Vec2,
}

/// Finds regions of interest, in world coordinates.
pub trait RegionDetector {
    fn detect(&self, input: &RegionInput) -> Vec<Rect>;
}

/// Exports previously detected regions.
pub trait RegionExporter {
    fn download(&mut self, regions: &[Rect], input: &RegionInput) -> Result<(), RegionError>;
}

/// Uses the marquees drawn with the capture tool as regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureRegionDetector;

impl RegionDetector for CaptureRegionDetector {
    fn detect(&self, input: &RegionInput) -> Vec<Rect> {
        input
            .elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Capture)
            .map(|e| e.bounds())
            .filter(|r| r.area() > 0.0)
            .collect()
    }
}
