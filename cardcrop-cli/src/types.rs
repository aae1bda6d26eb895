//! Shared types and conversions for cardcrop.

use cardcrop_core::{CropRegion, Detection};
use serde::Serialize;

/// A serializable representation of a single detection.
#[derive(Debug, Serialize)]
pub struct DetectionRecord {
    /// Index into the input predictions.
    pub index: usize,
    pub score: f32,
    /// Corners as `[x1, y1, x2, y2]`.
    pub bbox: [f32; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DetectionRecord {
    pub fn new(index: usize, detection: &Detection) -> Self {
        let b = detection.bbox;
        Self {
            index,
            score: detection.score,
            bbox: [b.x1, b.y1, b.x2, b.y2],
            label: detection.label.clone(),
        }
    }
}

/// Output of the `suppress` subcommand.
#[derive(Debug, Serialize)]
pub struct SuppressReport {
    pub predictions: String,
    pub candidates: usize,
    pub kept: Vec<DetectionRecord>,
}

/// One saved (or skipped) crop.
#[derive(Debug, Serialize)]
pub struct CropRecord {
    #[serde(flatten)]
    pub detection: DetectionRecord,
    /// Padded, clipped region as `[x1, y1, x2, y2]`.
    pub region: [f32; 4],
    /// Saved file; absent when the region was empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl CropRecord {
    pub fn new(index: usize, region: &CropRegion, output: Option<String>) -> Self {
        let b = region.bbox;
        Self {
            detection: DetectionRecord::new(index, &region.detection),
            region: [b.x1, b.y1, b.x2, b.y2],
            output,
        }
    }
}

/// A serializable representation of all crops for a single image.
#[derive(Debug, Serialize)]
pub struct ImageCrops {
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub crops: Vec<CropRecord>,
}
