//! Core post-processing for playing-card detection.
//!
//! This crate suppresses duplicate detections with greedy non-maximum
//! suppression and turns the survivors into padded crop regions clipped to the
//! image. Detection itself sits behind [`DetectionSource`].

/// Padded crop regions (expand, then clamp).
pub mod cropper;
pub mod error;
/// Bounding boxes, image extents and overlap measures.
pub mod geometry;
/// Suppression followed by region extraction.
pub mod pipeline;
/// Detection post-processing (score filtering, NMS).
pub mod postprocess;
/// Stored hosted-inference responses.
pub mod predictions;
pub mod source;
mod validation;

pub use crate::cropper::{CropRegion, extract_regions};
pub use crate::error::{CoreError, CoreResult};
pub use crate::geometry::{BoundingBox, ImageExtent};
pub use crate::pipeline::{Pipeline, PipelineOutput, PipelineParams};
pub use crate::postprocess::{Detection, PostprocessConfig, apply_postprocess, suppress};
pub use crate::predictions::{Prediction, PredictionFile, PredictionImage, PredictionSet};
pub use crate::source::DetectionSource;

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
