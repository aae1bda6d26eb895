//! Padded crop regions for surviving detections.
//!
//! Detection boxes hug the object tightly, so each region is grown by a fixed
//! margin to keep some surrounding context and then clipped to the image. The
//! result is pure geometry; the caller performs the pixel crop.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::geometry::{BoundingBox, ImageExtent};
use crate::postprocess::Detection;
use crate::validation::{validate_extent, validate_padding};

/// Clipped crop rectangle together with the detection it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Padded box clipped to `[0, width] x [0, height]`.
    pub bbox: BoundingBox,
    pub detection: Detection,
}

impl CropRegion {
    /// `true` when clipping left no area, e.g. a detection lying beyond the
    /// image edge. Callers should skip such regions rather than fail.
    pub fn is_empty(&self) -> bool {
        self.bbox.is_empty()
    }

    /// Integer `(x, y, width, height)` for the pixel crop, rounding each edge to
    /// the nearest pixel. `None` when the rounded rectangle is empty, which also
    /// covers regions that keep a sliver of area narrower than one pixel.
    pub fn pixel_rect(&self) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.bbox.x1.round().max(0.0) as u32;
        let y1 = self.bbox.y1.round().max(0.0) as u32;
        let x2 = self.bbox.x2.round().max(0.0) as u32;
        let y2 = self.bbox.y2.round().max(0.0) as u32;
        let width = x2.saturating_sub(x1);
        let height = y2.saturating_sub(y1);
        if width == 0 || height == 0 {
            None
        } else {
            Some((x1, y1, width, height))
        }
    }
}

/// Compute one crop region per detection, preserving input order.
///
/// Each box is expanded by `padding` pixels on all four sides and clamped to
/// the image. Zero-sized extents and negative or non-finite padding are
/// rejected before any region is produced.
///
/// ```rust
/// # use cardcrop_core::{BoundingBox, Detection, ImageExtent, extract_regions};
/// let detections = [Detection::new(BoundingBox::new(95.0, 95.0, 110.0, 110.0), 0.9)];
/// let regions = extract_regions(&detections, ImageExtent::new(100, 100), 20.0).unwrap();
/// assert_eq!(regions[0].bbox, BoundingBox::new(75.0, 75.0, 100.0, 100.0));
/// ```
pub fn extract_regions(
    detections: &[Detection],
    extent: ImageExtent,
    padding: f32,
) -> CoreResult<Vec<CropRegion>> {
    validate_extent(extent)?;
    validate_padding(padding)?;

    Ok(detections
        .iter()
        .map(|detection| CropRegion {
            bbox: detection.bbox.expand(padding).clamp_to(extent),
            detection: detection.clone(),
        })
        .collect())
}
