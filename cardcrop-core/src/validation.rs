//! Argument checks shared by the pipeline entry points.

use crate::error::{CoreError, CoreResult};
use crate::geometry::ImageExtent;

/// Rejects values outside `[0, 1]`, including NaN.
#[inline]
pub fn validate_unit_range(value: f32, param_name: &str) -> CoreResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::InvalidArgument(format!(
            "{param_name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

#[inline]
pub fn validate_iou_threshold(threshold: f32) -> CoreResult<()> {
    validate_unit_range(threshold, "IoU threshold")
}

/// Padding must be a finite, non-negative pixel count.
#[inline]
pub fn validate_padding(padding: f32) -> CoreResult<()> {
    if !padding.is_finite() || padding < 0.0 {
        return Err(CoreError::InvalidArgument(format!(
            "padding must be a finite value >= 0, got {padding}"
        )));
    }
    Ok(())
}

#[inline]
pub fn validate_extent(extent: ImageExtent) -> CoreResult<()> {
    if extent.width == 0 || extent.height == 0 {
        return Err(CoreError::InvalidArgument(format!(
            "image extent must be positive, got {}x{}",
            extent.width, extent.height
        )));
    }
    Ok(())
}
