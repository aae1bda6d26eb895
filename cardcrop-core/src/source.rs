//! Boundary to the detection model.

use anyhow::Result;

use crate::geometry::ImageExtent;
use crate::postprocess::Detection;

/// Anything that can produce candidate detections for one image.
///
/// Implement this for a local model, a remote inference client, or a file of
/// stored predictions. Sources may apply their own confidence floor, but the
/// pipeline assumes neither ordering nor filtering of what they return.
pub trait DetectionSource {
    /// Candidate detections for the image this source represents.
    fn detect(&self) -> Result<Vec<Detection>>;

    /// Image dimensions, when the source knows them.
    fn extent_hint(&self) -> Option<ImageExtent> {
        None
    }
}

impl DetectionSource for Vec<Detection> {
    fn detect(&self) -> Result<Vec<Detection>> {
        Ok(self.clone())
    }
}
