use anyhow::{Context, Result};
use log::{Level, debug};
use serde::{Deserialize, Serialize};

use crate::cropper::{CropRegion, extract_regions};
use crate::error::CoreResult;
use crate::geometry::ImageExtent;
use crate::postprocess::{Detection, PostprocessConfig, apply_postprocess};
use crate::source::DetectionSource;
use crate::validation::{validate_iou_threshold, validate_padding, validate_unit_range};
use cardcrop_utils::config::{CropSettings, DetectionSettings};
use cardcrop_utils::timing_guard;

/// Parameters for one suppression + crop pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub postprocess: PostprocessConfig,
    /// Margin added around each kept box before clipping.
    pub padding: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self::from_settings(&DetectionSettings::default(), &CropSettings::default())
    }
}

impl PipelineParams {
    pub fn from_settings(detection: &DetectionSettings, crop: &CropSettings) -> Self {
        Self {
            postprocess: PostprocessConfig::from(detection),
            padding: crop.padding,
        }
    }
}

/// Result of a pipeline run.
///
/// `regions[k]` is derived from the input detection at `kept[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub kept: Vec<usize>,
    pub regions: Vec<CropRegion>,
    pub extent: ImageExtent,
}

impl PipelineOutput {
    /// Regions that still cover some area after clipping.
    pub fn non_empty_regions(&self) -> impl Iterator<Item = &CropRegion> {
        self.regions.iter().filter(|region| !region.is_empty())
    }
}

/// Validated suppression and cropping parameters.
///
/// Holds no per-image state, so one pipeline can serve any number of images.
#[derive(Debug, Clone)]
pub struct Pipeline {
    params: PipelineParams,
}

impl Pipeline {
    pub fn new(params: PipelineParams) -> CoreResult<Self> {
        validate_iou_threshold(params.postprocess.iou_threshold)?;
        validate_unit_range(params.postprocess.score_threshold, "score threshold")?;
        validate_padding(params.padding)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Suppress overlapping detections and compute padded regions for the survivors.
    pub fn run(&self, detections: &[Detection], extent: ImageExtent) -> CoreResult<PipelineOutput> {
        let _guard = timing_guard("cardcrop_core::pipeline", Level::Debug);

        let kept = {
            let _guard = timing_guard("cardcrop_core::suppress", Level::Debug);
            apply_postprocess(detections, &self.params.postprocess)?
        };

        let survivors: Vec<Detection> = kept.iter().map(|&i| detections[i].clone()).collect();
        let regions = {
            let _guard = timing_guard("cardcrop_core::extract_regions", Level::Trace);
            extract_regions(&survivors, extent, self.params.padding)?
        };

        debug!(
            "kept {} of {} detections on {}x{} image",
            kept.len(),
            detections.len(),
            extent.width,
            extent.height
        );

        Ok(PipelineOutput {
            kept,
            regions,
            extent,
        })
    }

    /// Fetch detections from `source` and run them.
    pub fn run_source(
        &self,
        source: &dyn DetectionSource,
        extent: ImageExtent,
    ) -> Result<PipelineOutput> {
        let detections = {
            let _guard = timing_guard("cardcrop_core::detect", Level::Debug);
            source.detect().context("detection source failed")?
        };
        Ok(self.run(&detections, extent)?)
    }
}
