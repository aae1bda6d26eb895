use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::geometry::BoundingBox;
use crate::validation::{validate_iou_threshold, validate_unit_range};
use cardcrop_utils::config::DetectionSettings;

/// Candidate filtering applied before and during suppression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostprocessConfig {
    /// Minimum confidence score for a candidate to be considered.
    pub score_threshold: f32,
    /// Overlap above which the lower-scoring of two candidates is dropped.
    pub iou_threshold: f32,
    /// Keep at most this many candidates (by score) before suppression; 0 keeps all.
    pub top_k: usize,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        DetectionSettings::default().into()
    }
}

/// A single candidate detection: a box, its confidence and an optional class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Confidence in `[0, 1]`.
    pub score: f32,
    /// Class name reported by the detector; ignored by suppression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, score: f32) -> Self {
        Self {
            bbox,
            score,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Greedy non-maximum suppression over one image's detections.
///
/// Returns indices into `detections` of the survivors, highest score first.
/// Equal scores are visited in ascending index order. A candidate is dropped
/// only when its IoU with an already kept detection is strictly greater than
/// `iou_threshold`, so boxes exactly at the threshold both survive.
///
/// ```rust
/// # use cardcrop_core::{BoundingBox, Detection, suppress};
/// let detections = vec![
///     Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0.8),
///     Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0.9),
///     Detection::new(BoundingBox::new(20.0, 20.0, 30.0, 30.0), 0.5),
/// ];
/// assert_eq!(suppress(&detections, 0.5).unwrap(), vec![1, 2]);
/// ```
pub fn suppress(detections: &[Detection], iou_threshold: f32) -> CoreResult<Vec<usize>> {
    validate_iou_threshold(iou_threshold)?;
    let order = score_order(detections, 0..detections.len());
    Ok(non_max_suppression(detections, order, iou_threshold))
}

/// Score filtering, optional top-k capping and suppression in one pass.
///
/// Non-finite scores and scores below `score_threshold` are discarded first.
/// Returned indices refer to the caller's `detections` slice.
pub fn apply_postprocess(
    detections: &[Detection],
    config: &PostprocessConfig,
) -> CoreResult<Vec<usize>> {
    validate_iou_threshold(config.iou_threshold)?;
    validate_unit_range(config.score_threshold, "score threshold")?;

    let candidates = (0..detections.len()).filter(|&i| {
        let score = detections[i].score;
        score.is_finite() && score >= config.score_threshold
    });
    let mut order = score_order(detections, candidates);
    debug!(
        "{} of {} candidates pass score threshold {}",
        order.len(),
        detections.len(),
        config.score_threshold
    );

    if config.top_k > 0 && order.len() > config.top_k {
        order.truncate(config.top_k);
    }

    Ok(non_max_suppression(detections, order, config.iou_threshold))
}

/// Candidate indices sorted by descending score.
fn score_order(detections: &[Detection], candidates: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut order: Vec<usize> = candidates.collect();
    // Stable sort: ties stay in ascending index order.
    order.sort_by(|&a, &b| detections[b].score.total_cmp(&detections[a].score));
    order
}

/// Keep each candidate, in `order`, unless it overlaps an already kept one.
fn non_max_suppression(detections: &[Detection], order: Vec<usize>, threshold: f32) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(order.len());
    for candidate in order {
        let bbox = &detections[candidate].bbox;
        let suppressed = kept
            .iter()
            .any(|&k| detections[k].bbox.iou(bbox) > threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

impl From<DetectionSettings> for PostprocessConfig {
    fn from(settings: DetectionSettings) -> Self {
        PostprocessConfig {
            score_threshold: settings.score_threshold,
            iou_threshold: settings.iou_threshold,
            top_k: settings.top_k,
        }
    }
}

impl From<&DetectionSettings> for PostprocessConfig {
    fn from(settings: &DetectionSettings) -> Self {
        settings.clone().into()
    }
}
