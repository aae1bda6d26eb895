//! Stored responses from a hosted object-detection service.
//!
//! The service reports each box by its center point and size:
//!
//! ```json
//! {
//!   "image": { "width": 640, "height": 480 },
//!   "predictions": [
//!     { "x": 100.0, "y": 120.0, "width": 80.0, "height": 110.0,
//!       "confidence": 0.92, "class": "9D" }
//!   ]
//! }
//! ```
//!
//! A bare array of predictions is accepted as well.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geometry::{BoundingBox, ImageExtent};
use crate::postprocess::Detection;
use crate::source::DetectionSource;
use crate::validation::validate_unit_range;

/// One predicted object in center format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Box center x.
    pub x: f32,
    /// Box center y.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl Prediction {
    /// Convert to a corner-format [`Detection`].
    pub fn to_detection(&self) -> CoreResult<Detection> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::InvalidArgument(format!(
                "prediction geometry must be finite, got {values:?}"
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CoreError::InvalidArgument(format!(
                "prediction size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        validate_unit_range(self.confidence, "prediction confidence")?;

        Ok(Detection {
            bbox: BoundingBox::from_center(self.x, self.y, self.width, self.height),
            score: self.confidence,
            label: self.class_name.clone(),
        })
    }
}

/// Image size echoed back by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionImage {
    pub width: u32,
    pub height: u32,
}

/// All predictions for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PredictionImage>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionPayload {
    Wrapped(PredictionSet),
    Bare(Vec<Prediction>),
}

impl PredictionSet {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let payload: PredictionPayload =
            serde_json::from_str(json).context("failed to parse prediction JSON")?;
        Ok(match payload {
            PredictionPayload::Wrapped(set) => set,
            PredictionPayload::Bare(predictions) => PredictionSet {
                image: None,
                predictions,
            },
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read predictions {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("invalid predictions in {}", path.display()))
    }

    /// Corner-format detections in file order. Fails on the first malformed entry.
    pub fn to_detections(&self) -> CoreResult<Vec<Detection>> {
        self.predictions
            .iter()
            .enumerate()
            .map(|(index, prediction)| {
                prediction.to_detection().map_err(|CoreError::InvalidArgument(msg)| {
                    CoreError::InvalidArgument(format!("prediction {index}: {msg}"))
                })
            })
            .collect()
    }

    pub fn extent(&self) -> Option<ImageExtent> {
        self.image.map(|image| ImageExtent::new(image.width, image.height))
    }
}

/// A predictions JSON file on disk acting as a detection source.
#[derive(Debug, Clone)]
pub struct PredictionFile {
    path: PathBuf,
    set: PredictionSet,
}

impl PredictionFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let set = PredictionSet::load(&path)?;
        Ok(Self { path, set })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn predictions(&self) -> &PredictionSet {
        &self.set
    }
}

impl DetectionSource for PredictionFile {
    fn detect(&self) -> Result<Vec<Detection>> {
        self.set
            .to_detections()
            .with_context(|| format!("invalid prediction in {}", self.path.display()))
    }

    fn extent_hint(&self) -> Option<ImageExtent> {
        self.set.extent()
    }
}
