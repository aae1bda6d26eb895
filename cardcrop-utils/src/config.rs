//! Shared configuration types consumed across the cardcrop workspace.
//!
//! Every threshold, margin and device parameter the pipeline needs lives here
//! so it can be serialized to disk and overridden from the command line,
//! instead of being fixed in code.

use crate::acquire::{AcquisitionConfig, DEFAULT_CHUNK_SIZE, DEFAULT_TRIGGER};

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Detection filtering and suppression parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionSettings {
    /// Candidates scoring below this are discarded before suppression.
    pub score_threshold: f32,
    /// Overlap above which a lower-scoring candidate is suppressed.
    pub iou_threshold: f32,
    /// Keep at most this many candidates (by score) before suppression; 0 keeps all.
    pub top_k: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            score_threshold: 0.10,
            iou_threshold: 0.9,
            top_k: 0,
        }
    }
}

/// Settings for crop extraction and export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CropSettings {
    /// Margin in pixels added on every side of a detection before clamping.
    pub padding: f32,
    /// Output format: "png", "jpeg", "webp" or "bmp".
    pub output_format: String,
    /// JPEG quality (1-100), only used for jpeg output.
    pub jpeg_quality: u8,
    /// File stem template; `{x}`, `{y}`, `{index}` and `{score}` are substituted.
    pub name_template: String,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            padding: 50.0,
            output_format: "png".to_string(),
            jpeg_quality: 90,
            name_template: "x{x}y{y}".to_string(),
        }
    }
}

/// Serial link parameters for fetching photos from the camera module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// Serial device path (e.g. `/dev/ttyUSB0` or `COM10`).
    pub port: String,
    pub baud_rate: u32,
    /// Timeout applied to every individual read.
    pub timeout_ms: u64,
    pub chunk_size: usize,
    /// Request byte sent to the camera.
    pub trigger: u8,
    /// Pause after opening the port; the module resets when the line opens.
    pub settle_ms: u64,
    /// Directory fetched photos are written to.
    pub save_dir: PathBuf,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 921_600,
            timeout_ms: 5_000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            trigger: DEFAULT_TRIGGER,
            settle_ms: 2_000,
            save_dir: PathBuf::from("camera_images"),
        }
    }
}

impl AcquisitionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl From<&AcquisitionSettings> for AcquisitionConfig {
    fn from(settings: &AcquisitionSettings) -> Self {
        AcquisitionConfig {
            trigger: settings.trigger,
            chunk_size: settings.chunk_size.max(1),
        }
    }
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetrySettings {
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string, defaulting to `Debug` when unknown.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::Debug)
    }
}

/// Persistent settings consumed by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub detection: DetectionSettings,
    pub crop: CropSettings,
    pub acquisition: AcquisitionSettings,
    pub telemetry: TelemetrySettings,
}

impl AppSettings {
    /// Load settings from a JSON file; missing sections fall back to defaults.
    ///
    /// Unknown keys are ignored, so a settings file written by a newer build
    /// still loads.
    ///
    /// # Arguments
    ///
    /// * `path` - JSON file previously written by [`AppSettings::save_to_path`]
    ///   or by hand.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))
    }

    /// Serialize settings to disk as pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }
}

/// Default location of the persisted settings (`config/cardcrop.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/cardcrop.json"))
        .unwrap_or_else(|_| PathBuf::from("config/cardcrop.json"))
}
