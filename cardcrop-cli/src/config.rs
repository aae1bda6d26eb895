//! Configuration loading and CLI override logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cardcrop_utils::{
    config::{AppSettings, default_settings_path},
    normalize_path,
};
use log::{info, warn};

use crate::args::{Cli, Command, CropArgs, DetectionOverrides, FetchArgs};

/// Load application settings from a file or use defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        Ok(settings)
    } else {
        let default_path = default_settings_path();
        if default_path.exists() {
            let settings = AppSettings::load_from_path(&default_path).with_context(|| {
                format!(
                    "failed to load default settings from {}",
                    default_path.display()
                )
            })?;
            info!("Loaded settings from {}", default_path.display());
            Ok(settings)
        } else {
            Ok(AppSettings::default())
        }
    }
}

/// Apply command-line arguments to override loaded or default settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, cli: &Cli) {
    if cli.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(level) = cli.telemetry_level.as_ref() {
        let normalized = level.trim();
        if !normalized.is_empty() {
            let lower = normalized.to_ascii_lowercase();
            settings.telemetry.level = lower.clone();
            if lower == "off" {
                settings.telemetry.enabled = false;
            }
        }
    }

    match &cli.command {
        Command::Suppress(args) => apply_detection_overrides(settings, &args.detection),
        Command::Crop(args) => {
            apply_detection_overrides(settings, &args.detection);
            apply_crop_overrides(settings, args);
        }
        Command::Fetch(args) => apply_fetch_overrides(settings, args),
    }
}

fn apply_detection_overrides(settings: &mut AppSettings, overrides: &DetectionOverrides) {
    if let Some(score) = overrides.score_threshold {
        settings.detection.score_threshold = score;
    }
    if let Some(iou) = overrides.iou_threshold {
        settings.detection.iou_threshold = iou;
    }
    if let Some(top_k) = overrides.top_k {
        settings.detection.top_k = top_k;
    }
}

fn apply_crop_overrides(settings: &mut AppSettings, args: &CropArgs) {
    if let Some(padding) = args.padding {
        settings.crop.padding = padding;
    }
    if let Some(format) = args.output_format.as_ref() {
        let normalized = format.trim().to_ascii_lowercase();
        if normalized.parse::<cardcrop_utils::ImageFormatHint>().is_err() {
            warn!("Unknown output format '{format}', falling back to png");
        }
        settings.crop.output_format = normalized;
    }
    if let Some(quality) = args.jpeg_quality {
        settings.crop.jpeg_quality = quality.clamp(1, 100);
    }
    if let Some(template) = args.naming_template.as_ref() {
        settings.crop.name_template = template.clone();
    }
}

fn apply_fetch_overrides(settings: &mut AppSettings, args: &FetchArgs) {
    if let Some(port) = args.port.as_ref() {
        settings.acquisition.port = port.clone();
    }
    if let Some(baud) = args.baud_rate {
        settings.acquisition.baud_rate = baud;
    }
    if let Some(timeout) = args.timeout_ms {
        settings.acquisition.timeout_ms = timeout;
    }
    if let Some(settle) = args.settle_ms {
        settings.acquisition.settle_ms = settle;
    }
    if let Some(dir) = args.save_dir.as_ref() {
        settings.acquisition.save_dir = dir.clone();
    }
}
