//! Command-line argument definitions for cardcrop.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Suppress duplicate card detections, crop the survivors, and fetch photos
/// from a serial camera.
#[derive(Debug, Parser)]
#[command(name = "cardcrop", author, version, about)]
pub struct Cli {
    /// Optional settings JSON. Defaults to `config/cardcrop.json` when present, otherwise built-in parameters.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run non-maximum suppression over a predictions file and report the survivors.
    Suppress(SuppressArgs),
    /// Crop every surviving card out of one image or a directory of images.
    Crop(CropArgs),
    /// Request photos from the camera module over a serial link.
    Fetch(FetchArgs),
}

/// Detection filtering overrides shared by `suppress` and `crop`.
#[derive(Debug, Args, Default)]
pub struct DetectionOverrides {
    /// Override score threshold.
    #[arg(long)]
    pub score_threshold: Option<f32>,

    /// Override IoU threshold above which overlapping detections are dropped.
    #[arg(long)]
    pub iou_threshold: Option<f32>,

    /// Override top_k limit (0 keeps every candidate).
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SuppressArgs {
    /// Predictions JSON (hosted-inference response or bare array).
    #[arg(short, long)]
    pub predictions: PathBuf,

    #[command(flatten)]
    pub detection: DetectionOverrides,

    /// Write surviving detections to a JSON file instead of stdout.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CropArgs {
    /// Path to an image file or a directory containing images.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Predictions JSON for a single input image. Defaults to `<stem>.json` next to each image.
    #[arg(short, long)]
    pub predictions: Option<PathBuf>,

    /// Output directory for cropped card images.
    #[arg(short, long)]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub detection: DetectionOverrides,

    /// Override margin in pixels added around each detection.
    #[arg(long)]
    pub padding: Option<f32>,

    /// Output format: png, jpeg, webp or bmp.
    #[arg(long, value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// JPEG quality (1-100).
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// File stem template; `{x}`, `{y}`, `{index}` and `{score}` are substituted.
    #[arg(long, value_name = "TEMPLATE")]
    pub naming_template: Option<String>,

    /// Write a JSON summary of the crops to this file.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Serial device (e.g. /dev/ttyUSB0 or COM10).
    #[arg(long)]
    pub port: Option<String>,

    /// Override serial baud rate.
    #[arg(long)]
    pub baud_rate: Option<u32>,

    /// Override per-read timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Override the pause after opening the port, in milliseconds.
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Exact output file; only valid when fetching a single photo.
    #[arg(short, long, conflicts_with = "count")]
    pub output: Option<PathBuf>,

    /// Directory for numbered `photo_<n>.jpg` files.
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Number of photos to request.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Save the received bytes even when the transfer ends early.
    #[arg(long, action = ArgAction::SetTrue)]
    pub keep_partial: bool,
}
