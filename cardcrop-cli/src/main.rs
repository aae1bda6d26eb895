mod args;
mod config;
mod export;
mod fetch;
mod input;
mod types;

use std::{
    collections::HashSet,
    fs::{self, File},
    path::Path,
};

use anyhow::{Context, Result};
use cardcrop_core::{
    Pipeline, PipelineParams, PostprocessConfig, PredictionSet, apply_postprocess,
};
use cardcrop_utils::{
    OutputOptions, config::AppSettings, configure_telemetry, init_logging, normalize_path,
};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use crate::args::{Cli, Command, CropArgs, FetchArgs, SuppressArgs};
use crate::config::{apply_cli_overrides, load_settings};
use crate::fetch::Destination;
use crate::types::{DetectionRecord, SuppressReport};

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_ref())?;
    apply_cli_overrides(&mut settings, &cli);

    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    match &cli.command {
        Command::Suppress(args) => run_suppress(args, &settings),
        Command::Crop(args) => run_crop(args, &settings),
        Command::Fetch(args) => run_fetch(args, &settings),
    }
}

fn run_suppress(args: &SuppressArgs, settings: &AppSettings) -> Result<()> {
    let predictions_path = normalize_path(&args.predictions)?;
    let set = PredictionSet::load(&predictions_path)?;
    let detections = set.to_detections()?;

    let config = PostprocessConfig::from(&settings.detection);
    let kept = apply_postprocess(&detections, &config)?;
    info!(
        "{}: kept {} of {} detection(s)",
        predictions_path.display(),
        kept.len(),
        detections.len()
    );

    let report = SuppressReport {
        predictions: predictions_path.display().to_string(),
        candidates: detections.len(),
        kept: kept
            .iter()
            .map(|&index| DetectionRecord::new(index, &detections[index]))
            .collect(),
    };
    write_json(&report, args.json.as_deref(), "detections")
}

fn run_crop(args: &CropArgs, settings: &AppSettings) -> Result<()> {
    let input_path = normalize_path(&args.input)?;
    let predictions = match args.predictions.as_ref() {
        Some(path) => Some(normalize_path(path)?),
        None => None,
    };
    let targets = input::collect_targets(&input_path, predictions.as_deref())?;

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            args.output_dir.display()
        )
    })?;
    let output_dir = normalize_path(&args.output_dir)?;

    let pipeline = Pipeline::new(PipelineParams::from_settings(
        &settings.detection,
        &settings.crop,
    ))?;
    let options = OutputOptions::from_crop_settings(&settings.crop);

    let params = pipeline.params();
    info!(
        "Processing {} image(s) with IoU threshold {} and padding {}px...",
        targets.len(),
        params.postprocess.iou_threshold,
        params.padding
    );
    let mut results = Vec::with_capacity(targets.len());
    let mut written = HashSet::new();
    for target in &targets {
        match export::crop_target(target, &pipeline, &options, &output_dir, &mut written) {
            Ok(crops) => results.push(crops),
            Err(err) => warn!("Failed to process {}: {err:#}", target.image.display()),
        }
    }

    if results.is_empty() {
        anyhow::bail!("all images failed; no crops were produced");
    }

    let saved: usize = results
        .iter()
        .map(|image| image.crops.iter().filter(|c| c.output.is_some()).count())
        .sum();
    info!("Saved {saved} crop(s) to {}", output_dir.display());

    if let Some(json_path) = args.json.as_deref() {
        write_json(&results, Some(json_path), "crop summary")?;
    }
    Ok(())
}

fn run_fetch(args: &FetchArgs, settings: &AppSettings) -> Result<()> {
    let destination = match args.output.as_ref() {
        Some(path) => Destination::File(path.clone()),
        None => Destination::Numbered(settings.acquisition.save_dir.clone()),
    };
    let saved = fetch::run_fetch(
        &settings.acquisition,
        &destination,
        args.count,
        args.keep_partial,
    )?;
    info!("Fetched {} photo(s)", saved.len());
    Ok(())
}

/// Pretty-print `value` to `path`, or to stdout when no path is given.
fn write_json<T: Serialize>(value: &T, path: Option<&Path>, what: &str) -> Result<()> {
    if let Some(json_path) = path {
        if let Some(dir) = json_path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let file = File::create(json_path)
            .with_context(|| format!("failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, value)
            .with_context(|| format!("failed to write {what} JSON to {}", json_path.display()))?;
        info!("Wrote {what} to {}", json_path.display());
    } else {
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {what}"))?;
        println!("{json}");
    }
    Ok(())
}
