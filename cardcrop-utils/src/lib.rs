//! Common helpers shared across the cardcrop crates.

/// Framed image requests over a serial link to the camera module.
pub mod acquire;
/// Persisted application settings.
pub mod config;
/// Test fixture loading and path resolution.
pub mod fixtures;
/// Crop export helpers (file naming, encoding).
pub mod output;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use acquire::{AcquireError, AcquisitionConfig, request_image};
pub use fixtures::{fixture_path, fixtures_dir, load_fixture_bytes, load_fixture_json};
pub use output::{
    ImageFormatHint, OutputOptions, append_suffix_to_filename, crop_file_name, save_dynamic_image,
};
pub use telemetry::{
    TimingGuard, configure as configure_telemetry, telemetry_allows, telemetry_enabled,
    timing_guard,
};

/// Initialize logging once for the CLI and tests.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Records on the
/// telemetry target are always let through to the logger, and whether they
/// are produced at all is decided by [`configure_telemetry`].
///
/// Calling this more than once is harmless: later calls leave the installed
/// logger in place.
///
/// # Arguments
///
/// * `default_filter` - Level used when `RUST_LOG` is not set.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(telemetry::TELEMETRY_TARGET, LevelFilter::Trace);

    // A second call (e.g. from tests) finds the logger already installed.
    let _ = builder.try_init();
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
///
/// # Errors
///
/// Fails when the path does not exist or cannot be canonicalized.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
