//! Fetching photos from the camera module over a serial link.

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
    thread,
};

use anyhow::{Context, Result};
use cardcrop_utils::{
    AcquireError, AcquisitionConfig, config::AcquisitionSettings, request_image, timing_guard,
};
use log::{info, warn};

/// Where fetched photos go.
#[derive(Debug, Clone)]
pub enum Destination {
    /// One exact file.
    File(PathBuf),
    /// Numbered `photo_<n>.jpg` files in a directory.
    Numbered(PathBuf),
}

/// Open the configured serial port, wait for the module to settle and fetch
/// `count` photos.
pub fn run_fetch(
    settings: &AcquisitionSettings,
    destination: &Destination,
    count: u32,
    keep_partial: bool,
) -> Result<Vec<PathBuf>> {
    info!("Opening {} at {} baud", settings.port, settings.baud_rate);
    let mut port = serialport::new(&settings.port, settings.baud_rate)
        .timeout(settings.timeout())
        .open()
        .with_context(|| format!("failed to open serial port {}", settings.port))?;

    let settle = settings.settle_delay();
    if !settle.is_zero() {
        info!("Waiting {settle:?} for the camera to reset");
        thread::sleep(settle);
    }

    fetch_photos(
        port.as_mut(),
        &AcquisitionConfig::from(settings),
        destination,
        count,
        keep_partial,
    )
}

/// Request `count` photos over an already-open port and write each to disk.
///
/// Failed requests are logged and the loop carries on; the call errors only
/// after every request has been attempted.
pub fn fetch_photos<T>(
    port: &mut T,
    config: &AcquisitionConfig,
    destination: &Destination,
    count: u32,
    keep_partial: bool,
) -> Result<Vec<PathBuf>>
where
    T: Read + Write + ?Sized,
{
    let mut saved = Vec::new();
    let mut failures = 0u32;
    let mut next_index = 1u32;

    for request in 1..=count {
        let payload = {
            let _guard = timing_guard("cardcrop_cli::request_image", log::Level::Debug);
            request_image(port, config)
        };
        let (bytes, complete) = match payload {
            Ok(bytes) => (bytes, true),
            Err(err @ AcquireError::ShortRead { .. }) if keep_partial => {
                warn!("Request {request}: {err}; keeping partial payload");
                match err.into_partial() {
                    Some(bytes) if !bytes.is_empty() => (bytes, false),
                    _ => {
                        failures += 1;
                        continue;
                    }
                }
            }
            Err(err) => {
                warn!("Request {request} failed: {err}");
                failures += 1;
                continue;
            }
        };

        let path = match destination {
            Destination::File(path) => path.clone(),
            Destination::Numbered(dir) => {
                let (path, index) = next_photo_path(dir, next_index);
                next_index = index + 1;
                path
            }
        };
        write_photo(&path, &bytes)?;
        info!(
            "Saved {} ({} bytes{})",
            path.display(),
            bytes.len(),
            if complete { "" } else { ", incomplete" }
        );
        saved.push(path);
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {count} image request(s) failed");
    }
    Ok(saved)
}

/// First `photo_<n>.jpg` in `dir` with `n >= start` that does not exist yet.
fn next_photo_path(dir: &Path, start: u32) -> (PathBuf, u32) {
    let mut index = start;
    loop {
        let candidate = dir.join(format!("photo_{index}.jpg"));
        if !candidate.exists() {
            return (candidate, index);
        }
        index += 1;
    }
}

fn write_photo(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
