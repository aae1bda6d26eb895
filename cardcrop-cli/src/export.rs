//! Cropping detected cards out of decoded images and saving them.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use cardcrop_core::{DetectionSource, ImageExtent, Pipeline, PredictionFile};
use cardcrop_utils::{OutputOptions, append_suffix_to_filename, save_dynamic_image};
use image::{DynamicImage, GenericImageView};
use log::{info, warn};

use crate::input::CropTarget;
use crate::types::{CropRecord, ImageCrops};

/// Run the pipeline for one image and write a file per non-empty region.
///
/// `written` holds every path produced so far in this run; a name that is
/// already taken gets a `_2`, `_3`, ... suffix instead of overwriting.
pub fn crop_target(
    target: &CropTarget,
    pipeline: &Pipeline,
    options: &OutputOptions,
    output_dir: &Path,
    written: &mut HashSet<PathBuf>,
) -> Result<ImageCrops> {
    let image = image::open(&target.image)
        .with_context(|| format!("failed to open image {}", target.image.display()))?;
    let (width, height) = image.dimensions();
    let extent = ImageExtent::new(width, height);

    let source = PredictionFile::open(&target.predictions)?;
    if let Some(reported) = source.extent_hint()
        && reported != extent
    {
        warn!(
            "{}: predictions were made on a {}x{} image but the file is {}x{}",
            target.image.display(),
            reported.width,
            reported.height,
            width,
            height
        );
    }

    let output = pipeline.run_source(&source, extent)?;
    info!(
        "{} -> {} of {} card(s) kept",
        target.image.display(),
        output.kept.len(),
        source.predictions().predictions.len()
    );

    let mut crops = Vec::with_capacity(output.regions.len());
    for (position, (region, &index)) in output.regions.iter().zip(&output.kept).enumerate() {
        let Some((x, y, w, h)) = region.pixel_rect() else {
            warn!(
                "Skipping detection {index} in {}: region is empty after clipping",
                target.image.display()
            );
            crops.push(CropRecord::new(index, region, None));
            continue;
        };

        let corner = region.detection.bbox;
        let file_name = options.file_name(position, corner.x1, corner.y1, region.detection.score);
        let destination = reserve_destination(output_dir, &file_name, written);
        let crop = crop_pixels(&image, x, y, w, h);
        save_dynamic_image(&crop, &destination, options)?;
        info!("Saved {}", destination.display());

        crops.push(CropRecord::new(
            index,
            region,
            Some(destination.display().to_string()),
        ));
    }

    Ok(ImageCrops {
        image: target.image.display().to_string(),
        width,
        height,
        crops,
    })
}

fn reserve_destination(dir: &Path, file_name: &str, written: &mut HashSet<PathBuf>) -> PathBuf {
    let mut candidate = dir.join(file_name);
    let mut n = 2;
    while written.contains(&candidate) {
        candidate = dir.join(append_suffix_to_filename(file_name, &format!("_{n}")));
        n += 1;
    }
    written.insert(candidate.clone());
    candidate
}

fn crop_pixels(image: &DynamicImage, x: u32, y: u32, width: u32, height: u32) -> DynamicImage {
    // Rounded edges may reach one past the last pixel.
    let w = width.min(image.width().saturating_sub(x));
    let h = height.min(image.height().saturating_sub(y));
    image.crop_imm(x, y, w, h)
}
