//! Helpers for naming and encoding exported crops.

use crate::config::CropSettings;

use anyhow::{Context, Result};
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat,
    codecs::{jpeg::JpegEncoder, png::PngEncoder, webp::WebPEncoder},
};
use log::debug;
use std::{fs, path::Path};

/// Image formats the exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormatHint {
    #[default]
    Png,
    Jpeg,
    Webp,
    Bmp,
}

impl ImageFormatHint {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }
}

impl std::str::FromStr for ImageFormatHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "bmp" => Ok(Self::Bmp),
            other => Err(format!("unknown image format '{other}'")),
        }
    }
}

/// Export options resolved from [`CropSettings`].
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: ImageFormatHint,
    pub jpeg_quality: u8,
    pub name_template: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::from_crop_settings(&CropSettings::default())
    }
}

impl OutputOptions {
    /// Unknown format strings fall back to PNG.
    pub fn from_crop_settings(settings: &CropSettings) -> Self {
        Self {
            format: settings.output_format.parse().unwrap_or_default(),
            jpeg_quality: settings.jpeg_quality.clamp(1, 100),
            name_template: settings.name_template.clone(),
        }
    }

    /// File name for the crop of detection number `index` whose unpadded box
    /// starts at (`x`, `y`).
    pub fn file_name(&self, index: usize, x: f32, y: f32, score: f32) -> String {
        crop_file_name(&self.name_template, index, x, y, score, self.format)
    }
}

/// Expand a crop name template.
///
/// `{x}` and `{y}` are the truncated top-left corner of the detection,
/// `{index}` its position in the output and `{score}` its confidence as a
/// whole percentage. The extension for `format` is appended.
///
/// The default `x{x}y{y}` template is not unique on its own: two kept
/// detections may share a corner. Callers writing several crops into one
/// directory should disambiguate with [`append_suffix_to_filename`].
///
/// # Arguments
///
/// * `template` - File stem with `{x}`, `{y}`, `{index}` and `{score}` placeholders.
/// * `index` - Position of the crop among the image's kept detections.
/// * `x`, `y` - Top-left corner of the unpadded detection box.
/// * `score` - Detection confidence in `[0, 1]`.
/// * `format` - Output format whose extension is appended.
pub fn crop_file_name(
    template: &str,
    index: usize,
    x: f32,
    y: f32,
    score: f32,
    format: ImageFormatHint,
) -> String {
    let stem = template
        .replace("{x}", &(x as i64).to_string())
        .replace("{y}", &(y as i64).to_string())
        .replace("{index}", &index.to_string())
        .replace("{score}", &((score * 100.0).round() as i64).to_string());
    format!("{stem}.{}", format.extension())
}

/// Append a suffix to a filename, preserving the existing extension.
pub fn append_suffix_to_filename(name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return name.to_string();
    }
    if let Some(idx) = name.rfind('.') {
        let (base, ext) = name.split_at(idx);
        format!("{base}{suffix}{ext}")
    } else {
        format!("{name}{suffix}")
    }
}

/// Encode `image` with `options` and write it to `destination`, creating
/// parent directories as needed.
///
/// PNG and WebP are written lossless from RGBA; JPEG drops alpha and uses
/// `options.jpeg_quality`.
///
/// # Arguments
///
/// * `image` - The crop to encode.
/// * `destination` - Target file; an existing file is replaced.
/// * `options` - Format and quality settings.
pub fn save_dynamic_image(
    image: &DynamicImage,
    destination: &Path,
    options: &OutputOptions,
) -> Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.exists()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    debug!(
        "Saving crop to {} as {:?}",
        destination.display(),
        options.format
    );
    let encoded = match options.format {
        ImageFormatHint::Png => encode_rgba(image, |buf, rgba| {
            PngEncoder::new(buf).write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
        })
        .context("failed to encode PNG")?,
        ImageFormatHint::Jpeg => {
            let rgb = image.to_rgb8();
            let mut buffer = Vec::new();
            JpegEncoder::new_with_quality(&mut buffer, options.jpeg_quality)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .context("failed to encode JPEG")?;
            buffer
        }
        ImageFormatHint::Webp => encode_rgba(image, |buf, rgba| {
            WebPEncoder::new_lossless(buf).write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
        })
        .context("failed to encode WebP")?,
        ImageFormatHint::Bmp => {
            let mut cursor = std::io::Cursor::new(Vec::new());
            image
                .write_to(&mut cursor, ImageFormat::Bmp)
                .context("failed to encode BMP")?;
            cursor.into_inner()
        }
    };

    fs::write(destination, encoded)
        .with_context(|| format!("failed to write {}", destination.display()))
}

fn encode_rgba<F>(image: &DynamicImage, encode: F) -> image::ImageResult<Vec<u8>>
where
    F: FnOnce(&mut Vec<u8>, &image::RgbaImage) -> image::ImageResult<()>,
{
    let rgba = image.to_rgba8();
    let mut buffer = Vec::new();
    encode(&mut buffer, &rgba)?;
    Ok(buffer)
}
