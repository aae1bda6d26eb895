//! Input collection and predictions pairing.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// An image together with the predictions file describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropTarget {
    pub image: PathBuf,
    pub predictions: PathBuf,
}

/// Collect all image paths from a file or directory.
pub fn collect_images(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!(
            "input path is neither file nor directory: {}",
            path.display()
        );
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
            let ext_lower = ext.to_ascii_lowercase();
            if IMAGE_EXTENSIONS.contains(&ext_lower.as_str()) {
                images.push(entry.path().to_path_buf());
            } else {
                debug!("Skipping non-image file {}", entry.path().display());
            }
        }
    }
    images.sort();
    Ok(images)
}

/// `<stem>.json` next to the image.
pub fn sibling_predictions(image: &Path) -> PathBuf {
    image.with_extension("json")
}

/// Resolve the images to crop and the predictions file for each.
///
/// An explicit predictions file is only accepted for a single image. Images
/// without a sibling predictions file are skipped with a warning.
pub fn collect_targets(input: &Path, predictions: Option<&Path>) -> Result<Vec<CropTarget>> {
    if let Some(predictions) = predictions {
        anyhow::ensure!(
            input.is_file(),
            "--predictions requires a single input image, got {}",
            input.display()
        );
        return Ok(vec![CropTarget {
            image: input.to_path_buf(),
            predictions: predictions.to_path_buf(),
        }]);
    }

    let images = collect_images(input)?;
    if images.is_empty() {
        anyhow::bail!(
            "no images found at {} (supported extensions: {})",
            input.display(),
            IMAGE_EXTENSIONS.join(", ")
        );
    }

    let mut targets = Vec::with_capacity(images.len());
    for image in images {
        let predictions = sibling_predictions(&image);
        if predictions.is_file() {
            targets.push(CropTarget { image, predictions });
        } else {
            warn!(
                "Skipping {}: no predictions file at {}",
                image.display(),
                predictions.display()
            );
        }
    }

    if targets.is_empty() {
        anyhow::bail!("no images under {} have a predictions file", input.display());
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn pairs_images_with_sibling_json() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir(root.join("nested")).expect("mkdir");
        for name in ["b.png", "a.JPG", "nested/c.webp", "notes.txt", "a.json", "nested/c.json"] {
            fs::write(root.join(name), b"").expect("touch");
        }

        let targets = collect_targets(root, None).expect("targets");
        let images: Vec<_> = targets
            .iter()
            .map(|t| t.image.strip_prefix(root).expect("prefix").to_path_buf())
            .collect();
        // b.png has no predictions and is skipped.
        assert_eq!(images, [PathBuf::from("a.JPG"), PathBuf::from("nested/c.webp")]);
        assert_eq!(targets[0].predictions, root.join("a.json"));
    }

    #[test]
    fn explicit_predictions_need_a_single_file() {
        let dir = tempdir().expect("tempdir");
        assert!(collect_targets(dir.path(), Some(Path::new("p.json"))).is_err());

        let image = dir.path().join("card.png");
        fs::write(&image, b"").expect("touch");
        let targets = collect_targets(&image, Some(Path::new("p.json"))).expect("targets");
        assert_eq!(targets[0].predictions, PathBuf::from("p.json"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().expect("tempdir");
        assert!(collect_images(&dir.path().join("absent")).is_err());
    }
}
