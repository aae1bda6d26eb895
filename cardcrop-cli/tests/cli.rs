use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use cardcrop_utils::fixture_path;
use image::{GenericImageView, ImageBuffer, Rgb};
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Deserialize)]
struct DetectionRecord {
    index: usize,
    bbox: [f32; 4],
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuppressReport {
    candidates: usize,
    kept: Vec<DetectionRecord>,
}

#[derive(Debug, Deserialize)]
struct CropRecord {
    index: usize,
    region: [f32; 4],
    output: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageCrops {
    width: u32,
    height: u32,
    crops: Vec<CropRecord>,
}

fn write_table_image(path: &Path, width: u32, height: u32) -> Result<(), Box<dyn Error>> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let r = ((x + y) % 255) as u8;
        Rgb([r, 96, 255u8.saturating_sub(r)])
    });
    img.save(path)?;
    Ok(())
}

#[test]
fn suppress_prints_surviving_detections() -> Result<(), Box<dyn Error>> {
    let predictions = fixture_path("predictions/overlapping_cards.json")?;

    let output = cargo_bin_cmd!("cardcrop")
        .arg("suppress")
        .arg("--predictions")
        .arg(&predictions)
        .output()?;
    assert!(output.status.success(), "suppress failed: {output:?}");

    let report: SuppressReport = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report.candidates, 6);
    let kept: Vec<usize> = report.kept.iter().map(|d| d.index).collect();
    assert_eq!(kept, vec![0, 2, 4]);
    assert_eq!(report.kept[0].bbox, [60.0, 65.0, 140.0, 175.0]);
    assert_eq!(report.kept[2].label.as_deref(), Some("AS"));
    Ok(())
}

#[test]
fn suppress_threshold_override_and_json_file() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let json_path = work_dir.path().join("reports/kept.json");
    let predictions = fixture_path("predictions/overlapping_cards.json")?;

    cargo_bin_cmd!("cardcrop")
        .arg("suppress")
        .arg("--predictions")
        .arg(&predictions)
        .arg("--score-threshold")
        .arg("0.0")
        .arg("--iou-threshold")
        .arg("1.0")
        .arg("--json")
        .arg(&json_path)
        .assert()
        .success();

    let report: SuppressReport = serde_json::from_str(&fs::read_to_string(&json_path)?)?;
    assert_eq!(report.kept.len(), 6);
    Ok(())
}

#[test]
fn suppress_rejects_out_of_range_threshold() -> Result<(), Box<dyn Error>> {
    let predictions = fixture_path("predictions/overlapping_cards.json")?;
    cargo_bin_cmd!("cardcrop")
        .arg("suppress")
        .arg("--predictions")
        .arg(&predictions)
        .arg("--iou-threshold")
        .arg("1.5")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn crop_directory_saves_one_file_per_card() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_dir = work_dir.path().join("input");
    let output_dir = work_dir.path().join("crops");
    let summary_path = work_dir.path().join("summary.json");
    fs::create_dir_all(&input_dir)?;

    write_table_image(&input_dir.join("table.png"), 640, 480)?;
    fs::copy(
        fixture_path("predictions/overlapping_cards.json")?,
        input_dir.join("table.json"),
    )?;
    // No predictions next to this one; it is skipped.
    write_table_image(&input_dir.join("other.png"), 32, 32)?;

    cargo_bin_cmd!("cardcrop")
        .arg("crop")
        .arg("--input")
        .arg(&input_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--json")
        .arg(&summary_path)
        .assert()
        .success();

    for (name, dims) in [
        ("x60y65.png", (180, 210)),
        ("x255y140.png", (190, 220)),
        ("x450y330.png", (200, 200)),
    ] {
        let crop = image::open(output_dir.join(name))?;
        assert_eq!(crop.dimensions(), dims, "{name}");
    }
    assert_eq!(fs::read_dir(&output_dir)?.count(), 3);

    let summary: Vec<ImageCrops> = serde_json::from_str(&fs::read_to_string(&summary_path)?)?;
    assert_eq!(summary.len(), 1);
    assert_eq!((summary[0].width, summary[0].height), (640, 480));
    let indices: Vec<usize> = summary[0].crops.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 2, 4]);
    assert_eq!(summary[0].crops[2].region, [400.0, 280.0, 600.0, 480.0]);
    Ok(())
}

#[test]
fn crop_skips_regions_outside_the_image() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let image_path = work_dir.path().join("small.png");
    let predictions_path = work_dir.path().join("preds.json");
    let output_dir = work_dir.path().join("out");
    let summary_path = work_dir.path().join("summary.json");

    write_table_image(&image_path, 100, 100)?;
    fs::write(
        &predictions_path,
        r#"[
            { "x": 30, "y": 30, "width": 20, "height": 20, "confidence": 0.9 },
            { "x": 400, "y": 30, "width": 20, "height": 20, "confidence": 0.8 }
        ]"#,
    )?;

    cargo_bin_cmd!("cardcrop")
        .arg("crop")
        .arg("-i")
        .arg(&image_path)
        .arg("-p")
        .arg(&predictions_path)
        .arg("-o")
        .arg(&output_dir)
        .arg("--padding")
        .arg("5")
        .arg("--output-format")
        .arg("jpeg")
        .arg("--naming-template")
        .arg("card_{index}")
        .arg("--json")
        .arg(&summary_path)
        .assert()
        .success();

    let crop = image::open(output_dir.join("card_0.jpg"))?;
    assert_eq!(crop.dimensions(), (30, 30));

    let summary: Vec<ImageCrops> = serde_json::from_str(&fs::read_to_string(&summary_path)?)?;
    assert_eq!(summary[0].crops.len(), 2);
    assert!(summary[0].crops[1].output.is_none());
    Ok(())
}

#[test]
fn crop_keeps_both_cards_sharing_a_corner() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let image_path = work_dir.path().join("nested.png");
    let predictions_path = work_dir.path().join("nested.json");
    let output_dir = work_dir.path().join("out");
    let summary_path = work_dir.path().join("summary.json");

    write_table_image(&image_path, 200, 200)?;
    // A small card inside a large one: low IoU, same top-left corner.
    fs::write(
        &predictions_path,
        r#"[
            { "x": 5, "y": 5, "width": 10, "height": 10, "confidence": 0.9 },
            { "x": 50, "y": 50, "width": 100, "height": 100, "confidence": 0.8 }
        ]"#,
    )?;

    cargo_bin_cmd!("cardcrop")
        .arg("crop")
        .arg("-i")
        .arg(&image_path)
        .arg("-o")
        .arg(&output_dir)
        .arg("--padding")
        .arg("0")
        .arg("--json")
        .arg(&summary_path)
        .assert()
        .success();

    assert_eq!(fs::read_dir(&output_dir)?.count(), 2);
    assert_eq!(image::open(output_dir.join("x0y0.png"))?.dimensions(), (10, 10));
    assert_eq!(image::open(output_dir.join("x0y0_2.png"))?.dimensions(), (100, 100));

    let summary: Vec<ImageCrops> = serde_json::from_str(&fs::read_to_string(&summary_path)?)?;
    let outputs: Vec<&str> = summary[0]
        .crops
        .iter()
        .filter_map(|c| c.output.as_deref())
        .collect();
    assert_eq!(outputs.len(), 2);
    assert_ne!(outputs[0], outputs[1]);
    Ok(())
}

#[test]
fn crop_honours_settings_file() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let image_path = work_dir.path().join("table.png");
    let config_path = work_dir.path().join("settings.json");
    let output_dir = work_dir.path().join("out");

    write_table_image(&image_path, 640, 480)?;
    fs::copy(
        fixture_path("predictions/overlapping_cards.json")?,
        work_dir.path().join("table.json"),
    )?;
    fs::write(&config_path, r#"{ "crop": { "padding": 0.0 } }"#)?;

    cargo_bin_cmd!("cardcrop")
        .arg("--config")
        .arg(&config_path)
        .arg("crop")
        .arg("-i")
        .arg(&image_path)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .success();

    let crop = image::open(output_dir.join("x60y65.png"))?;
    assert_eq!(crop.dimensions(), (80, 110));
    Ok(())
}

#[test]
fn fetch_reports_unavailable_port() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    cargo_bin_cmd!("cardcrop")
        .arg("fetch")
        .arg("--port")
        .arg(work_dir.path().join("no-such-tty"))
        .arg("--settle-ms")
        .arg("0")
        .arg("--save-dir")
        .arg(work_dir.path())
        .assert()
        .failure();
    Ok(())
}
