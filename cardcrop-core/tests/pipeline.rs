use cardcrop_core::{
    BoundingBox, DetectionSource, ImageExtent, Pipeline, PipelineParams, PredictionFile,
    PredictionSet, suppress,
};
use cardcrop_utils::{OutputOptions, fixture_path, load_fixture_bytes};

fn overlapping_cards() -> PredictionSet {
    let bytes = load_fixture_bytes("predictions/overlapping_cards.json").expect("fixture");
    let json = String::from_utf8(bytes).expect("utf8 fixture");
    PredictionSet::from_json_str(&json).expect("parse fixture")
}

#[test]
fn default_pipeline_keeps_one_detection_per_card() {
    let set = overlapping_cards();
    let detections = set.to_detections().expect("detections");
    let extent = set.extent().expect("fixture reports image size");

    let pipeline = Pipeline::new(PipelineParams::default()).expect("pipeline");
    let output = pipeline.run(&detections, extent).expect("run");

    // Near-duplicates and the low-confidence 2C are gone; the 0.88 tie keeps
    // the earlier index.
    assert_eq!(output.kept, vec![0, 2, 4]);
    let boxes: Vec<BoundingBox> = output.regions.iter().map(|r| r.bbox).collect();
    assert_eq!(
        boxes,
        vec![
            BoundingBox::new(10.0, 15.0, 190.0, 225.0),
            BoundingBox::new(205.0, 90.0, 395.0, 310.0),
            BoundingBox::new(400.0, 280.0, 600.0, 480.0),
        ]
    );
    let labels: Vec<_> = output
        .regions
        .iter()
        .map(|r| r.detection.label.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(labels, ["9D", "KH", "AS"]);
}

#[test]
fn suppression_alone_has_no_score_floor() {
    let detections = overlapping_cards().to_detections().expect("detections");
    let kept = suppress(&detections, 0.9).expect("suppress");
    assert_eq!(kept, vec![0, 2, 4, 5]);
}

#[test]
fn threshold_of_one_keeps_everything() {
    let detections = overlapping_cards().to_detections().expect("detections");
    let mut kept = suppress(&detections, 1.0).expect("suppress");
    kept.sort_unstable();
    assert_eq!(kept, (0..detections.len()).collect::<Vec<_>>());
}

#[test]
fn file_names_come_from_the_unpadded_corner() {
    let set = overlapping_cards();
    let pipeline = Pipeline::new(PipelineParams::default()).expect("pipeline");
    let output = pipeline
        .run(&set.to_detections().expect("detections"), ImageExtent::new(640, 480))
        .expect("run");

    let options = OutputOptions::default();
    let names: Vec<String> = output
        .regions
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let corner = r.detection.bbox;
            options.file_name(i, corner.x1, corner.y1, r.detection.score)
        })
        .collect();
    assert_eq!(names, ["x60y65.png", "x255y140.png", "x450y330.png"]);
}

#[test]
fn prediction_file_source_feeds_the_pipeline() {
    let path = fixture_path("predictions/bare_array.json").expect("fixture");
    let source = PredictionFile::open(&path).expect("open");
    assert!(source.extent_hint().is_none());

    let pipeline = Pipeline::new(PipelineParams::default()).expect("pipeline");
    let output = pipeline
        .run_source(&source, ImageExtent::new(200, 120))
        .expect("run");

    // Highest score first.
    assert_eq!(output.kept, vec![1, 0]);
    assert_eq!(output.regions[0].detection.label.as_deref(), Some("QS"));
    assert_eq!(
        output.regions[0].bbox,
        BoundingBox::new(80.0, 10.0, 200.0, 120.0)
    );
}
