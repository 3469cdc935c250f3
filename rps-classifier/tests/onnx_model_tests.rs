//! Tests running the tract ONNX backend on a real model file
//!
//! `fixtures/mean_rgb.onnx` is a one-node graph: ReduceMean over axes [1, 2] of a
//! `[1, height, width, 3]` float input, producing `[1, 3]` per-channel means.
//! A uniform image therefore scores exactly its (scaled) RGB values, which makes
//! the expected label and confidence easy to state.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rps_classifier::classifier::{
    Classifier, InferenceBackend, LabelSet, OnnxModel, Preprocessor, UNKNOWN_LABEL,
};
use rps_common::ServiceConfig;
use tract_onnx::prelude::tract_ndarray::Array4;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mean_rgb.onnx")
}

/// Test helper: uniform PNG upload
fn uniform_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Should encode PNG");
    buf.into_inner()
}

fn onnx_classifier(size: u32) -> Classifier {
    let model = OnnxModel::load(&fixture_path(), size, size).expect("Fixture model should load");
    Classifier::new(
        Arc::new(model),
        Preprocessor::square(size),
        LabelSet::default(),
        0.6,
    )
}

#[test]
fn test_infer_flattens_output_to_one_score_per_channel() {
    let model = OnnxModel::load(&fixture_path(), 4, 4).expect("Fixture model should load");

    // Only the last (blue) channel is lit; channels-last layout
    let input = Array4::from_shape_fn((1, 4, 4, 3), |(_, _, _, c)| if c == 2 { 1.0 } else { 0.0 });
    let scores = model.infer(input).expect("Inference should succeed");

    assert_eq!(scores.len(), 3);
    assert!(scores[0].abs() < 1e-6);
    assert!(scores[1].abs() < 1e-6);
    assert!((scores[2] - 1.0).abs() < 1e-6);
}

#[test]
fn test_input_pinned_to_configured_size() {
    let model = OnnxModel::load(&fixture_path(), 8, 8).expect("Fixture model should load");

    let wrong_size = Array4::<f32>::zeros((1, 16, 16, 3));
    assert!(model.infer(wrong_size).is_err());
}

#[test]
fn test_describe_names_model_file() {
    let model = OnnxModel::load(&fixture_path(), 8, 8).unwrap();
    assert!(model.describe().ends_with("mean_rgb.onnx"));
}

#[test]
fn test_classify_end_to_end_confident() {
    let classifier = onnx_classifier(224);

    // Means: 0.2, 0.8, 0.4 → rock
    let prediction = classifier
        .classify(&uniform_png(50, 30, [51, 204, 102]))
        .expect("Classification should succeed");

    assert_eq!(prediction.label, "rock");
    assert_eq!(prediction.class_index, 1);
    assert!((prediction.confidence - 0.8).abs() < 0.005);
}

#[test]
fn test_classify_end_to_end_unknown() {
    let classifier = onnx_classifier(224);

    // All channels ~0.5, below the 0.6 threshold
    let prediction = classifier
        .classify(&uniform_png(20, 20, [128, 120, 110]))
        .expect("Classification should succeed");

    assert_eq!(prediction.label, UNKNOWN_LABEL);
    assert_eq!(prediction.class_index, 0);
    assert!((prediction.confidence - 128.0 / 255.0).abs() < 0.005);
}

#[test]
fn test_classifier_from_config_uses_onnx_model() {
    let config = ServiceConfig {
        model_path: fixture_path(),
        image_size: 32,
        ..ServiceConfig::default()
    };
    let classifier = Classifier::from_config(&config).expect("Fixture model should load");

    let prediction = classifier
        .classify(&uniform_png(64, 64, [20, 30, 240]))
        .expect("Classification should succeed");

    assert_eq!(prediction.label, "scissors");
    assert!(classifier.describe().starts_with("onnx:"));
}
