//! End-to-end checks of the CLI contract: exactly one JSON object on stdout
//! per invocation, and the two-tier exit-code mapping. All runs use the stub
//! backend so no model weights are required.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn facematch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_facematch"))
        .args(args)
        .output()
        .expect("failed to spawn facematch")
}

/// Stdout must be exactly one well-formed JSON object, whatever branch ran.
fn parse_single_json(output: &Output) -> serde_json::Map<String, serde_json::Value> {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let mut lines = stdout.lines().filter(|l| !l.trim().is_empty());
    let line = lines.next().expect("no JSON line on stdout");
    assert!(lines.next().is_none(), "more than one line on stdout: {stdout}");
    serde_json::from_str::<serde_json::Value>(line)
        .expect("stdout line is not valid JSON")
        .as_object()
        .expect("stdout JSON is not an object")
        .clone()
}

fn save_split_image(dir: &Path, name: &str, left: u8, right: u8) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_fn(32, 32, |x, _| {
        if x < 16 {
            image::Rgb([left; 3])
        } else {
            image::Rgb([right; 3])
        }
    });
    img.save(&path).unwrap();
    path
}

fn save_uniform_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(32, 32, image::Rgb([128; 3]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn no_arguments_yields_usage_error_and_nonzero_exit() {
    let output = facematch(&[]);
    assert!(!output.status.success());

    let body = parse_single_json(&output);
    assert_eq!(body.len(), 1);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Missing arguments"));
    assert!(message.contains("Usage"));
}

#[test]
fn one_argument_yields_usage_error_and_nonzero_exit() {
    let output = facematch(&["only-one.png"]);
    assert!(!output.status.success());
    let body = parse_single_json(&output);
    assert!(body["error"].as_str().unwrap().contains("Missing arguments"));
}

#[test]
fn missing_files_yield_error_body_and_nonzero_exit() {
    let output = facematch(&["/no/such/a.png", "/no/such/b.png", "--stub"]);
    assert!(!output.status.success());

    let body = parse_single_json(&output);
    assert_eq!(body.len(), 1);
    assert_eq!(
        body["error"].as_str().unwrap(),
        "One or more image files not found"
    );
}

#[test]
fn empty_file_error_names_both_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_split_image(dir.path(), "a.png", 200, 40);
    let empty = dir.path().join("empty.png");
    std::fs::write(&empty, b"").unwrap();

    let output = facematch(&[a.to_str().unwrap(), empty.to_str().unwrap(), "--stub"]);
    assert!(!output.status.success());

    let body = parse_single_json(&output);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("empty"), "message: {message}");
    assert!(message.contains("0 bytes"), "message: {message}");
}

#[test]
fn undecodable_file_error_names_the_image_and_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_split_image(dir.path(), "a.png", 200, 40);
    let junk = dir.path().join("junk.png");
    std::fs::write(&junk, b"not an image at all").unwrap();

    let output = facematch(&[a.to_str().unwrap(), junk.to_str().unwrap(), "--stub"]);
    assert!(!output.status.success());

    let body = parse_single_json(&output);
    assert_eq!(body.len(), 1);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("could not decode"), "message: {message}");
    assert!(message.contains("junk.png"), "message: {message}");
}

#[test]
fn identical_images_verify_with_the_lenient_override_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_split_image(dir.path(), "a.png", 200, 40);
    let b = save_split_image(dir.path(), "b.png", 200, 40);

    let output = facematch(&[a.to_str().unwrap(), b.to_str().unwrap(), "--stub"]);
    assert!(output.status.success());

    let body = parse_single_json(&output);
    assert_eq!(body.len(), 5);
    assert_eq!(body["verified"], serde_json::json!(true));
    assert_eq!(body["model"], serde_json::json!("Facenet"));
    assert_eq!(body["similarity_metric"], serde_json::json!("cosine"));
    assert!((body["threshold"].as_f64().unwrap() - 0.85).abs() < 1e-6);
    assert!(body["distance"].as_f64().unwrap() < 1e-3);
}

#[test]
fn different_images_report_verified_false_with_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_split_image(dir.path(), "a.png", 255, 0);
    let b = save_split_image(dir.path(), "b.png", 0, 255);

    let output = facematch(&[a.to_str().unwrap(), b.to_str().unwrap(), "--stub"]);
    // A negative verdict is a valid result, not an error.
    assert!(output.status.success());

    let body = parse_single_json(&output);
    assert_eq!(body["verified"], serde_json::json!(false));
    let distance = body["distance"].as_f64().unwrap();
    let threshold = body["threshold"].as_f64().unwrap();
    assert!(distance > threshold);
}

#[test]
fn strict_profile_reports_the_model_default_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_split_image(dir.path(), "a.png", 200, 40);
    let b = save_split_image(dir.path(), "b.png", 200, 40);

    let output = facematch(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--stub",
        "--strict",
    ]);
    assert!(output.status.success());

    let body = parse_single_json(&output);
    // Facenet + cosine table default, not the lenient override.
    assert!((body["threshold"].as_f64().unwrap() - 0.40).abs() < 1e-6);
}

#[test]
fn caught_invocation_errors_exit_zero_with_an_error_body() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_uniform_image(dir.path(), "a.png");
    let b = save_split_image(dir.path(), "b.png", 200, 40);

    // Strict detection on a faceless frame fails inside the invocation
    // tier: error body, but exit code 0 (the inherited contract).
    let output = facematch(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--stub",
        "--strict",
    ]);
    assert!(output.status.success());

    let body = parse_single_json(&output);
    assert_eq!(body.len(), 1);
    assert!(body["error"].as_str().unwrap().contains("no face detected"));
}

#[test]
fn explicit_threshold_flag_is_reported_back() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_split_image(dir.path(), "a.png", 200, 40);
    let b = save_split_image(dir.path(), "b.png", 200, 40);

    let output = facematch(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--stub",
        "--threshold",
        "0.2",
    ]);
    assert!(output.status.success());

    let body = parse_single_json(&output);
    assert!((body["threshold"].as_f64().unwrap() - 0.2).abs() < 1e-6);
}

#[test]
fn missing_weights_without_stub_is_a_caught_invocation_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = save_split_image(dir.path(), "a.png", 200, 40);
    let b = save_split_image(dir.path(), "b.png", 200, 40);

    let output = Command::new(env!("CARGO_BIN_EXE_facematch"))
        .args([
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--weights",
            "/no/such/weights.safetensors",
        ])
        .env_remove("FACEMATCH_WEIGHTS")
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = parse_single_json(&output);
    assert_eq!(body.len(), 1);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("failed to load face model"));
}
