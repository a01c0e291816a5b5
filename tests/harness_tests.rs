mod common;

use std::{fs, path::PathBuf};

use autograde::{
    Settings,
    grading::{DispatchOutcome, Harness, Points, TestFailure, TestOutputs},
};
use common::temp_dir;
use indexmap::IndexMap;

const CONFIG: &str = r#"{"tests": [{"name": "test1", "run": "pytest tests/test1.py", "points": 10}]}"#;

fn config_file(contents: &str) -> (PathBuf, PathBuf) {
    let dir = temp_dir("autograde-harness");
    let path = dir.join("autograding.json");
    fs::write(&path, contents).expect("write config");
    (dir, path)
}

fn harness(config_path: &PathBuf, online: bool) -> Harness {
    let settings = Settings::builder()
        .autograding_config_path(config_path.clone())
        .build();
    Harness::new(&settings).with_connectivity(move || online)
}

fn outcome(output: &str, awarded: Option<f64>, feedback: &str) -> DispatchOutcome {
    let mut points_awarded = IndexMap::new();
    if let Some(points) = awarded {
        points_awarded.insert("test1".to_string(), Points(points));
    }
    DispatchOutcome {
        outputs: [("test1", output)].into_iter().collect::<TestOutputs>(),
        points_awarded,
        feedback: feedback.to_string(),
        ..Default::default()
    }
}

#[test]
fn online_matching_points_pass() {
    let (dir, path) = config_file(CONFIG);
    let result = harness(&path, true).assert_test("test1", "test1", "unused", |name| {
        assert_eq!(name, "test1");
        Ok(outcome("output", Some(10.0), "feedback"))
    });
    assert!(result.is_ok());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn online_mismatch_fails_with_feedback_text() {
    let (dir, path) = config_file(CONFIG);
    let err = harness(&path, true)
        .assert_test("test1", "test1", "unused", |_| {
            Ok(outcome("output", Some(5.0), "Detailed feedback"))
        })
        .expect_err("5 != 10");

    assert_eq!(err.to_string(), "Detailed feedback");
    assert!(matches!(
        err,
        TestFailure::PointsMismatch {
            expected: Points(10.0),
            awarded: Points(5.0),
            ..
        }
    ));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn online_missing_award_counts_as_zero() {
    let (dir, path) = config_file(CONFIG);
    let err = harness(&path, true)
        .assert_test("test1", "test1", "unused", |_| Ok(outcome("", None, "nothing")))
        .expect_err("0 != 10");
    assert_eq!(err.to_string(), "nothing");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unconfigured_key_expects_zero_points() {
    let (dir, path) = config_file(CONFIG);
    let result = harness(&path, true).assert_test("test1", "other", "unused", |_| {
        Ok(outcome("", Some(10.0), "fb"))
    });
    assert!(result.is_ok());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn offline_marker_present_passes() {
    let (dir, path) = config_file(CONFIG);
    let result = harness(&path, false).assert_test(
        "test1",
        "test1",
        "expected feedback",
        |_| Ok(outcome("  expected feedback: ok\n", None, "")),
    );
    assert!(result.is_ok());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn offline_marker_absent_fails_with_marker() {
    let (dir, path) = config_file(CONFIG);
    let err = harness(&path, false)
        .assert_test("test1", "test1", "expected feedback", |_| {
            Ok(outcome("wrong", Some(10.0), ""))
        })
        .expect_err("marker missing");
    assert_eq!(err.to_string(), "expected feedback");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn offline_without_output_fails() {
    let (dir, path) = config_file(CONFIG);
    let err = harness(&path, false)
        .assert_test("test2", "test2", "marker", |_| Ok(outcome("marker", None, "")))
        .expect_err("no output for test2");
    assert!(matches!(err, TestFailure::MissingOutput(name) if name == "test2"));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn setup_errors_are_reported() {
    let (dir, path) = config_file(CONFIG);
    let err = harness(&path, true)
        .assert_test("test1", "test1", "marker", |_| anyhow::bail!("service down"))
        .expect_err("setup failed");
    assert!(matches!(err, TestFailure::Setup(_)));
    assert!(err.to_string().contains("service down"));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_config_is_reported() {
    let dir = temp_dir("autograde-harness-missing");
    let path = dir.join("absent.json");
    let err = harness(&path, true)
        .assert_test("test1", "test1", "marker", |_| Ok(outcome("", Some(10.0), "")))
        .expect_err("no config");
    assert!(matches!(err, TestFailure::Config(_)));
    let _ = fs::remove_dir_all(dir);
}
