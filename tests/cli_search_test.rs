//! Integration tests for the analyze commands' local error handling.
//!
//! The happy path needs a live model and is not exercised here; these
//! tests verify the input checks that must reject a request before any
//! network call happens.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_empty_search_query_is_rejected() {
    let env = TestEnv::new();
    env.som()
        .args(["search", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search query is empty"));
}

#[test]
fn test_search_without_api_key_fails_locally() {
    let env = TestEnv::new();
    env.som()
        .args(["search", "Barolo", "2015"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key configured"));
}

#[test]
fn test_matches_without_api_key_fails_locally() {
    let env = TestEnv::new();
    env.som()
        .args(["matches", "Barolo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key configured"));
}

#[test]
fn test_scan_rejects_unsupported_image_type() {
    let env = TestEnv::new();
    let image = env.data_path().join("label.gif");
    std::fs::write(&image, b"GIF89a").unwrap();

    env.som()
        .args(["scan"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported image type"));
}

#[test]
fn test_scan_missing_file_fails() {
    let env = TestEnv::new();
    env.som()
        .args(["scan", "/nonexistent/label.jpg"])
        .assert()
        .failure();
}

#[test]
fn test_json_error_shape() {
    let env = TestEnv::new();
    env.som()
        .args(["search", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("{\"error\":"));
}
