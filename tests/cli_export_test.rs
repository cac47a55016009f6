//! Integration tests for the export and share commands.

mod common;

use common::{TestEnv, report};
use predicates::prelude::*;

#[test]
fn test_export_writes_html_file() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Barolo Riserva", "2015"));
    let out = env.data_path().join("barolo.html");

    env.som()
        .args(["export", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"written\":"));

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("<h1>Barolo Riserva</h1>"));
    assert!(html.contains("$60 - $90"));
}

#[test]
fn test_export_to_stdout() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Barolo Riserva", "2015"));

    env.som()
        .args(["-H", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Barolo Riserva</h1>"));
}

#[test]
fn test_export_without_current_fails() {
    let env = TestEnv::new();
    env.som()
        .args(["export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no current report"));
}

#[test]
fn test_export_by_id_from_history() {
    let env = TestEnv::new();
    env.seed_history(&[report("som-b2c3", "Chablis", "2020")]);

    env.som()
        .args(["-H", "export", "som-b2c3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Chablis</h1>"));
}

#[test]
fn test_share_summary() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Barolo Riserva", "2015"));

    env.som()
        .args(["-H", "share"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Barolo Riserva (2015) - Piedmont, Italy",
        ))
        .stdout(predicate::str::contains("Score: 95 (Wine Spectator)"))
        .stdout(predicate::str::contains("Market: $60 - $90"));
}

#[test]
fn test_share_includes_user_rating_after_rate() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Barolo Riserva", "2015"));

    env.som().args(["rate", "som-a1b2", "4"]).assert().success();

    env.som()
        .args(["-H", "share"])
        .assert()
        .success()
        .stdout(predicate::str::contains("My rating: **** (4/5)"));
}
