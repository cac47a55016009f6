//! Integration tests for the recent-search history via CLI.

mod common;

use common::{TestEnv, report};
use predicates::prelude::*;

#[test]
fn test_history_list_empty() {
    let env = TestEnv::new();
    env.som()
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entries\":[]"));
}

#[test]
fn test_history_list_human_empty() {
    let env = TestEnv::new();
    env.som()
        .args(["-H", "history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No recent searches."));
}

#[test]
fn test_history_list_order_and_fields() {
    let env = TestEnv::new();
    env.seed_history(&[
        report("som-a1b2", "Barolo Riserva", "2015"),
        report("som-b2c3", "Chablis Grand Cru", "2020"),
    ]);

    let output = env
        .som()
        .args(["history", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    let barolo = text.find("Barolo Riserva").unwrap();
    let chablis = text.find("Chablis Grand Cru").unwrap();
    assert!(barolo < chablis, "most recent entry comes first");
    assert!(text.contains("\"score\":\"95\""));
}

#[test]
fn test_history_list_human_format() {
    let env = TestEnv::new();
    env.seed_history(&[report("som-a1b2", "Barolo Riserva", "2015")]);

    env.som()
        .args(["-H", "history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recent searches:"))
        .stdout(predicate::str::contains("Barolo Riserva - Piedmont (2015)"))
        .stdout(predicate::str::contains("[95]"));
}

#[test]
fn test_history_clear() {
    let env = TestEnv::new();
    env.seed_history(&[
        report("som-a1b2", "Barolo Riserva", "2015"),
        report("som-b2c3", "Chablis Grand Cru", "2020"),
    ]);

    env.som()
        .args(["history", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cleared\":2"));

    env.som()
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entries\":[]"));
}

#[test]
fn test_corrupt_history_degrades_to_empty() {
    let env = TestEnv::new();
    std::fs::write(env.data_path().join("history.json"), "{definitely not json").unwrap();

    // The command succeeds with an empty list; the corruption is only a
    // warning on stderr.
    env.som()
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entries\":[]"))
        .stderr(predicate::str::contains("Warning:"));
}

#[test]
fn test_corrupt_history_is_logged() {
    let env = TestEnv::new();
    std::fs::write(env.data_path().join("history.json"), "[[[").unwrap();

    env.som().args(["history", "list"]).assert().success();

    let log = std::fs::read_to_string(env.data_path().join("action.log")).unwrap();
    assert!(log.contains("\"command\":\"warning\""));
    assert!(log.contains("corrupt"));
}
