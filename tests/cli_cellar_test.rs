//! Integration tests for cellar inventory and analytics via CLI.

mod common;

use common::{TestEnv, future_report, report};
use predicates::prelude::*;

/// Pull the item id of the first cellar entry out of `cellar list` JSON.
fn first_item_id(env: &TestEnv) -> String {
    let output = env
        .som()
        .args(["cellar", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    parsed["items"][0]["itemId"].as_str().unwrap().to_string()
}

#[test]
fn test_cellar_add_requires_a_report() {
    let env = TestEnv::new();
    env.som()
        .args(["cellar", "add"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no current report"));
}

#[test]
fn test_cellar_add_and_list() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Barolo Riserva", "2015"));

    env.som()
        .args(["cellar", "add", "-q", "2", "--price", "75"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\":\"added\""))
        .stdout(predicate::str::contains("\"quantity\":2"));

    env.som()
        .args(["cellar", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barolo Riserva"))
        .stdout(predicate::str::contains("\"purchasePrice\":75.0"));
}

#[test]
fn test_cellar_add_merges_and_overwrites_price() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Wine A", "2019"));

    env.som()
        .args(["cellar", "add", "-q", "2", "--price", "40"])
        .assert()
        .success();

    // Same (name, vintage): merged, not duplicated; latest price wins.
    env.som()
        .args(["cellar", "add", "-q", "3", "--price", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\":\"merged\""))
        .stdout(predicate::str::contains("\"quantity\":5"));

    let output = env
        .som()
        .args(["cellar", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["items"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["items"][0]["quantity"], 5);
    assert_eq!(parsed["items"][0]["purchasePrice"], 60.0);
}

#[test]
fn test_cellar_add_zero_quantity_rejected() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Wine A", "2019"));

    env.som()
        .args(["cellar", "add", "-q", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity must be at least 1"));
}

#[test]
fn test_cellar_inc_dec_and_prune() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Wine A", "2019"));
    env.som().args(["cellar", "add", "-q", "1"]).assert().success();
    let item_id = first_item_id(&env);

    env.som()
        .args(["cellar", "inc", &item_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"quantity\":2"));

    env.som()
        .args(["cellar", "dec", &item_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"quantity\":1"))
        .stdout(predicate::str::contains("\"removed\":false"));

    // Last bottle: item pruned from the list.
    env.som()
        .args(["cellar", "dec", &item_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"removed\":true"));

    env.som()
        .args(["cellar", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"items\":[]"));
}

#[test]
fn test_cellar_remove() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Wine A", "2019"));
    env.som().args(["cellar", "add", "-q", "6"]).assert().success();
    let item_id = first_item_id(&env);

    env.som()
        .args(["cellar", "remove", &item_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"removed\":true"));

    env.som()
        .args(["cellar", "remove", &item_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cellar item"));
}

#[test]
fn test_cellar_unknown_item_id() {
    let env = TestEnv::new();
    env.som()
        .args(["cellar", "inc", "somc-ffff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cellar item"));

    env.som()
        .args(["cellar", "inc", "bottle-7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid ID"));
}

#[test]
fn test_cellar_stats_scenario() {
    let env = TestEnv::new();

    // 2 bottles of Barolo at $75 each (peak window contains today).
    env.seed_current(&report("som-a1b2", "Barolo", "2015"));
    env.som()
        .args(["cellar", "add", "-q", "2", "--price", "75"])
        .assert()
        .success();

    let output = env
        .som()
        .args(["cellar", "stats"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(parsed["stats"]["totalBottles"], 2);
    assert_eq!(parsed["stats"]["totalValue"], 150.0);
    assert_eq!(parsed["stats"]["readyToDrink"], 2);
}

#[test]
fn test_cellar_stats_estimates_when_unpriced() {
    let env = TestEnv::new();

    // No purchase price: unit value falls back to the $60-$90 midpoint.
    env.seed_current(&report("som-a1b2", "Barolo", "2015"));
    env.som().args(["cellar", "add", "-q", "2"]).assert().success();

    let output = env
        .som()
        .args(["cellar", "stats"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["stats"]["totalValue"], 150.0);
}

#[test]
fn test_cellar_stats_readiness_and_diversity() {
    let env = TestEnv::new();

    env.seed_current(&report("som-a1b2", "Barolo", "2015"));
    env.som().args(["cellar", "add", "-q", "2"]).assert().success();

    env.seed_current(&future_report("som-b2c3", "Romanee", "2022"));
    env.som().args(["cellar", "add", "-q", "3"]).assert().success();

    let output = env
        .som()
        .args(["cellar", "stats", "--top", "2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(parsed["stats"]["totalBottles"], 5);
    // Only the Barolo's window contains the current year.
    assert_eq!(parsed["stats"]["readyToDrink"], 2);

    // Quantity-weighted leaderboards.
    assert_eq!(parsed["stats"]["topRegions"][0]["label"], "Burgundy");
    assert_eq!(parsed["stats"]["topRegions"][0]["bottles"], 3);
    assert_eq!(parsed["stats"]["diversity"][1]["label"], "Nebbiolo");
}

#[test]
fn test_cellar_stats_human_format() {
    let env = TestEnv::new();
    env.seed_current(&report("som-a1b2", "Barolo", "2015"));
    env.som()
        .args(["cellar", "add", "-q", "2", "--price", "75"])
        .assert()
        .success();

    env.som()
        .args(["-H", "cellar", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cellar analytics"))
        .stdout(predicate::str::contains("Total value:    $150"))
        .stdout(predicate::str::contains("Ready to drink: 2 bottle(s)"));
}
