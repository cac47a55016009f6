//! Common test utilities for sommelier integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/sommelier/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// The `som()` method returns a `Command` that sets `SOM_DATA_DIR`
/// per-invocation, making tests parallel-safe. API-key env vars are
/// removed so tests never reach the network by accident.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the som binary with isolated data directory.
    pub fn som(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_som"));
        cmd.env("SOM_DATA_DIR", self.data_dir.path());
        cmd.env_remove("SOM_API_KEY");
        cmd.env_remove("SOM_MODEL");
        cmd
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Seed the current-view slot with a report.
    pub fn seed_current(&self, report: &serde_json::Value) {
        fs::write(
            self.data_path().join("current.json"),
            serde_json::to_string(report).unwrap(),
        )
        .unwrap();
    }

    /// Seed the history collection, most recent first.
    pub fn seed_history(&self, reports: &[serde_json::Value]) {
        fs::write(
            self.data_path().join("history.json"),
            serde_json::to_string(&serde_json::Value::Array(reports.to_vec())).unwrap(),
        )
        .unwrap();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a report document the way an analysis run would persist it.
///
/// The peak window is deliberately enormous so readiness checks hold no
/// matter what year the suite runs in.
pub fn report(id: &str, name: &str, vintage: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "vintage": vintage,
        "country": "Italy",
        "region": "Piedmont",
        "type": "Nebbiolo",
        "marketPrice": "$60 - $90",
        "criticScores": [{ "critic": "Wine Spectator", "score": "95" }],
        "aging": { "peakYears": "2000-2999" }
    })
}

/// A report whose peak window is far in the future (never ready).
pub fn future_report(id: &str, name: &str, vintage: &str) -> serde_json::Value {
    let mut value = report(id, name, vintage);
    value["aging"] = serde_json::json!({ "peakYears": "2900-2999" });
    value["region"] = serde_json::json!("Burgundy");
    value["type"] = serde_json::json!("Pinot Noir");
    value
}
