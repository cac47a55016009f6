//! Action logging for Sommelier commands.
//!
//! Every command invocation is appended as one JSON line to `action.log`
//! inside the data directory. The same file is the diagnostic sink for
//! storage warnings (corrupt collections dropped on load).
//!
//! Logging is strictly best-effort: it never fails a command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Represents a single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Command name (e.g., "search", "cellar add")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Log a command invocation.
///
/// This function never fails - it silently falls back on errors to avoid
/// breaking commands due to logging issues.
pub fn log_action(
    data_dir: &Path,
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    let entry = ActionLog {
        timestamp: Utc::now(),
        command: command.to_string(),
        args: sanitize_args(&args),
        success,
        error,
        duration_ms,
        user: get_current_user(),
    };

    if let Err(e) = write_log_entry(&log_path(data_dir), &entry) {
        eprintln!("Warning: Failed to write action log: {}", e);
    }
}

/// Record a diagnostic warning (e.g. a dropped corrupt collection).
///
/// Same best-effort policy as [`log_action`].
pub fn log_warning(data_dir: &Path, message: &str) {
    let entry = ActionLog {
        timestamp: Utc::now(),
        command: "warning".to_string(),
        args: serde_json::json!({ "message": message }),
        success: false,
        error: None,
        duration_ms: 0,
        user: get_current_user(),
    };

    // Not worth a second warning if the sink itself is broken.
    let _ = write_log_entry(&log_path(data_dir), &entry);
}

fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("action.log")
}

/// Write a log entry to the log file.
fn write_log_entry(path: &Path, entry: &ActionLog) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;

    Ok(())
}

/// Sanitize arguments to remove sensitive data.
fn sanitize_args(args: &serde_json::Value) -> serde_json::Value {
    match args {
        serde_json::Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, value) in map {
                // Check if key contains sensitive keywords
                let key_lower = key.to_lowercase();
                if key_lower.contains("password")
                    || key_lower.contains("token")
                    || key_lower.contains("key")
                    || key_lower.contains("secret")
                {
                    sanitized.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    sanitized.insert(key.clone(), sanitize_args(value));
                }
            }
            serde_json::Value::Object(sanitized)
        }
        serde_json::Value::Array(arr) => {
            if arr.len() > 10 {
                // Summarize large arrays
                serde_json::Value::String(format!("[Array with {} items]", arr.len()))
            } else {
                serde_json::Value::Array(arr.iter().map(sanitize_args).collect())
            }
        }
        serde_json::Value::String(s) => {
            // Sanitize file paths (convert to basename)
            let sanitized = if s.contains('/') || s.contains('\\') {
                s.rsplit(['/', '\\']).next().unwrap_or(s).to_string()
            } else {
                s.clone()
            };

            // Truncate long strings
            if sanitized.len() > 100 {
                serde_json::Value::String(format!(
                    "{}... ({} chars)",
                    &sanitized[..97],
                    sanitized.len()
                ))
            } else {
                serde_json::Value::String(sanitized)
            }
        }
        _ => args.clone(),
    }
}

/// Get the current user's username.
fn get_current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
