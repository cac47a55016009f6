//! KDL schema definitions for config.kdl and state.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation functions
//! - Default values

use chrono::{DateTime, Utc};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User preferences stored in config.kdl.
///
/// These settings are safe to sync across machines (e.g., via dotfiles).
/// File permissions: 0644 (rw-r--r--)
///
/// # KDL Schema
///
/// ```kdl
/// // User preferences - safe to sync across machines
/// output-format "human"  // or "json"
/// model "gemini-3-flash-preview"
/// history-limit 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SommelierConfig {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Model name for analysis requests
    pub model: Option<String>,

    /// Bound for the recent-search history
    pub history_limit: Option<usize>,
}

impl SommelierConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.history_limit {
            if limit == 0 {
                return Err("history-limit must be at least 1".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(node) = doc.get("output-format") {
            if let Some(entry) = node.entries().first() {
                if let Some(s) = entry.value().as_string() {
                    config.output_format = OutputFormat::parse(s);
                }
            }
        }

        if let Some(node) = doc.get("model") {
            if let Some(entry) = node.entries().first() {
                if let Some(s) = entry.value().as_string() {
                    config.model = Some(s.to_string());
                }
            }
        }

        if let Some(node) = doc.get("history-limit") {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    if i > 0 {
                        config.history_limit = Some(i as usize);
                    }
                }
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref format) = self.output_format {
            let mut node = KdlNode::new("output-format");
            node.push(KdlEntry::new(KdlValue::String(format.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(ref model) = self.model {
            let mut node = KdlNode::new("model");
            node.push(KdlEntry::new(KdlValue::String(model.clone())));
            doc.nodes_mut().push(node);
        }

        if let Some(limit) = self.history_limit {
            let mut node = KdlNode::new("history-limit");
            node.push(KdlEntry::new(KdlValue::Integer(limit as i128)));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &SommelierConfig) {
        if other.output_format.is_some() {
            self.output_format = other.output_format.clone();
        }
        if other.model.is_some() {
            self.model = other.model.clone();
        }
        if other.history_limit.is_some() {
            self.history_limit = other.history_limit;
        }
    }
}

/// Runtime state stored in state.kdl.
///
/// This file contains machine-specific state and secrets.
/// **MUST be created with 0600 permissions (owner read/write only)**.
///
/// # KDL Schema
///
/// ```kdl
/// // Machine-specific state - never sync
/// api-key "AIzaSyExampleExampleExample"
/// key-validated-at "2026-08-01T09:00:00Z"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SommelierState {
    /// Gemini API key (sensitive!)
    pub api_key: Option<String>,

    /// Timestamp when the key last produced a successful response
    pub key_validated_at: Option<DateTime<Utc>>,
}

impl SommelierState {
    /// Create an empty state with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this state contains any secrets.
    pub fn has_secrets(&self) -> bool {
        self.api_key.is_some()
    }

    /// Mask the API key for display purposes.
    ///
    /// Shows only the first 4 and last 4 characters.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            if key.len() <= 12 {
                format!("{}...", &key[..4.min(key.len())])
            } else {
                format!("{}...{}", &key[..4], &key[key.len() - 4..])
            }
        })
    }

    /// Parse state from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut state = Self::new();

        if let Some(node) = doc.get("api-key") {
            if let Some(entry) = node.entries().first() {
                if let Some(s) = entry.value().as_string() {
                    state.api_key = Some(s.to_string());
                }
            }
        }

        if let Some(node) = doc.get("key-validated-at") {
            if let Some(entry) = node.entries().first() {
                if let Some(s) = entry.value().as_string() {
                    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
                        state.key_validated_at = Some(dt);
                    }
                }
            }
        }

        state
    }

    /// Convert state to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref key) = self.api_key {
            let mut node = KdlNode::new("api-key");
            node.push(KdlEntry::new(KdlValue::String(key.clone())));
            doc.nodes_mut().push(node);
        }

        if let Some(ref validated_at) = self.key_validated_at {
            let mut node = KdlNode::new("key-validated-at");
            node.push(KdlEntry::new(KdlValue::String(validated_at.to_rfc3339())));
            doc.nodes_mut().push(node);
        }

        doc
    }
}

/// Required permissions for state.kdl (Unix: 0600, owner read/write only).
#[cfg(unix)]
pub const STATE_FILE_MODE: u32 = 0o600;

/// Required permissions for config.kdl (Unix: 0644, readable by all).
#[cfg(unix)]
pub const CONFIG_FILE_MODE: u32 = 0o644;
