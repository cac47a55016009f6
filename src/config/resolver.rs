//! Unified precedence resolution for configuration and state.
//!
//! ## API key precedence (highest to lowest)
//!
//! 1. `SOM_API_KEY` environment variable
//! 2. state.kdl (`<data-dir>/state.kdl`)
//!
//! ## Config precedence (highest to lowest)
//!
//! 1. `SOM_MODEL` environment variable (model only)
//! 2. Session config.kdl (`<data-dir>/config.kdl`)
//! 3. System config.kdl (`~/.config/sommelier/config.kdl`)
//! 4. Built-in defaults

use std::path::Path;

use crate::config::schema::{OutputFormat, SommelierConfig, SommelierState};
use crate::config::{load_session_config, load_state, load_system_config};
use crate::gemini::DEFAULT_MODEL;
use crate::state::DEFAULT_HISTORY_LIMIT;

/// Environment variable name for the API key override.
pub const API_KEY_ENV: &str = "SOM_API_KEY";

/// Environment variable name for the model override.
pub const MODEL_ENV: &str = "SOM_MODEL";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from session-level config/state (inside the data directory)
    Session,
    /// Value from system-level config
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Session => write!(f, "session"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Output format preference
    pub output_format: Resolved<OutputFormat>,
    /// Model name for analysis requests
    pub model: Resolved<String>,
    /// Bound for the recent-search history
    pub history_limit: Resolved<usize>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            model: Resolved::new(DEFAULT_MODEL.to_string(), ValueSource::Default),
            history_limit: Resolved::new(DEFAULT_HISTORY_LIMIT, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    pub fn model(&self) -> &str {
        &self.model.value
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit.value
    }
}

/// Fully resolved state with source tracking.
#[derive(Debug, Clone, Default)]
pub struct ResolvedState {
    /// API key for the sommelier model
    pub api_key: Option<Resolved<String>>,
}

impl ResolvedState {
    /// Get the API key value, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|r| r.value.as_str())
    }

    /// Mask the API key for display purposes.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|r| {
            let state = SommelierState {
                api_key: Some(r.value.clone()),
                key_validated_at: None,
            };
            state.masked_key().unwrap_or_default()
        })
    }
}

/// Resolve configuration preferences: env (model only) > session > system >
/// defaults.
pub fn resolve_config(data_dir: &Path) -> ResolvedConfig {
    let mut resolved = ResolvedConfig::default();

    let mut merged = SommelierConfig::new();
    let mut source = ValueSource::Default;

    let system = load_system_config();
    if system != SommelierConfig::default() {
        merged.merge(&system);
        source = ValueSource::System;
    }

    let session = load_session_config(data_dir);
    if session != SommelierConfig::default() {
        merged.merge(&session);
    }

    if let Some(format) = merged.output_format {
        let from = if session.output_format.is_some() {
            ValueSource::Session
        } else {
            source.clone()
        };
        resolved.output_format = Resolved::new(format, from);
    }

    if let Some(model) = merged.model {
        let from = if session.model.is_some() {
            ValueSource::Session
        } else {
            source.clone()
        };
        resolved.model = Resolved::new(model, from);
    }

    if let Some(limit) = merged.history_limit {
        let from = if session.history_limit.is_some() {
            ValueSource::Session
        } else {
            source
        };
        resolved.history_limit = Resolved::new(limit, from);
    }

    // Env var outranks every file for the model.
    if let Ok(model) = std::env::var(MODEL_ENV) {
        if !model.is_empty() {
            resolved.model = Resolved::new(model, ValueSource::EnvVar(MODEL_ENV.to_string()));
        }
    }

    resolved
}

/// Resolve runtime state: env var > state.kdl.
pub fn resolve_state(data_dir: &Path) -> ResolvedState {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            return ResolvedState {
                api_key: Some(Resolved::new(
                    key,
                    ValueSource::EnvVar(API_KEY_ENV.to_string()),
                )),
            };
        }
    }

    let state = load_state(data_dir);
    ResolvedState {
        api_key: state
            .api_key
            .map(|key| Resolved::new(key, ValueSource::Session)),
    }
}
