//! Configuration and state management for Sommelier.
//!
//! This module defines KDL schemas for two distinct files:
//!
//! ## config.kdl - User preferences (safe to sync across machines)
//!
//! Located at:
//! - System: `~/.config/sommelier/config.kdl`
//! - Session: `<data-dir>/config.kdl`
//!
//! Contains:
//! - `output-format` - "json" or "human"
//! - `model` - model name for analysis requests
//! - `history-limit` - bound for the recent-search history
//!
//! ## state.kdl - Runtime state (machine-specific, contains secrets)
//!
//! Located at `<data-dir>/state.kdl`. Contains:
//! - `api-key` - Gemini API key
//! - `key-validated-at` - ISO 8601 timestamp of the last successful call
//!
//! ## Security
//!
//! **CRITICAL**: `state.kdl` MUST be created with 0600 permissions (owner
//! read/write only) because it contains the API key.
//!
//! ## Precedence
//!
//! For the key: env var > state.kdl.
//! For preferences: env var (model) > session config > system config > defaults.
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use kdl::KdlDocument;

pub use resolver::{
    API_KEY_ENV, MODEL_ENV, Resolved, ResolvedConfig, ResolvedState, ValueSource, resolve_config,
    resolve_state,
};
pub use schema::{OutputFormat, SommelierConfig, SommelierState};
#[cfg(unix)]
pub use schema::{CONFIG_FILE_MODE, STATE_FILE_MODE};

use crate::Result;

/// Path of the system-level config file, `~/.config/sommelier/config.kdl`.
pub fn system_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sommelier").join("config.kdl"))
}

/// Path of the session-level config file inside the data directory.
pub fn session_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.kdl")
}

/// Path of the state file inside the data directory.
pub fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join("state.kdl")
}

/// Load the system-level config; absent or unparseable files are an empty
/// config (the parse failure is reported as a warning).
pub fn load_system_config() -> SommelierConfig {
    match system_config_path() {
        Some(path) => load_config_file(&path),
        None => SommelierConfig::default(),
    }
}

/// Load the session-level config from the data directory.
pub fn load_session_config(data_dir: &Path) -> SommelierConfig {
    load_config_file(&session_config_path(data_dir))
}

fn load_config_file(path: &Path) -> SommelierConfig {
    if !path.exists() {
        return SommelierConfig::default();
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Warning: could not read {}: {}", path.display(), e);
            return SommelierConfig::default();
        }
    };

    match raw.parse::<KdlDocument>() {
        Ok(doc) => SommelierConfig::from_kdl(&doc),
        Err(e) => {
            eprintln!("Warning: ignoring malformed {}: {}", path.display(), e);
            SommelierConfig::default()
        }
    }
}

/// Write the session-level config (0644 on Unix).
pub fn save_session_config(data_dir: &Path, config: &SommelierConfig) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let path = session_config_path(data_dir);
    fs::write(&path, config.to_kdl().to_string())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(CONFIG_FILE_MODE))?;
    }

    Ok(())
}

/// Load the state file from the data directory; absent or unparseable files
/// are an empty state.
pub fn load_state(data_dir: &Path) -> SommelierState {
    let path = state_path(data_dir);
    if !path.exists() {
        return SommelierState::default();
    }

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Warning: could not read {}: {}", path.display(), e);
            return SommelierState::default();
        }
    };

    match raw.parse::<KdlDocument>() {
        Ok(doc) => SommelierState::from_kdl(&doc),
        Err(e) => {
            eprintln!("Warning: ignoring malformed {}: {}", path.display(), e);
            SommelierState::default()
        }
    }
}

/// Write the state file with owner-only permissions.
pub fn save_state(data_dir: &Path, state: &SommelierState) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let path = state_path(data_dir);
    fs::write(&path, state.to_kdl().to_string())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(STATE_FILE_MODE))?;
    }

    Ok(())
}
