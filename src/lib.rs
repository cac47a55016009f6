//! Sommelier - a wine identification and cellar tracking library.
//!
//! This library provides the core functionality for the `som` CLI tool,
//! including label/name analysis via a generative-AI sommelier, a recent
//! search history, and a quantity-tracked cellar with analytics.

pub mod action_log;
pub mod analytics;
pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod gemini;
pub mod models;
pub mod state;
pub mod storage;


/// Library-level error type for Sommelier operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Gemini(#[from] gemini::GeminiError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Sommelier operations.
pub type Result<T> = std::result::Result<T, Error>;
