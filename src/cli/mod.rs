//! CLI argument definitions for Sommelier.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sommelier - identify wines and track your cellar from the command line.
///
/// Start with `som search <wine name>` or `som scan <label.jpg>`, then
/// `som cellar add` to start tracking bottles.
#[derive(Parser, Debug)]
#[command(name = "som")]
#[command(author, version, about = "A CLI sommelier: identify wines and track your cellar", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Use <path> as the data directory instead of ~/.local/share/sommelier.
    /// Can also be set via the SOM_DATA_DIR environment variable.
    #[arg(short = 'D', long = "data-dir", global = true, env = "SOM_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Identify a wine by name and build a full report
    ///
    /// Include the vintage year (e.g. "Barolo 2015") for the most accurate
    /// pricing and scores.
    Search {
        /// Wine name, any number of words
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Identify a wine from a label photo (jpeg, png, or webp)
    Scan {
        /// Path to the label image
        image: PathBuf,
    },

    /// List likely matches for an ambiguous wine name
    Matches {
        /// Wine name, any number of words
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Show a report (defaults to the most recently analyzed wine)
    Show {
        /// Report ID (e.g., som-a1b2); searches history and cellar
        id: Option<String>,
    },

    /// Rate a wine 0-5 stars
    Rate {
        /// Report ID (e.g., som-a1b2)
        id: String,

        /// Stars, 0-5
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        stars: u8,
    },

    /// Attach personal tasting notes to a wine
    Note {
        /// Report ID (e.g., som-a1b2)
        id: String,

        /// Note text, any number of words
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Recent-search history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Cellar inventory commands
    Cellar {
        #[command(subcommand)]
        command: CellarCommands,
    },

    /// Write a static HTML snapshot of one report
    Export {
        /// Report ID (defaults to the most recently analyzed wine)
        id: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a plain-text summary for sharing
    Share {
        /// Report ID (defaults to the most recently analyzed wine)
        id: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// System administration commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

/// History subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List recent searches, most recent first
    List,

    /// Clear the history
    Clear,
}

/// Cellar subcommands
#[derive(Subcommand, Debug)]
pub enum CellarCommands {
    /// Add bottles of a wine to the cellar
    ///
    /// Adding a wine already in the cellar increments its quantity; a
    /// supplied price replaces the stored one.
    Add {
        /// Report ID (defaults to the most recently analyzed wine)
        id: Option<String>,

        /// Number of bottles
        #[arg(short, long, default_value = "1")]
        quantity: u32,

        /// Per-bottle purchase price
        #[arg(short, long)]
        price: Option<f64>,
    },

    /// List cellar items
    List,

    /// Add one bottle to an item
    Inc {
        /// Cellar item ID (e.g., somc-c3d4)
        item_id: String,
    },

    /// Remove one bottle from an item (the item is pruned at zero)
    Dec {
        /// Cellar item ID (e.g., somc-c3d4)
        item_id: String,
    },

    /// Remove an item outright
    Remove {
        /// Cellar item ID (e.g., somc-c3d4)
        item_id: String,
    },

    /// Cellar analytics: bottles, value, readiness, diversity
    Stats {
        /// How many regions/types to list
        #[arg(long, default_value = "3")]
        top: usize,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// List resolved settings and where each came from
    List,

    /// Get one setting (output-format, model, history-limit)
    Get {
        /// Setting name
        key: String,
    },

    /// Set one setting in the session config
    Set {
        /// Setting name
        key: String,

        /// New value
        value: String,
    },

    /// Store the API key in state.kdl (owner-only permissions)
    SetKey {
        /// The Gemini API key
        key: String,
    },

    /// Print config and state file paths
    Path,
}

/// System subcommands
#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Show data directory, collection counts, and build info
    Status,
}
