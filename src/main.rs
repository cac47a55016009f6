//! Sommelier CLI - identify wines and track your cellar.

use clap::Parser;
use sommelier::cli::{CellarCommands, Cli, Commands, ConfigCommands, HistoryCommands, SystemCommands};
use sommelier::commands::{self, Output};
use sommelier::{action_log, storage};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();

    // Determine data dir: --data-dir flag > SOM_DATA_DIR env (via clap) > XDG default
    let data_dir = match storage::resolve_data_dir(cli.data_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let human = commands::human_output(&data_dir, cli.human_readable);

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    // Start timing
    let start = Instant::now();

    // Execute command
    let result = run_command(cli.command, &data_dir, human);

    // Calculate duration
    let duration = start.elapsed().as_millis() as u64;

    // Determine success/error
    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Log the action (silently falls back on logging errors)
    action_log::log_action(&data_dir, &cmd_name, args_json, success, error, duration);

    // Handle result
    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(
    command: Option<Commands>,
    data_dir: &Path,
    human: bool,
) -> Result<(), sommelier::Error> {
    match command {
        Some(Commands::Search { query }) => {
            let result = commands::analyze_query(data_dir, &query.join(" "))?;
            output(&result, human);
        }

        Some(Commands::Scan { image }) => {
            let result = commands::analyze_label(data_dir, &image)?;
            output(&result, human);
        }

        Some(Commands::Matches { query }) => {
            let result = commands::find_matches(data_dir, &query.join(" "))?;
            output(&result, human);
        }

        Some(Commands::Show { id }) => {
            let result = commands::show(data_dir, id.as_deref())?;
            output(&result, human);
        }

        Some(Commands::Rate { id, stars }) => {
            let result = commands::rate(data_dir, &id, stars)?;
            output(&result, human);
        }

        Some(Commands::Note { id, text }) => {
            let result = commands::note(data_dir, &id, &text.join(" "))?;
            output(&result, human);
        }

        Some(Commands::History { command }) => match command {
            HistoryCommands::List => {
                let result = commands::history_list(data_dir)?;
                output(&result, human);
            }
            HistoryCommands::Clear => {
                let result = commands::history_clear(data_dir)?;
                output(&result, human);
            }
        },

        Some(Commands::Cellar { command }) => match command {
            CellarCommands::Add {
                id,
                quantity,
                price,
            } => {
                let result = commands::cellar_add(data_dir, id.as_deref(), quantity, price)?;
                output(&result, human);
            }
            CellarCommands::List => {
                let result = commands::cellar_list(data_dir)?;
                output(&result, human);
            }
            CellarCommands::Inc { item_id } => {
                let result = commands::cellar_adjust(data_dir, &item_id, 1)?;
                output(&result, human);
            }
            CellarCommands::Dec { item_id } => {
                let result = commands::cellar_adjust(data_dir, &item_id, -1)?;
                output(&result, human);
            }
            CellarCommands::Remove { item_id } => {
                let result = commands::cellar_remove(data_dir, &item_id)?;
                output(&result, human);
            }
            CellarCommands::Stats { top } => {
                let result = commands::cellar_stats(data_dir, top)?;
                output(&result, human);
            }
        },

        Some(Commands::Export { id, output: file }) => {
            let result = commands::export(data_dir, id.as_deref(), file.as_deref())?;
            output(&result, human);
        }

        Some(Commands::Share { id }) => {
            let result = commands::share(data_dir, id.as_deref())?;
            output(&result, human);
        }

        Some(Commands::Config { command }) => match command {
            ConfigCommands::List => {
                let result = commands::config_list(data_dir)?;
                output(&result, human);
            }
            ConfigCommands::Get { key } => {
                let result = commands::config_get(data_dir, &key)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(data_dir, &key, &value)?;
                output(&result, human);
            }
            ConfigCommands::SetKey { key } => {
                let result = commands::config_set_key(data_dir, &key)?;
                output(&result, human);
            }
            ConfigCommands::Path => {
                let result = commands::config_path(data_dir)?;
                output(&result, human);
            }
        },

        Some(Commands::System { command }) => match command {
            SystemCommands::Status => {
                let result = commands::system_status(data_dir)?;
                output(&result, human);
            }
        },

        None => {
            let result = commands::system_status(data_dir)?;
            output(&result, human);
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Serialize a command into a (name, args) pair for the action log.
/// Secrets are redacted later by the log's argument sanitizer.
fn serialize_command(command: &Option<Commands>) -> (String, serde_json::Value) {
    match command {
        Some(Commands::Search { query }) => (
            "search".to_string(),
            serde_json::json!({ "query": query.join(" ") }),
        ),

        Some(Commands::Scan { image }) => (
            "scan".to_string(),
            serde_json::json!({ "image": image_name(image) }),
        ),

        Some(Commands::Matches { query }) => (
            "matches".to_string(),
            serde_json::json!({ "query": query.join(" ") }),
        ),

        Some(Commands::Show { id }) => ("show".to_string(), serde_json::json!({ "id": id })),

        Some(Commands::Rate { id, stars }) => (
            "rate".to_string(),
            serde_json::json!({ "id": id, "stars": stars }),
        ),

        Some(Commands::Note { id, text }) => (
            "note".to_string(),
            serde_json::json!({ "id": id, "words": text.len() }),
        ),

        Some(Commands::History { command }) => match command {
            HistoryCommands::List => ("history list".to_string(), serde_json::json!({})),
            HistoryCommands::Clear => ("history clear".to_string(), serde_json::json!({})),
        },

        Some(Commands::Cellar { command }) => match command {
            CellarCommands::Add {
                id,
                quantity,
                price,
            } => (
                "cellar add".to_string(),
                serde_json::json!({ "id": id, "quantity": quantity, "price": price }),
            ),
            CellarCommands::List => ("cellar list".to_string(), serde_json::json!({})),
            CellarCommands::Inc { item_id } => (
                "cellar inc".to_string(),
                serde_json::json!({ "item_id": item_id }),
            ),
            CellarCommands::Dec { item_id } => (
                "cellar dec".to_string(),
                serde_json::json!({ "item_id": item_id }),
            ),
            CellarCommands::Remove { item_id } => (
                "cellar remove".to_string(),
                serde_json::json!({ "item_id": item_id }),
            ),
            CellarCommands::Stats { top } => (
                "cellar stats".to_string(),
                serde_json::json!({ "top": top }),
            ),
        },

        Some(Commands::Export { id, output }) => (
            "export".to_string(),
            serde_json::json!({ "id": id, "output": output.as_ref().map(|p| image_name(p)) }),
        ),

        Some(Commands::Share { id }) => ("share".to_string(), serde_json::json!({ "id": id })),

        Some(Commands::Config { command }) => match command {
            ConfigCommands::List => ("config list".to_string(), serde_json::json!({})),
            ConfigCommands::Get { key } => {
                ("config get".to_string(), serde_json::json!({ "key": key }))
            }
            ConfigCommands::Set { key, value } => (
                "config set".to_string(),
                serde_json::json!({ "key": key, "value": value }),
            ),
            ConfigCommands::SetKey { .. } => (
                // The key itself never reaches the log.
                "config set-key".to_string(),
                serde_json::json!({}),
            ),
            ConfigCommands::Path => ("config path".to_string(), serde_json::json!({})),
        },

        Some(Commands::System { command }) => match command {
            SystemCommands::Status => ("system status".to_string(), serde_json::json!({})),
        },

        None => ("status".to_string(), serde_json::json!({})),
    }
}

fn image_name(path: &PathBuf) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
