// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a terminal chat client for locally hosted models.
//!
//! This is the binary entry point.

mod app;
mod commands;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use parley_config::ParleyConfig;

/// Parley - chat with local Ollama models from the terminal.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep chats and settings in memory only.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Interactive chat (the default).
    Shell,
    /// List installed models with their estimated context length.
    Models,
    /// Search the web and print the summary handed to the model.
    Search {
        /// Words of the query.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// List saved chat sessions.
    Sessions,
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ParleyConfig) -> Result<(), parley_core::ParleyError> {
    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run_shell(config, cli.ephemeral).await,
        Commands::Models => commands::run_models(config, cli.ephemeral).await,
        Commands::Search { query } => commands::run_search(&config, &query.join(" ")).await,
        Commands::Sessions => commands::run_sessions(config, cli.ephemeral).await,
        Commands::Config => commands::run_config(&config),
    }
}

/// Logs go to stderr so they never interleave with streamed answers.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
