// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carelink - a hospital feedback intake bot for Telegram.
//!
//! This is the binary entry point for the Carelink service.

mod health;
mod serve;

use clap::{Parser, Subcommand};

/// Carelink - a hospital feedback intake bot for Telegram.
#[derive(Parser, Debug)]
#[command(name = "carelink", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Carelink bot service.
    Serve,
    /// Load and validate the configuration, then exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match carelink_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            carelink_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("carelink serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => {
            println!(
                "carelink: configuration OK (bot.name={}, locale={})",
                config.bot.name, config.bot.locale
            );
        }
        None => {
            println!("carelink: use --help for available commands");
        }
    }
}
