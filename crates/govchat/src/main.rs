// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Govchat - a demonstration web app wiring OAuth2 sign-in, a chat endpoint,
//! and content-governance submissions.
//!
//! This is the binary entry point.

use clap::{Parser, Subcommand};

mod serve;

/// Govchat - OAuth2 sign-in, governed chat, content-governance submissions.
#[derive(Parser, Debug)]
#[command(name = "govchat", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Govchat web server.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup. Missing required values
    // (client credentials, redirect URI, session secret) fail the process
    // here, never a request.
    let config = match govchat_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            govchat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("govchat serve failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("govchat: use --help for available commands");
        }
    }
}
