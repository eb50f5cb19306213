// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedrelay - feedback collection and email relay service.
//!
//! This is the binary entry point for the feedrelay server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;
mod sweep;

/// Feedrelay - feedback collection and email relay service.
#[derive(Parser, Debug)]
#[command(name = "feedrelay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the feedrelay server.
    Serve,
    /// Run one caretaker reconciliation sweep and exit.
    Sweep,
    /// Load and validate configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match feedrelay_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            feedrelay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run_serve(config).await,
        Some(Commands::Sweep) => sweep::run_sweep(config).await,
        Some(Commands::CheckConfig) => {
            println!(
                "configuration ok (server {}:{}, storage {})",
                config.server.host, config.server.port, config.storage.database_path
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
