// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mf - modpack build orchestrator

mod commands;
mod completions;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{run, show, steps};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mf", version, about = "mf - Modpack build orchestrator")]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one build to completion
    Run(run::RunArgs),
    /// Print the steps a target would run
    Steps(steps::StepsArgs),
    /// Print a stored build
    Show(show::ShowArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_guard = logging::setup_logging(cli.log_file.as_deref())?;

    let succeeded = match cli.command {
        Commands::Run(args) => run::run(args).await?,
        Commands::Steps(args) => {
            steps::steps(args)?;
            true
        }
        Commands::Show(args) => {
            show::show(args).await?;
            true
        }
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            true
        }
    };

    if !succeeded {
        // Flush buffered file logs before exiting
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
