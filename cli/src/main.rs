#![deny(missing_docs)]

//! # Schemagraph CLI
//!
//! Command Line Interface for the OpenAPI resolution engine.
//!
//! Supported Commands:
//! - `generate`: Resolves a document and renders the model (JSON or outline).
//! - `check`: Resolves a document and prints a summary.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod check;
mod error;
mod generate;
mod options;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI type graph resolver")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a document and render the model.
    Generate(generate::GenerateArgs),
    /// Resolve a document and report what would be generated.
    Check(check::CheckArgs),
}

/// Logs go to stderr so generated output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Check(args) => check::execute(args)?,
    }

    Ok(())
}
