//! Fission CLI - interactive shell and tools for state documents.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Fission - a configurable atomic-chess rule engine
#[derive(Parser, Debug)]
#[command(name = "fission")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read commands from stdin and apply them to one game session
    Repl {
        /// Random seed for stochastic scripts and edge spawns (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// State document to import before the first command
        #[arg(short, long)]
        load: Option<PathBuf>,

        /// Directory used by `save NAME` and `load NAME`
        #[arg(short, long, default_value = "configs")]
        configs: PathBuf,

        /// Event output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Print the board stored in a state document
    Show {
        /// State document (.json)
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Check a state document and report what an import would keep
    Validate {
        /// State document (.json)
        #[arg(required = true)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Repl {
            seed,
            load,
            configs,
            format,
        } => cli::repl::execute(seed, load, configs, format),

        Commands::Show { file } => cli::show::execute(file),

        Commands::Validate { file } => cli::validate::execute(file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
