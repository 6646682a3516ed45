mod analyzer;
mod cli;
mod detector;
mod error;
mod fmt;
mod importer;
mod models;
mod processor;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze { file, json } => cli::analyze::run(&file, json),
        Commands::Detect { filename } => cli::detect::run(&filename),
        Commands::Inspect { file } => cli::inspect::run(&file),
        Commands::Completions { shell } => cli::completions(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
