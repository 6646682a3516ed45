pub mod analyze;
pub mod detect;
pub mod inspect;

use clap::{CommandFactory, Parser, Subcommand};

use crate::error::Result;

#[derive(Parser)]
#[command(
    name = "finilytics",
    about = "Classify spreadsheet/CSV financial documents into accounting roles."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a financial document and print the classification report.
    Analyze {
        /// Path to a CSV or XLSX/XLS file
        file: String,
        /// Print the raw result envelope as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Show which report type a filename maps to (no file is read).
    Detect {
        /// Filename to test, e.g. costo_ventas_marzo.xlsx
        filename: String,
    },
    /// Decode a document and show its columns with inferred types.
    Inspect {
        /// Path to a CSV or XLSX/XLS file
        file: String,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn completions(shell: clap_complete::Shell) -> Result<()> {
    clap_complete::generate(shell, &mut Cli::command(), "finilytics", &mut std::io::stdout());
    Ok(())
}
