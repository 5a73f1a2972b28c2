//! Command-line front end (ambient per SPEC_FULL.md §G).
//!
//! Three subcommands, grounded on the teacher's `Cli`/`Commands` clap
//! derive shape: `analyze` runs the full pipeline and prints the analysis
//! report, `stubs` runs only through the linker and prints the stub
//! report, `ir` runs only through the linker and prints the raw contract
//! IR for every linked contract.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cairo-lint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Source-level static analyzer for Cairo contracts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis pipeline over a file or directory.
    Analyze {
        /// Path to a `.cairo` file or a directory to walk.
        path: PathBuf,

        /// Override the configured path-enumeration cap (spec.md §4.6).
        #[arg(long)]
        max_paths: Option<usize>,

        /// Print the full JSON report instead of a human-readable summary.
        #[arg(long)]
        json: bool,

        /// Bump logging to debug.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run only through symbol linking and print the stub report.
    Stubs {
        /// Path to a `.cairo` file or a directory to walk.
        path: PathBuf,

        /// Bump logging to debug.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run only through symbol linking and print the raw contract IR.
    Ir {
        /// Path to a `.cairo` file or a directory to walk.
        path: PathBuf,

        /// Bump logging to debug.
        #[arg(short, long)]
        verbose: bool,
    },
}
