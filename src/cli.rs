//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand corresponds to a distinct operation: generating
//! specialized packages, detecting stencil imports, or listing scan targets.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate specialized versions of Go packages by replacing types.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate specialized packages for stencil imports and write them
    /// under the nearest vendor directory.
    Generate {
        /// Paths to scan. Defaults to current directory.
        #[arg(short, long)]
        paths: Option<Vec<PathBuf>>,

        /// Tidy the imports of the input files after generating.
        #[arg(long)]
        tidy: bool,

        /// List the files that would be generated without writing them.
        #[arg(long)]
        dry_run: bool,

        /// Print additional diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report stencil imports and their substitutions without generating.
    Detect {
        /// Paths to scan. Defaults to current directory.
        #[arg(short, long)]
        paths: Option<Vec<PathBuf>>,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,

        /// Print additional diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// List files that would be scanned without processing them.
    Scan {
        /// Paths to scan. Defaults to current directory.
        #[arg(short, long)]
        paths: Option<Vec<PathBuf>>,
    },
}
