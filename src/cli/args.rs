//! CLI argument parsing using clap.
//!
//! Contains the `Cli` struct and the `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Multi-language static data-lineage analyzer.
#[derive(Parser)]
#[command(
    name = "flowlens",
    version = env!("CARGO_PKG_VERSION"),
    about = "Static data-lineage analyzer for Go and Java",
    long_about = "Walks a project tree, builds per-package data-flow graphs, and exports\nthe merged result as a language/service-qualified IR graph."
)]
pub struct Cli {
    /// Path to a custom flowlens.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default flowlens.toml in the current directory
    #[command(about = "Write a default flowlens.toml configuration file")]
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Analyze a project tree and print a summary
    #[command(about = "Walk a project tree and analyze every discovered package")]
    Analyze {
        /// Project directory to analyze
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// List discovered packages/files without parsing them
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of files to analyze (overrides config)
        #[arg(long)]
        max_files: Option<usize>,
    },

    /// Analyze a project tree and export the merged IR graph
    #[command(about = "Analyze a project and export the merged IR graph as JSON")]
    Export {
        /// Project directory to analyze
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Output file (overrides export.output from config)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Display the effective configuration
    #[command(about = "Display active settings")]
    Config,
}
