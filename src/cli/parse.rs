//! CLI parse: clap types for cds-explorer. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cds-explorer - browse CDS contexts, projects, workflows and runs through cdsctl
#[derive(Parser)]
#[command(name = "cds-explorer")]
#[command(about = "Browse CDS contexts, projects, workflows and runs through cdsctl")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file path (layered over the global settings file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// cdsrc file to read contexts from; repeat for several (overrides settings)
    #[arg(long = "cdsrc")]
    pub cdsrcs: Vec<PathBuf>,

    /// cdsctl binary to invoke (overrides settings)
    #[arg(long)]
    pub cdsctl: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Rendering of command output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List discovered contexts
    Contexts {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Expand and print the tree
    Tree {
        /// Only this context
        #[arg(long)]
        context: Option<String>,
        /// Levels to expand below each context
        #[arg(long, default_value_t = 3)]
        depth: usize,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print a deep link into the CDS web UI
    Link {
        /// Context to resolve the UI URL from (defaults to the active one)
        #[arg(long)]
        context: Option<String>,
        #[command(subcommand)]
        target: LinkCommands,
    },
}

#[derive(Subcommand)]
pub enum LinkCommands {
    /// Link to a project
    Project { key: String },
    /// Link to an application
    Application { key: String, name: String },
    /// Link to a pipeline
    Pipeline { key: String, name: String },
    /// Link to a workflow
    Workflow { key: String, name: String },
    /// Link to a workflow run
    Run { key: String, name: String, num: i64 },
}
