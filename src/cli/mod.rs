//! CLI module for transcoder-iac
//!
//! Argument parsing and subcommand dispatch for the `transcoder-iac` binary.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Declarative provisioning of AWS Elastic Transcoder pipelines and presets
#[derive(Parser, Debug, Clone)]
#[command(name = "transcoder-iac")]
#[command(version)]
#[command(about = "Declarative provisioning of AWS Elastic Transcoder pipelines and presets", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run in check mode (dry-run, don't make changes)
    #[arg(long = "check", global = true)]
    pub check_mode: bool,

    /// Run in diff mode (show differences)
    #[arg(long = "diff", global = true)]
    pub diff_mode: bool,

    /// AWS region for tasks that do not set one
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "TRANSCODER_IAC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON lines for scripting
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create or update every resource in a manifest
    Apply(commands::apply::ApplyArgs),

    /// Show what apply would change without changing anything
    Plan(commands::plan::PlanArgs),

    /// Delete every resource in a manifest, last task first
    Destroy(commands::destroy::DestroyArgs),

    /// Parse and validate a manifest offline
    Validate(commands::validate::ValidateArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}
