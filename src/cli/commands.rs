//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// erplan - Declarative ExpressRoute provisioning planner.
#[derive(Parser, Debug)]
#[command(name = "erplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "ERPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a template configuration.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration and report every error.
    Validate {
        /// Show warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Build and display the resource plan.
    Plan {
        /// Also write the plan as JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check expectations against a plan.
    Verify {
        /// Plan file to verify (defaults to building one from the configuration).
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Expectation, e.g. `present:private_peering` or `attr:circuit.sku_tier=Premium`.
        #[arg(short, long = "expect", required = true)]
        expectations: Vec<String>,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verify_command() {
        let cli = Cli::try_parse_from([
            "erplan",
            "--output",
            "json",
            "verify",
            "--plan",
            "plan.json",
            "-e",
            "present:circuit",
            "--expect",
            "name:circuit~prod",
        ])
        .unwrap();

        assert!(matches!(cli.output, OutputFormat::Json));
        match cli.command {
            Commands::Verify { plan, expectations } => {
                assert_eq!(plan, Some(PathBuf::from("plan.json")));
                assert_eq!(expectations.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verify_requires_expectations() {
        assert!(Cli::try_parse_from(["erplan", "verify"]).is_err());
    }
}
