//! CLI module for the ExpressRoute planner.
//!
//! This module provides the command-line interface for validating
//! configurations, building plans, and verifying them.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
