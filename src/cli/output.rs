//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ValidatedConfig, ValidationError};
use crate::planner::{ResourceNode, ResourcePlan, ResourceType, VerificationReport};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Plan node row for table display.
#[derive(Tabled)]
struct PlanNodeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Depends on")]
    depends_on: String,
}

/// Validation error row for table display.
#[derive(Tabled)]
struct ValidationErrorRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a resource plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &ResourcePlan) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&PlanJson::new(plan, Utc::now())).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_plan_text(plan),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &ResourcePlan) -> String {
        if plan.is_empty() {
            return format!("{} Plan is empty.\n", "!".yellow());
        }

        let mut output = String::new();

        let _ = writeln!(output, "\nResource Plan");
        let short_fingerprint: String = plan.fingerprint().chars().take(8).collect();
        let _ = write!(output, "   Fingerprint: {short_fingerprint}\n\n");

        let rows: Vec<PlanNodeRow> = plan
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, node)| PlanNodeRow {
                index: i,
                resource_type: Self::format_resource_type(node.resource_type),
                name: node.physical_name.clone(),
                address: Self::truncate(&node.address, 60),
                depends_on: node.depends_on.map_or_else(|| String::from("-"), |d| d.to_string()),
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        if let Some(circuit) = plan.circuit() {
            output.push_str("\nCircuit attributes:\n");
            Self::write_attributes(&mut output, circuit);
        }

        let _ = write!(
            output,
            "\nPlan: {} resource(s) to create\n",
            plan.len().to_string().green()
        );

        output
    }

    /// Formats a successful validation.
    #[must_use]
    pub fn format_validation(&self, config: &ValidatedConfig, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": true,
                    "warnings": config.warnings(),
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid!\n", "✓".green());

                if show_warnings && !config.warnings().is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in config.warnings() {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }

                let circuit = config.circuit();
                output.push_str("\nConfiguration summary:\n");
                let _ = writeln!(output, "   Resource group: {}", circuit.resource_group);
                let _ = writeln!(output, "   Environment: {}", circuit.environment);
                let _ = writeln!(output, "   Bandwidth: {} Mbps", circuit.bandwidth_in_mbps);
                let _ = writeln!(output, "   SKU: {} / {}", circuit.sku_tier, circuit.sku_family);
                let _ = writeln!(
                    output,
                    "   Private peering: {}",
                    Self::format_enabled(config.private_peering().is_some())
                );
                let _ = writeln!(
                    output,
                    "   Microsoft peering: {}",
                    Self::format_enabled(config.microsoft_peering().is_some())
                );
                let _ = writeln!(output, "   Authorizations: {}", config.authorizations().len());

                output
            }
        }
    }

    /// Formats the full list of validation errors.
    #[must_use]
    pub fn format_validation_errors(&self, errors: &[ValidationError]) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "valid": false, "errors": errors });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = format!(
                    "{} Configuration is invalid ({} error(s)):\n\n",
                    "✗".red(),
                    errors.len()
                );
                let rows: Vec<ValidationErrorRow> = errors
                    .iter()
                    .map(|e| ValidationErrorRow {
                        field: e.field.clone(),
                        kind: e.kind.to_string(),
                        message: e.message.clone(),
                    })
                    .collect();
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Formats a verification report.
    #[must_use]
    pub fn format_verification(&self, report: &VerificationReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = String::new();
                for outcome in &report.outcomes {
                    let marker = if outcome.passed {
                        "✓".green()
                    } else {
                        "✗".red()
                    };
                    let _ = writeln!(output, "   {marker} {}", outcome.expectation);
                }

                let total = report.outcomes.len();
                let failed = report.failed_count();
                if failed == 0 {
                    let _ = write!(output, "\n{} {total} expectation(s) met\n", "✓".green());
                } else {
                    let _ = write!(
                        output,
                        "\n{} {failed} of {total} expectation(s) not met\n",
                        "✗".red()
                    );
                }
                output
            }
        }
    }

    fn write_attributes(output: &mut String, node: &ResourceNode) {
        for (key, value) in &node.attributes {
            let _ = writeln!(output, "   {key} = {value}");
        }
    }

    /// Formats a resource type with color.
    fn format_resource_type(resource_type: ResourceType) -> String {
        match resource_type {
            ResourceType::Circuit => resource_type.as_str().green().to_string(),
            ResourceType::PrivatePeering | ResourceType::MicrosoftPeering => {
                resource_type.as_str().cyan().to_string()
            }
            ResourceType::Authorization => resource_type.as_str().yellow().to_string(),
        }
    }

    fn format_enabled(enabled: bool) -> String {
        if enabled {
            "enabled".green().to_string()
        } else {
            "disabled".dimmed().to_string()
        }
    }

    /// Truncates a string to a maximum length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct PlanJson<'a> {
    generated_at: DateTime<Utc>,
    fingerprint: &'a str,
    resource_count: usize,
    nodes: &'a [ResourceNode],
}

impl<'a> PlanJson<'a> {
    fn new(plan: &'a ResourcePlan, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            fingerprint: plan.fingerprint(),
            resource_count: plan.len(),
            nodes: plan.nodes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValidator, PlannerConfig};
    use crate::planner::ResourcePlanBuilder;

    fn sample_plan() -> ResourcePlan {
        let mut config = PlannerConfig {
            resource_group_name: String::from("rg-core"),
            location: String::from("westeurope"),
            environment: String::from("prod"),
            service_provider_name: String::from("Equinix"),
            peering_location: String::from("Amsterdam"),
            bandwidth_in_mbps: 1000,
            ..PlannerConfig::default()
        };
        config.circuit_authorizations.push("auth1", "authorization-1");
        let validated = ConfigValidator::new().validate(&config).unwrap();
        ResourcePlanBuilder::new().build(&validated)
    }

    #[test]
    fn test_json_plan_reloads() {
        let plan = sample_plan();
        let json = OutputFormatter::new(OutputFormat::Json).format_plan(&plan);
        assert!(json.contains("generated_at"));

        let reloaded = ResourcePlan::from_json(&json).unwrap();
        assert_eq!(reloaded, plan);
    }

    #[test]
    fn test_text_plan_lists_nodes() {
        let plan = sample_plan();
        let text = OutputFormatter::new(OutputFormat::Text).format_plan(&plan);
        assert!(text.contains("erc-core-prod"));
        assert!(text.contains("authorization-1"));
    }

    #[test]
    fn test_text_plan_with_multibyte_fingerprint() {
        let nodes = sample_plan().nodes().to_vec();
        let plan = ResourcePlan::from_nodes("ééééééééé", nodes);
        let text = OutputFormatter::new(OutputFormat::Text).format_plan(&plan);
        assert!(text.contains("Fingerprint: éééééééé\n"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("abcdefghijkl", 8), "abcde...");
    }
}
