//! erplan CLI entrypoint.
//!
//! This is the main entrypoint for the erplan command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use expressroute_planner::cli::{Cli, Commands, OutputFormatter};
use expressroute_planner::config::{
    find_config_file, ConfigParser, ConfigValidator, PlannerConfig, ValidatedConfig,
};
use expressroute_planner::error::{PlannerError, Result};
use expressroute_planner::planner::{Expectation, PlanVerifier, ResourcePlan, ResourcePlanBuilder};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
fn init_logging(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings, &formatter),
        Commands::Plan { out } => cmd_plan(cli.config.as_ref(), out.as_deref(), &formatter),
        Commands::Verify { plan, expectations } => cmd_verify(
            cli.config.as_ref(),
            plan.as_deref(),
            &expectations,
            &formatter,
        ),
    }
}

/// Writes a template configuration.
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    info!("Initializing ExpressRoute configuration in: {}", path.display());

    let config_path = path.join("expressroute.yaml");

    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    let config_template = include_str!("../templates/expressroute.yaml");
    std::fs::write(&config_path, config_template)?;
    eprintln!("Created: {}", config_path.display());

    eprintln!("\nNext steps:");
    eprintln!("  1. Edit expressroute.yaml with your circuit settings");
    eprintln!("  2. Run 'erplan validate' to check your configuration");
    eprintln!("  3. Run 'erplan plan' to see the resources that will be created");

    Ok(())
}

/// Validates the configuration and prints every error found.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config_file, config) = load_config(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    match ConfigValidator::new().validate(&config) {
        Ok(validated) => {
            println!("{}", formatter.format_validation(&validated, show_warnings));
            Ok(())
        }
        Err(e) => {
            if let Some(errors) = e.validation_errors() {
                println!("{}", formatter.format_validation_errors(errors));
            }
            Err(e)
        }
    }
}

/// Builds and prints the resource plan.
fn cmd_plan(
    config_path: Option<&PathBuf>,
    out: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let validated = load_validated(config_path, formatter)?;
    let plan = ResourcePlanBuilder::new().build(&validated);
    info!(resources = plan.len(), "Plan built");

    println!("{}", formatter.format_plan(&plan));

    if let Some(out) = out {
        std::fs::write(out, plan.to_json()?)?;
        eprintln!("Plan written to: {}", out.display());
    }

    Ok(())
}

/// Checks expectations against a plan file or a freshly built plan.
fn cmd_verify(
    config_path: Option<&PathBuf>,
    plan_path: Option<&Path>,
    expressions: &[String],
    formatter: &OutputFormatter,
) -> Result<()> {
    let expectations = expressions
        .iter()
        .map(|e| e.parse::<Expectation>())
        .collect::<Result<Vec<_>>>()?;

    let plan = if let Some(path) = plan_path {
        debug!("Loading plan from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        ResourcePlan::from_json(&content)?
    } else {
        let validated = load_validated(config_path, formatter)?;
        ResourcePlanBuilder::new().build(&validated)
    };

    let report = PlanVerifier::new().check(&plan, &expectations);
    println!("{}", formatter.format_verification(&report));

    report.into_result().map(|_| ())
}

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads the raw configuration with `.env` and environment overrides applied.
fn load_config(config_path: Option<&PathBuf>) -> Result<(PathBuf, PlannerConfig)> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(
        config_file
            .parent()
            .unwrap_or_else(|| Path::new(".")),
    );
    parser.load_dotenv()?;

    let config = parser.load_with_env(&config_file)?;
    Ok((config_file, config))
}

/// Loads and validates the configuration, printing validation errors on failure.
fn load_validated(
    config_path: Option<&PathBuf>,
    formatter: &OutputFormatter,
) -> Result<ValidatedConfig> {
    let (_, config) = load_config(config_path)?;
    ConfigValidator::new().validate(&config).inspect_err(|e: &PlannerError| {
        if let Some(errors) = e.validation_errors() {
            eprintln!("{}", formatter.format_validation_errors(errors));
        }
    })
}
