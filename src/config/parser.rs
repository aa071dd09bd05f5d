//! Configuration parser for loading planner bundles.
//!
//! This module handles loading configuration from YAML or JSON files and
//! environment variables, with proper precedence and error handling.

use crate::error::{ConfigError, PlannerError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::PlannerConfig;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

/// Configuration parser for loading planner configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving the `.env` file.
    base_path: Option<PathBuf>,
}

impl ConfigFormat {
    /// Picks the format from a file extension; anything but `.json` is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<PlannerConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(PlannerError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PlannerError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_str(&content, ConfigFormat::from_path(path), Some(path))
    }

    /// Parses configuration from a string in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn parse_str(
        &self,
        content: &str,
        format: ConfigFormat,
        source: Option<&Path>,
    ) -> Result<PlannerConfig> {
        debug!("Parsing {format:?} configuration");

        let parsed = match format {
            ConfigFormat::Yaml => serde_yaml::from_str::<PlannerConfig>(content)
                .map_err(|e| format!("YAML parse error: {e}")),
            ConfigFormat::Json => serde_json::from_str::<PlannerConfig>(content)
                .map_err(|e| format!("JSON parse error: {e}")),
        };

        let config = parsed.map_err(|message| {
            PlannerError::Config(ConfigError::ParseError {
                message,
                location: source.map(|p| p.display().to_string()),
            })
        })?;

        debug!(
            "Successfully parsed configuration for resource group: {}",
            config.resource_group_name
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Environment variables are checked in the format `ERPLAN_<FIELD>`
    /// (e.g. `ERPLAN_ENVIRONMENT`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<PlannerConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides from a variable lookup to the configuration.
    pub fn apply_overrides(config: &mut PlannerConfig, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rg) = lookup("ERPLAN_RESOURCE_GROUP_NAME") {
            debug!("Overriding resource_group_name from environment");
            config.resource_group_name = rg;
        }

        if let Some(location) = lookup("ERPLAN_LOCATION") {
            debug!("Overriding location from environment");
            config.location = location;
        }

        if let Some(env) = lookup("ERPLAN_ENVIRONMENT") {
            debug!("Overriding environment from environment");
            config.environment = env;
        }

        if let Some(tier) = lookup("ERPLAN_SKU_TIER") {
            debug!("Overriding sku_tier from environment");
            config.sku_tier = Some(tier);
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                PlannerError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "expressroute.yaml",
    "expressroute.yml",
    "expressroute.json",
];

/// Finds the configuration file in the given directory or its parents.
///
/// Relative start directories are resolved against the working directory
/// so the search can walk past it.
///
/// # Errors
///
/// Returns an error if the start directory cannot be resolved or no
/// configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = std::path::absolute(start_dir.as_ref())?;
    let mut current = start.clone();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(PlannerError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r"
resource_group_name: rg-test-expressroute-basic
location: westeurope
environment: test
service_provider_name: Equinix
peering_location: Amsterdam
bandwidth_in_mbps: 1000
";
        let config = ConfigParser::new()
            .parse_str(yaml, ConfigFormat::Yaml, None)
            .unwrap();
        assert_eq!(config.resource_group_name, "rg-test-expressroute-basic");
        assert_eq!(config.bandwidth_in_mbps, 1000);
        assert!(config.sku_tier.is_none());
        assert!(!config.enable_private_peering);
        assert!(config.circuit_authorizations.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
resource_group_name: rg-test-expressroute-complete
location: westeurope
environment: test
service_provider_name: Equinix
peering_location: Amsterdam
bandwidth_in_mbps: 1000
sku_tier: Premium
sku_family: UnlimitedData
tags:
  owner: network-team
enable_private_peering: true
private_peering:
  primary_peer_address_prefix: 192.168.1.0/30
  secondary_peer_address_prefix: 192.168.1.4/30
  vlan_id: 100
  peer_asn: 65000
enable_microsoft_peering: true
microsoft_peering:
  primary_peer_address_prefix: 192.168.2.0/30
  secondary_peer_address_prefix: 192.168.2.4/30
  vlan_id: 200
  peer_asn: 65000
  advertised_public_prefixes:
    - "203.0.113.0/24"
  customer_asn: 65001
  routing_registry_name: ARIN
circuit_authorizations:
  auth1:
    name: authorization-1
  auth2:
    name: authorization-2
"#;
        let config = ConfigParser::new()
            .parse_str(yaml, ConfigFormat::Yaml, None)
            .unwrap();
        assert_eq!(config.sku_tier.as_deref(), Some("Premium"));
        assert_eq!(config.private_peering.unwrap().vlan_id, Some(100));

        let microsoft = config.microsoft_peering.unwrap();
        assert_eq!(microsoft.peering.vlan_id, Some(200));
        assert_eq!(microsoft.advertised_public_prefixes, vec!["203.0.113.0/24"]);
        assert_eq!(microsoft.routing_registry_name.as_deref(), Some("ARIN"));

        let keys: Vec<&str> = config.circuit_authorizations.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["auth1", "auth2"]);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = ConfigParser::new().parse_str("bandwidth_in_mbps: [", ConfigFormat::Yaml, None);
        assert!(matches!(
            result,
            Err(PlannerError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expressroute.json");
        std::fs::write(
            &path,
            r#"{"resource_group_name": "rg-json", "environment": "dev", "bandwidth_in_mbps": 200}"#,
        )
        .unwrap();

        let config = ConfigParser::new().load_file(&path).unwrap();
        assert_eq!(config.resource_group_name, "rg-json");
        assert_eq!(config.bandwidth_in_mbps, 200);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigParser::new().load_file(dir.path().join("missing.yaml"));
        assert!(matches!(
            result,
            Err(PlannerError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("ERPLAN_ENVIRONMENT", "prod"), ("ERPLAN_SKU_TIER", "Premium")]);
        let mut config = PlannerConfig {
            environment: String::from("dev"),
            location: String::from("westeurope"),
            ..PlannerConfig::default()
        };

        ConfigParser::apply_overrides(&mut config, |key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.environment, "prod");
        assert_eq!(config.sku_tier.as_deref(), Some("Premium"));
        assert_eq!(config.location, "westeurope");
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("expressroute.yml"), "environment: dev\n").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join("expressroute.yml"));
    }

    #[test]
    fn test_find_config_file_from_relative_start() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("expressroute.yaml"), "environment: dev\n").unwrap();

        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();
        let found = find_config_file(".");
        std::env::set_current_dir(previous).unwrap();

        let found = found.unwrap().canonicalize().unwrap();
        assert_eq!(found, root.join("expressroute.yaml"));
    }

    #[test]
    fn test_apply_overrides_location_and_resource_group() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ERPLAN_RESOURCE_GROUP_NAME", "rg-override"),
            ("ERPLAN_LOCATION", "northeurope"),
        ]);
        let mut config = PlannerConfig {
            resource_group_name: String::from("rg-core"),
            location: String::from("westeurope"),
            environment: String::from("dev"),
            ..PlannerConfig::default()
        };

        ConfigParser::apply_overrides(&mut config, |key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.resource_group_name, "rg-override");
        assert_eq!(config.location, "northeurope");
        assert_eq!(config.environment, "dev");
        assert!(config.sku_tier.is_none());
    }

    #[test]
    fn test_null_collections_load_as_empty() {
        let json = r#"{"environment": "dev", "circuit_authorizations": null, "tags": null}"#;
        let config = ConfigParser::new()
            .parse_str(json, ConfigFormat::Json, None)
            .unwrap();
        assert!(config.circuit_authorizations.is_empty());
        assert!(config.tags.is_empty());

        let yaml = "environment: dev\ncircuit_authorizations:\ntags:\n";
        let config = ConfigParser::new()
            .parse_str(yaml, ConfigFormat::Yaml, None)
            .unwrap();
        assert!(config.circuit_authorizations.is_empty());
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_init_template_is_valid() {
        let template = include_str!("../../templates/expressroute.yaml");
        let config = ConfigParser::new()
            .parse_str(template, ConfigFormat::Yaml, None)
            .unwrap();
        let validated = crate::config::ConfigValidator::new().validate(&config).unwrap();
        assert!(validated.private_peering().is_some());
        assert!(validated.microsoft_peering().is_none());
        assert_eq!(validated.authorizations().len(), 1);
    }
}
