//! Configuration validation for planner bundles.
//!
//! Validation runs every check eagerly and collects all violations before
//! returning, so callers see every problem in a single pass. A successful
//! run produces a [`ValidatedConfig`], the only input the plan builder accepts.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{ConfigError, PlannerError, Result};

use super::cidr::CidrBlock;
use super::spec::{
    AuthorizationEntries, MicrosoftPeeringInput, PeeringInput, PlannerConfig, RoutingRegistry,
    SkuFamily, SkuTier,
};

/// Bandwidths (Mbps) offered by connectivity providers.
const STANDARD_BANDWIDTHS: &[u32] = &[50, 100, 200, 500, 1000, 2000, 5000, 10000];

/// Highest usable VLAN id.
const MAX_VLAN_ID: i64 = 4094;

/// Maximum authorization name length accepted by the control plane.
const MAX_AUTHORIZATION_NAME_LEN: usize = 80;

/// Validator for planner configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorKind {
    /// A required field is empty.
    MissingField,
    /// A name violates the naming convention.
    InvalidName,
    /// Bandwidth is not a positive integer.
    InvalidBandwidth,
    /// SKU tier is not a recognized value.
    InvalidSkuTier,
    /// SKU family is not a recognized value.
    InvalidSkuFamily,
    /// A peering block is missing or malformed.
    InvalidPeeringConfig,
    /// An authorization entry is malformed or duplicated.
    InvalidAuthorization,
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error category.
    pub kind: ValidationErrorKind,
    /// The error message.
    pub message: String,
}

/// Validated circuit settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitConfig {
    /// Resource group name.
    pub resource_group: String,
    /// Azure region.
    pub location: String,
    /// Environment token.
    pub environment: String,
    /// Connectivity provider.
    pub service_provider_name: String,
    /// Provider peering location.
    pub peering_location: String,
    /// Bandwidth in Mbps, always positive.
    pub bandwidth_in_mbps: u32,
    /// SKU tier.
    pub sku_tier: SkuTier,
    /// SKU family.
    pub sku_family: SkuFamily,
    /// Whether classic operations are allowed.
    pub allow_classic_operations: bool,
    /// Caller-supplied tags.
    pub tags: IndexMap<String, String>,
}

/// Validated peering addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeringConfig {
    /// Primary link subnet.
    pub primary_peer_address_prefix: CidrBlock,
    /// Secondary link subnet.
    pub secondary_peer_address_prefix: CidrBlock,
    /// VLAN id in `1..=4094`.
    pub vlan_id: u16,
    /// Peer ASN.
    pub peer_asn: u32,
}

/// Validated Microsoft peering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicrosoftPeeringConfig {
    /// Addressing fields.
    pub peering: PeeringConfig,
    /// Advertised public prefixes, in configured order. Never empty.
    pub advertised_public_prefixes: Vec<CidrBlock>,
    /// Customer ASN.
    pub customer_asn: u32,
    /// Routing registry, if configured.
    pub routing_registry_name: Option<RoutingRegistry>,
}

/// Validated authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationConfig {
    /// Authorization name.
    pub name: String,
}

/// A configuration that passed validation.
///
/// Only [`ConfigValidator::validate`] can construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    circuit: CircuitConfig,
    private_peering: Option<PeeringConfig>,
    microsoft_peering: Option<MicrosoftPeeringConfig>,
    authorizations: IndexMap<String, AuthorizationConfig>,
    warnings: Vec<String>,
}

/// Errors and warnings accumulated during one validation run.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn error(&mut self, field: impl Into<String>, kind: ValidationErrorKind, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a configuration bundle.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationFailed`] carrying every violation found.
    pub fn validate(&self, config: &PlannerConfig) -> Result<ValidatedConfig> {
        let mut result = ValidationResult::default();

        let circuit = Self::validate_circuit(config, &mut result);
        let private_peering = Self::validate_private_peering(config, &mut result);
        let microsoft_peering = Self::validate_microsoft_peering(config, &mut result);
        Self::validate_vlan_uniqueness(
            private_peering.as_ref(),
            microsoft_peering.as_ref(),
            &mut result,
        );
        let authorizations =
            Self::validate_authorizations(&config.circuit_authorizations, &mut result);

        if !result.errors.is_empty() {
            debug!("Configuration validation failed with {} error(s)", result.errors.len());
            return Err(PlannerError::Config(ConfigError::ValidationFailed {
                errors: result.errors,
            }));
        }

        let circuit = circuit
            .ok_or_else(|| PlannerError::internal("circuit validation produced no configuration"))?;

        for warning in &result.warnings {
            warn!("{warning}");
        }
        debug!("Configuration validation passed");

        Ok(ValidatedConfig {
            circuit,
            private_peering,
            microsoft_peering,
            authorizations,
            warnings: result.warnings,
        })
    }

    /// Validates circuit-level fields.
    fn validate_circuit(config: &PlannerConfig, result: &mut ValidationResult) -> Option<CircuitConfig> {
        let errors_before = result.errors.len();

        for (field, value) in [
            ("resource_group_name", &config.resource_group_name),
            ("location", &config.location),
            ("environment", &config.environment),
            ("service_provider_name", &config.service_provider_name),
            ("peering_location", &config.peering_location),
        ] {
            if value.trim().is_empty() {
                result.error(field, ValidationErrorKind::MissingField, format!("{field} cannot be empty"));
            }
        }

        if !config.environment.trim().is_empty() && !is_valid_token(&config.environment) {
            result.error(
                "environment",
                ValidationErrorKind::InvalidName,
                format!(
                    "Environment '{}' is invalid. Must be lowercase alphanumeric with hyphens.",
                    config.environment
                ),
            );
        }

        let bandwidth = u32::try_from(config.bandwidth_in_mbps).ok().filter(|b| *b > 0);
        if bandwidth.is_none() {
            result.error(
                "bandwidth_in_mbps",
                ValidationErrorKind::InvalidBandwidth,
                format!(
                    "Bandwidth must be a positive integer, got {}",
                    config.bandwidth_in_mbps
                ),
            );
        }

        let sku_tier = match config.sku_tier.as_deref() {
            None => {
                debug!("sku_tier not set, defaulting to {}", SkuTier::default());
                Some(SkuTier::default())
            }
            Some(raw) => {
                let tier = SkuTier::parse(raw);
                if tier.is_none() {
                    result.error(
                        "sku_tier",
                        ValidationErrorKind::InvalidSkuTier,
                        format!("Unknown SKU tier '{raw}'. Expected: Standard or Premium"),
                    );
                }
                tier
            }
        };

        let sku_family = match config.sku_family.as_deref() {
            None => Some(SkuFamily::default()),
            Some(raw) => {
                let family = SkuFamily::parse(raw);
                if family.is_none() {
                    result.error(
                        "sku_family",
                        ValidationErrorKind::InvalidSkuFamily,
                        format!("Unknown SKU family '{raw}'. Expected: MeteredData or UnlimitedData"),
                    );
                }
                family
            }
        };

        if let (Some(bandwidth), Some(tier)) = (bandwidth, sku_tier) {
            if !STANDARD_BANDWIDTHS.contains(&bandwidth) {
                result.warnings.push(format!(
                    "bandwidth_in_mbps: {bandwidth} Mbps is not a standard provider offering"
                ));
            }
            if tier == SkuTier::Standard && bandwidth > 10_000 {
                result.warnings.push(format!(
                    "bandwidth_in_mbps: {bandwidth} Mbps is usually only available on Premium"
                ));
            }
        }

        if result.errors.len() > errors_before {
            return None;
        }

        Some(CircuitConfig {
            resource_group: config.resource_group_name.clone(),
            location: config.location.clone(),
            environment: config.environment.clone(),
            service_provider_name: config.service_provider_name.clone(),
            peering_location: config.peering_location.clone(),
            bandwidth_in_mbps: bandwidth?,
            sku_tier: sku_tier?,
            sku_family: sku_family?,
            allow_classic_operations: config.allow_classic_operations,
            tags: config.tags.clone(),
        })
    }

    /// Validates private peering when enabled.
    fn validate_private_peering(
        config: &PlannerConfig,
        result: &mut ValidationResult,
    ) -> Option<PeeringConfig> {
        if !config.enable_private_peering {
            if config.private_peering.is_some() {
                result.warnings.push(String::from(
                    "private_peering: block is ignored because enable_private_peering is false",
                ));
            }
            return None;
        }

        let Some(input) = &config.private_peering else {
            result.error(
                "private_peering",
                ValidationErrorKind::InvalidPeeringConfig,
                "private_peering is required when enable_private_peering is true",
            );
            return None;
        };

        Self::validate_peering(input, "private_peering", result)
    }

    /// Validates Microsoft peering when enabled.
    fn validate_microsoft_peering(
        config: &PlannerConfig,
        result: &mut ValidationResult,
    ) -> Option<MicrosoftPeeringConfig> {
        if !config.enable_microsoft_peering {
            if config.microsoft_peering.is_some() {
                result.warnings.push(String::from(
                    "microsoft_peering: block is ignored because enable_microsoft_peering is false",
                ));
            }
            return None;
        }

        let Some(input) = &config.microsoft_peering else {
            result.error(
                "microsoft_peering",
                ValidationErrorKind::InvalidPeeringConfig,
                "microsoft_peering is required when enable_microsoft_peering is true",
            );
            return None;
        };

        Self::validate_microsoft_fields(input, result)
    }

    fn validate_microsoft_fields(
        input: &MicrosoftPeeringInput,
        result: &mut ValidationResult,
    ) -> Option<MicrosoftPeeringConfig> {
        const PREFIX: &str = "microsoft_peering";

        let peering = Self::validate_peering(&input.peering, PREFIX, result);

        let mut advertised = Vec::with_capacity(input.advertised_public_prefixes.len());
        let mut prefixes_valid = true;
        if input.advertised_public_prefixes.is_empty() {
            prefixes_valid = false;
            result.error(
                format!("{PREFIX}.advertised_public_prefixes"),
                ValidationErrorKind::InvalidPeeringConfig,
                "At least one advertised public prefix is required",
            );
        }
        for (i, raw) in input.advertised_public_prefixes.iter().enumerate() {
            match CidrBlock::parse(raw) {
                Ok(block) => advertised.push(block),
                Err(reason) => {
                    prefixes_valid = false;
                    result.error(
                        format!("{PREFIX}.advertised_public_prefixes[{i}]"),
                        ValidationErrorKind::InvalidPeeringConfig,
                        reason,
                    );
                }
            }
        }

        let customer_asn = validate_asn(input.customer_asn, &format!("{PREFIX}.customer_asn"), result);

        let routing_registry_name = match input.routing_registry_name.as_deref() {
            None => Some(None),
            Some(raw) => {
                let registry = RoutingRegistry::parse(raw);
                if registry.is_none() {
                    let known: Vec<&str> = RoutingRegistry::ALL.iter().map(|r| r.as_str()).collect();
                    result.error(
                        format!("{PREFIX}.routing_registry_name"),
                        ValidationErrorKind::InvalidPeeringConfig,
                        format!("Unknown routing registry '{raw}'. Expected one of: {}", known.join(", ")),
                    );
                }
                registry.map(Some)
            }
        };

        if !prefixes_valid {
            return None;
        }

        Some(MicrosoftPeeringConfig {
            peering: peering?,
            advertised_public_prefixes: advertised,
            customer_asn: customer_asn?,
            routing_registry_name: routing_registry_name?,
        })
    }

    /// Validates the addressing fields shared by both peering types.
    fn validate_peering(
        input: &PeeringInput,
        prefix: &str,
        result: &mut ValidationResult,
    ) -> Option<PeeringConfig> {
        let primary = validate_cidr(
            input.primary_peer_address_prefix.as_deref(),
            &format!("{prefix}.primary_peer_address_prefix"),
            result,
        );
        let secondary = validate_cidr(
            input.secondary_peer_address_prefix.as_deref(),
            &format!("{prefix}.secondary_peer_address_prefix"),
            result,
        );

        let vlan_field = format!("{prefix}.vlan_id");
        let vlan_id = match input.vlan_id {
            None => {
                result.error(vlan_field, ValidationErrorKind::InvalidPeeringConfig, "vlan_id is required");
                None
            }
            Some(v) if (1..=MAX_VLAN_ID).contains(&v) => u16::try_from(v).ok(),
            Some(v) => {
                result.error(
                    vlan_field,
                    ValidationErrorKind::InvalidPeeringConfig,
                    format!("vlan_id {v} is out of range (must be 1-{MAX_VLAN_ID})"),
                );
                None
            }
        };

        let peer_asn = validate_asn(input.peer_asn, &format!("{prefix}.peer_asn"), result);

        Some(PeeringConfig {
            primary_peer_address_prefix: primary?,
            secondary_peer_address_prefix: secondary?,
            vlan_id: vlan_id?,
            peer_asn: peer_asn?,
        })
    }

    /// Checks that both peerings do not share a VLAN.
    fn validate_vlan_uniqueness(
        private: Option<&PeeringConfig>,
        microsoft: Option<&MicrosoftPeeringConfig>,
        result: &mut ValidationResult,
    ) {
        if let (Some(private), Some(microsoft)) = (private, microsoft)
            && private.vlan_id == microsoft.peering.vlan_id
        {
            result.error(
                "microsoft_peering.vlan_id",
                ValidationErrorKind::InvalidPeeringConfig,
                format!(
                    "vlan_id {} is already used by private_peering",
                    microsoft.peering.vlan_id
                ),
            );
        }
    }

    /// Validates authorization entries.
    fn validate_authorizations(
        entries: &AuthorizationEntries,
        result: &mut ValidationResult,
    ) -> IndexMap<String, AuthorizationConfig> {
        let mut seen_keys = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut authorizations = IndexMap::with_capacity(entries.len());

        for (i, (key, auth)) in entries.iter().enumerate() {
            let prefix = if key.is_empty() {
                format!("circuit_authorizations[{i}]")
            } else {
                format!("circuit_authorizations.{key}")
            };
            let errors_before = result.errors.len();

            if key.trim().is_empty() {
                result.error(
                    prefix.clone(),
                    ValidationErrorKind::InvalidAuthorization,
                    "Authorization key cannot be empty",
                );
            } else if !seen_keys.insert(key) {
                result.error(
                    prefix.clone(),
                    ValidationErrorKind::InvalidAuthorization,
                    format!("Duplicate authorization key: {key}"),
                );
            }

            let name_field = format!("{prefix}.name");
            if auth.name.trim().is_empty() {
                result.error(
                    name_field,
                    ValidationErrorKind::InvalidAuthorization,
                    "Authorization name cannot be empty",
                );
            } else if !is_valid_authorization_name(&auth.name) {
                result.error(
                    name_field,
                    ValidationErrorKind::InvalidAuthorization,
                    format!(
                        "Authorization name '{}' is invalid. Use up to {MAX_AUTHORIZATION_NAME_LEN} letters, digits, '.', '_' or '-'.",
                        auth.name
                    ),
                );
            } else if !seen_names.insert(auth.name.as_str()) {
                result.error(
                    name_field,
                    ValidationErrorKind::InvalidAuthorization,
                    format!("Duplicate authorization name: {}", auth.name),
                );
            }

            if result.errors.len() == errors_before {
                authorizations.insert(
                    key.to_string(),
                    AuthorizationConfig {
                        name: auth.name.clone(),
                    },
                );
            }
        }

        authorizations
    }
}

/// Parses a required CIDR field, recording an error on failure.
fn validate_cidr(value: Option<&str>, field: &str, result: &mut ValidationResult) -> Option<CidrBlock> {
    let Some(raw) = value else {
        result.error(field, ValidationErrorKind::InvalidPeeringConfig, "Address prefix is required");
        return None;
    };

    CidrBlock::parse(raw)
        .map_err(|reason| result.error(field, ValidationErrorKind::InvalidPeeringConfig, reason))
        .ok()
}

/// Checks a required ASN is within `1..=u32::MAX`.
fn validate_asn(value: Option<i64>, field: &str, result: &mut ValidationResult) -> Option<u32> {
    let Some(raw) = value else {
        result.error(field, ValidationErrorKind::InvalidPeeringConfig, "ASN is required");
        return None;
    };

    let asn = u32::try_from(raw).ok().filter(|asn| *asn > 0);
    if asn.is_none() {
        result.error(
            field,
            ValidationErrorKind::InvalidPeeringConfig,
            format!("ASN {raw} is out of range (must be 1-{})", u32::MAX),
        );
    }
    asn
}

/// Validates that a token follows the naming convention.
/// Tokens must be lowercase alphanumeric with hyphens, starting with a letter.
fn is_valid_token(token: &str) -> bool {
    let mut chars = token.chars();

    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }

    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return false;
    }

    !token.ends_with('-') && !token.contains("--")
}

fn is_valid_authorization_name(name: &str) -> bool {
    name.len() <= MAX_AUTHORIZATION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

impl ValidatedConfig {
    /// Returns the circuit settings.
    #[must_use]
    pub const fn circuit(&self) -> &CircuitConfig {
        &self.circuit
    }

    /// Returns private peering settings, if enabled.
    #[must_use]
    pub const fn private_peering(&self) -> Option<&PeeringConfig> {
        self.private_peering.as_ref()
    }

    /// Returns Microsoft peering settings, if enabled.
    #[must_use]
    pub const fn microsoft_peering(&self) -> Option<&MicrosoftPeeringConfig> {
        self.microsoft_peering.as_ref()
    }

    /// Returns authorizations in configured order.
    #[must_use]
    pub const fn authorizations(&self) -> &IndexMap<String, AuthorizationConfig> {
        &self.authorizations
    }

    /// Returns non-fatal warnings raised during validation.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingField => "MissingField",
            Self::InvalidName => "InvalidName",
            Self::InvalidBandwidth => "InvalidBandwidth",
            Self::InvalidSkuTier => "InvalidSkuTier",
            Self::InvalidSkuFamily => "InvalidSkuFamily",
            Self::InvalidPeeringConfig => "InvalidPeeringConfig",
            Self::InvalidAuthorization => "InvalidAuthorization",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.kind, self.message)
    }
}
