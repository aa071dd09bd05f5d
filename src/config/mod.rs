//! Configuration module for the ExpressRoute planner.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `expressroute.yaml` / `expressroute.json`
//! - Validation of configuration values (batch, all errors at once)
//! - Computing configuration hashes for plan fingerprints

mod cidr;
mod hash;
mod parser;
mod spec;
mod validator;

pub use cidr::CidrBlock;
pub use hash::ConfigHasher;
pub use parser::{find_config_file, ConfigFormat, ConfigParser, DEFAULT_CONFIG_FILES};
pub use spec::{
    AuthorizationEntries, AuthorizationInput, MicrosoftPeeringInput, PeeringInput, PlannerConfig,
    RoutingRegistry, SkuFamily, SkuTier,
};
pub use validator::{
    AuthorizationConfig, CircuitConfig, ConfigValidator, MicrosoftPeeringConfig, PeeringConfig,
    ValidatedConfig, ValidationError, ValidationErrorKind,
};
