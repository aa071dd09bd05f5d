// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(dead_code)]                   // Unused code is flagged
#![warn(unused_imports)]              // Unused imports are flagged
#![warn(unused_variables)]            // Unused variables are flagged
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::redundant_clone)]     // Useless clones warning

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # ExpressRoute Planner
//!
//! A declarative provisioning planner for ExpressRoute circuits and their
//! dependent resources: private peering, Microsoft peering, and circuit
//! authorizations.
//!
//! ## Overview
//!
//! Given a configuration bundle, the planner deterministically decides which
//! sub-resources are in scope, validates their fields, propagates shared
//! attributes (SKU tier, environment naming), and emits a resource plan that
//! a provisioning engine can diff and apply. The planner never talks to the
//! cloud control plane itself.
//!
//! ## Data flow
//!
//! 1. **Raw config**: [`config::PlannerConfig`], loaded by [`config::ConfigParser`]
//! 2. **Validation**: [`config::ConfigValidator`] reports every violation at once
//! 3. **Planning**: [`planner::ResourcePlanBuilder`] builds a [`planner::ResourcePlan`]
//! 4. **Verification**: [`planner::PlanVerifier`] asserts on plan contents
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing, validation and hashing
//! - [`naming`]: Naming convention for generated resource names
//! - [`planner`]: Plan construction and verification
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! resource_group_name: rg-core-network
//! location: westeurope
//! environment: prod
//! service_provider_name: Equinix
//! peering_location: Amsterdam
//! bandwidth_in_mbps: 1000
//! sku_tier: Premium
//!
//! circuit_authorizations:
//!   auth1:
//!     name: authorization-1
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod planner;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigHasher, ConfigParser, ConfigValidator, PlannerConfig, ValidatedConfig};
pub use error::{PlannerError, Result};
pub use naming::NamingPolicy;
pub use planner::{PlanVerifier, ResourcePlan, ResourcePlanBuilder, ResourceType};
