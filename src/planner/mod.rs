//! Planning module for ExpressRoute resources.
//!
//! This module turns validated configuration into an ordered resource plan
//! and provides read-only verification over plans.

mod builder;
mod plan;
mod verifier;

pub use builder::{ResourcePlanBuilder, MICROSOFT_PEERING_TYPE, PRIVATE_PEERING_TYPE};
pub use plan::{AttributeValue, ResourceNode, ResourcePlan, ResourceType};
pub use verifier::{Expectation, ExpectationOutcome, PlanVerifier, VerificationReport};
