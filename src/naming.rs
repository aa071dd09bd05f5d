//! Naming convention for generated resource names.
//!
//! Every generated name embeds the environment token verbatim so that
//! downstream tooling can match on it.

use crate::planner::ResourceType;

/// Resource group prefix stripped when deriving a circuit base name.
const RESOURCE_GROUP_PREFIX: &str = "rg-";

/// Naming policy for plan resources.
#[derive(Debug, Default, Clone, Copy)]
pub struct NamingPolicy;

impl NamingPolicy {
    /// Creates a new naming policy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the physical name for a resource.
    ///
    /// The result is `{prefix}-{base}-{environment}`. The environment is
    /// embedded as given; it is not validated or case-folded here.
    #[must_use]
    pub fn compute_name(&self, kind: ResourceType, base: &str, environment: &str) -> String {
        format!("{}-{base}-{environment}", Self::prefix(kind))
    }

    /// Derives the circuit base name from a resource group name.
    #[must_use]
    pub fn base_from_resource_group(resource_group: &str) -> &str {
        resource_group
            .strip_prefix(RESOURCE_GROUP_PREFIX)
            .filter(|rest| !rest.is_empty())
            .unwrap_or(resource_group)
    }

    /// Returns the abbreviation used for a resource kind.
    #[must_use]
    pub const fn prefix(kind: ResourceType) -> &'static str {
        match kind {
            ResourceType::Circuit => "erc",
            ResourceType::PrivatePeering => "erpp",
            ResourceType::MicrosoftPeering => "ermp",
            ResourceType::Authorization => "erauth",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_name() {
        let policy = NamingPolicy::new();
        assert_eq!(
            policy.compute_name(ResourceType::Circuit, "test-expressroute", "prod"),
            "erc-test-expressroute-prod"
        );
    }

    #[test]
    fn test_compute_name_is_deterministic() {
        let policy = NamingPolicy::new();
        let first = policy.compute_name(ResourceType::PrivatePeering, "core", "staging");
        let second = policy.compute_name(ResourceType::PrivatePeering, "core", "staging");
        assert_eq!(first, second);
    }

    #[test]
    fn test_environment_embedded_verbatim() {
        let policy = NamingPolicy::new();
        for env in ["prod", "Prod", "dev_01", ""] {
            let name = policy.compute_name(ResourceType::MicrosoftPeering, "core", env);
            assert!(name.contains(env), "{name} should contain {env}");
        }
    }

    #[test]
    fn test_base_from_resource_group() {
        assert_eq!(
            NamingPolicy::base_from_resource_group("rg-test-expressroute-naming"),
            "test-expressroute-naming"
        );
        assert_eq!(NamingPolicy::base_from_resource_group("network"), "network");
        assert_eq!(NamingPolicy::base_from_resource_group("rg-"), "rg-");
    }
}
