//! Read-only assertions over resource plans.
//!
//! Used by acceptance tests and the `verify` command, against either a
//! locally built plan or a plan reported back by the provisioning engine.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{PlanError, PlannerError};

use super::plan::{AttributeValue, ResourcePlan, ResourceType};

/// Verifier for resource plans.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanVerifier;

/// A single parsed plan assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Expectation {
    /// At least one node of the type exists.
    Present {
        /// Resource type.
        resource_type: ResourceType,
    },
    /// No node of the type exists.
    Absent {
        /// Resource type.
        resource_type: ResourceType,
    },
    /// Exactly `count` nodes of the type exist.
    Count {
        /// Resource type.
        resource_type: ResourceType,
        /// Expected number of nodes.
        count: usize,
    },
    /// Some node of the type has the attribute with the given display value.
    Attribute {
        /// Resource type.
        resource_type: ResourceType,
        /// Attribute key.
        key: String,
        /// Expected value in display form.
        value: String,
    },
    /// Some node of the type has a physical name containing the substring.
    NameContains {
        /// Resource type.
        resource_type: ResourceType,
        /// Required substring.
        substring: String,
    },
}

/// Outcome of a single expectation.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectationOutcome {
    /// The expectation checked.
    pub expectation: Expectation,
    /// Whether it held.
    pub passed: bool,
}

/// Outcome of checking a set of expectations.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    /// Per-expectation results, in input order.
    pub outcomes: Vec<ExpectationOutcome>,
}

impl PlanVerifier {
    /// Creates a new verifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns true if the plan contains a node of the given type.
    #[must_use]
    pub fn assert_resource_present(&self, plan: &ResourcePlan, resource_type: ResourceType) -> bool {
        plan.nodes_of(resource_type).next().is_some()
    }

    /// Returns true if some node of the given type has `key` equal to `expected`.
    #[must_use]
    pub fn assert_attribute(
        &self,
        plan: &ResourcePlan,
        resource_type: ResourceType,
        key: &str,
        expected: &AttributeValue,
    ) -> bool {
        plan.nodes_of(resource_type)
            .any(|node| node.attribute(key) == Some(expected))
    }

    /// Returns true if some node of the given type has a physical name containing `substring`.
    #[must_use]
    pub fn assert_name_contains(
        &self,
        plan: &ResourcePlan,
        resource_type: ResourceType,
        substring: &str,
    ) -> bool {
        plan.nodes_of(resource_type)
            .any(|node| node.physical_name.contains(substring))
    }

    /// Returns the number of nodes of the given type.
    #[must_use]
    pub fn count(&self, plan: &ResourcePlan, resource_type: ResourceType) -> usize {
        plan.nodes_of(resource_type).count()
    }

    /// Checks every expectation and reports each outcome.
    #[must_use]
    pub fn check(&self, plan: &ResourcePlan, expectations: &[Expectation]) -> VerificationReport {
        let outcomes = expectations
            .iter()
            .map(|expectation| ExpectationOutcome {
                passed: self.holds(plan, expectation),
                expectation: expectation.clone(),
            })
            .collect();

        VerificationReport { outcomes }
    }

    fn holds(&self, plan: &ResourcePlan, expectation: &Expectation) -> bool {
        match expectation {
            Expectation::Present { resource_type } => {
                self.assert_resource_present(plan, *resource_type)
            }
            Expectation::Absent { resource_type } => {
                !self.assert_resource_present(plan, *resource_type)
            }
            Expectation::Count {
                resource_type,
                count,
            } => self.count(plan, *resource_type) == *count,
            Expectation::Attribute {
                resource_type,
                key,
                value,
            } => plan
                .nodes_of(*resource_type)
                .filter_map(|node| node.attribute(key))
                .any(|actual| actual.to_string() == *value),
            Expectation::NameContains {
                resource_type,
                substring,
            } => self.assert_name_contains(plan, *resource_type, substring),
        }
    }
}

impl VerificationReport {
    /// Returns true if every expectation held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Returns the number of failed expectations.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Converts a failing report into an error.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::VerificationFailed`] if any expectation failed.
    pub fn into_result(self) -> crate::error::Result<Self> {
        if self.passed() {
            Ok(self)
        } else {
            Err(PlannerError::Plan(PlanError::VerificationFailed {
                failed: self.failed_count(),
                total: self.outcomes.len(),
            }))
        }
    }
}

fn parse_type(expression: &str, raw: &str) -> Result<ResourceType, PlannerError> {
    ResourceType::parse(raw.trim()).ok_or_else(|| {
        PlannerError::Plan(PlanError::invalid_expectation(
            expression,
            format!("unknown resource type '{raw}'"),
        ))
    })
}

impl FromStr for Expectation {
    type Err = PlannerError;

    /// Parses `present:<type>`, `absent:<type>`, `count:<type>=<n>`,
    /// `attr:<type>.<key>=<value>` or `name:<type>~<substring>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| PlannerError::Plan(PlanError::invalid_expectation(s, reason));

        let (check, rest) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected '<check>:<arguments>'"))?;

        match check {
            "present" => Ok(Self::Present {
                resource_type: parse_type(s, rest)?,
            }),
            "absent" => Ok(Self::Absent {
                resource_type: parse_type(s, rest)?,
            }),
            "count" => {
                let (ty, n) = rest
                    .split_once('=')
                    .ok_or_else(|| invalid("expected 'count:<type>=<n>'"))?;
                let count = n
                    .trim()
                    .parse()
                    .map_err(|_| invalid("count must be a non-negative integer"))?;
                Ok(Self::Count {
                    resource_type: parse_type(s, ty)?,
                    count,
                })
            }
            "attr" => {
                let (target, value) = rest
                    .split_once('=')
                    .ok_or_else(|| invalid("expected 'attr:<type>.<key>=<value>'"))?;
                let (ty, key) = target
                    .split_once('.')
                    .ok_or_else(|| invalid("expected 'attr:<type>.<key>=<value>'"))?;
                if key.is_empty() {
                    return Err(invalid("attribute key cannot be empty"));
                }
                Ok(Self::Attribute {
                    resource_type: parse_type(s, ty)?,
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "name" => {
                let (ty, substring) = rest
                    .split_once('~')
                    .ok_or_else(|| invalid("expected 'name:<type>~<substring>'"))?;
                Ok(Self::NameContains {
                    resource_type: parse_type(s, ty)?,
                    substring: substring.to_string(),
                })
            }
            other => Err(invalid(&format!(
                "unknown check '{other}' (expected present, absent, count, attr or name)"
            ))),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present { resource_type } => write!(f, "present:{resource_type}"),
            Self::Absent { resource_type } => write!(f, "absent:{resource_type}"),
            Self::Count {
                resource_type,
                count,
            } => write!(f, "count:{resource_type}={count}"),
            Self::Attribute {
                resource_type,
                key,
                value,
            } => write!(f, "attr:{resource_type}.{key}={value}"),
            Self::NameContains {
                resource_type,
                substring,
            } => write!(f, "name:{resource_type}~{substring}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValidator, MicrosoftPeeringInput, PeeringInput, PlannerConfig};
    use crate::planner::ResourcePlanBuilder;

    fn base_config(resource_group: &str, environment: &str) -> PlannerConfig {
        PlannerConfig {
            resource_group_name: resource_group.to_string(),
            location: String::from("westeurope"),
            environment: environment.to_string(),
            service_provider_name: String::from("Equinix"),
            peering_location: String::from("Amsterdam"),
            bandwidth_in_mbps: 1000,
            ..PlannerConfig::default()
        }
    }

    fn plan_for(config: &PlannerConfig) -> ResourcePlan {
        let validated = ConfigValidator::new().validate(config).unwrap();
        ResourcePlanBuilder::new().build(&validated)
    }

    #[test]
    fn test_scenario_basic_circuit_only() {
        let plan = plan_for(&base_config("rg-test-expressroute-basic", "test"));
        let verifier = PlanVerifier::new();

        assert_eq!(plan.len(), 1);
        assert!(verifier.assert_resource_present(&plan, ResourceType::Circuit));
        assert!(!verifier.assert_resource_present(&plan, ResourceType::PrivatePeering));
        assert!(!verifier.assert_resource_present(&plan, ResourceType::MicrosoftPeering));
        assert!(!verifier.assert_resource_present(&plan, ResourceType::Authorization));
        assert!(verifier.assert_attribute(
            &plan,
            ResourceType::Circuit,
            "sku_tier",
            &AttributeValue::from("Standard")
        ));
    }

    #[test]
    fn test_scenario_private_peering() {
        let config = PlannerConfig {
            enable_private_peering: true,
            private_peering: Some(PeeringInput {
                primary_peer_address_prefix: Some(String::from("192.168.1.0/30")),
                secondary_peer_address_prefix: Some(String::from("192.168.1.4/30")),
                vlan_id: Some(100),
                peer_asn: Some(65000),
            }),
            ..base_config("rg-test-expressroute-private", "test")
        };
        let plan = plan_for(&config);
        let verifier = PlanVerifier::new();

        assert_eq!(plan.len(), 2);
        assert!(verifier.assert_resource_present(&plan, ResourceType::PrivatePeering));
        assert!(verifier.assert_attribute(
            &plan,
            ResourceType::PrivatePeering,
            "vlan_id",
            &AttributeValue::Integer(100)
        ));
    }

    #[test]
    fn test_scenario_microsoft_peering() {
        let config = PlannerConfig {
            enable_microsoft_peering: true,
            microsoft_peering: Some(MicrosoftPeeringInput {
                peering: PeeringInput {
                    primary_peer_address_prefix: Some(String::from("192.168.2.0/30")),
                    secondary_peer_address_prefix: Some(String::from("192.168.2.4/30")),
                    vlan_id: Some(200),
                    peer_asn: Some(65000),
                },
                advertised_public_prefixes: vec![String::from("203.0.113.0/24")],
                customer_asn: Some(65001),
                routing_registry_name: Some(String::from("ARIN")),
            }),
            ..base_config("rg-test-expressroute-microsoft", "test")
        };
        let plan = plan_for(&config);
        let verifier = PlanVerifier::new();

        assert_eq!(plan.len(), 2);
        assert!(verifier.assert_attribute(
            &plan,
            ResourceType::MicrosoftPeering,
            "advertised_public_prefixes",
            &AttributeValue::List(vec![String::from("203.0.113.0/24")])
        ));
    }

    #[test]
    fn test_scenario_authorization() {
        let mut config = base_config("rg-test-expressroute-auth", "test");
        config.circuit_authorizations.push("auth1", "authorization-1");
        let plan = plan_for(&config);
        let verifier = PlanVerifier::new();

        assert_eq!(plan.len(), 2);
        assert_eq!(verifier.count(&plan, ResourceType::Authorization), 1);
        assert!(verifier.assert_attribute(
            &plan,
            ResourceType::Authorization,
            "name",
            &AttributeValue::from("authorization-1")
        ));
    }

    #[test]
    fn test_scenario_premium_sku() {
        let config = PlannerConfig {
            sku_tier: Some(String::from("Premium")),
            ..base_config("rg-test-expressroute-premium", "test")
        };
        let plan = plan_for(&config);
        let verifier = PlanVerifier::new();

        assert!(verifier.assert_attribute(
            &plan,
            ResourceType::Circuit,
            "sku_tier",
            &AttributeValue::from("Premium")
        ));
        assert!(!verifier.assert_attribute(
            &plan,
            ResourceType::Circuit,
            "sku_tier",
            &AttributeValue::from("Standard")
        ));
    }

    #[test]
    fn test_scenario_naming_convention() {
        let plan = plan_for(&base_config("rg-test-expressroute-naming", "prod"));
        let verifier = PlanVerifier::new();

        assert!(verifier.assert_name_contains(&plan, ResourceType::Circuit, "prod"));
        assert!(!verifier.assert_name_contains(&plan, ResourceType::Circuit, "staging"));
    }

    #[test]
    fn test_parse_expectations() {
        assert_eq!(
            "present:private_peering".parse::<Expectation>().unwrap(),
            Expectation::Present {
                resource_type: ResourceType::PrivatePeering
            }
        );
        assert_eq!(
            "count:authorization=2".parse::<Expectation>().unwrap(),
            Expectation::Count {
                resource_type: ResourceType::Authorization,
                count: 2
            }
        );
        assert_eq!(
            "attr:circuit.sku_tier=Premium".parse::<Expectation>().unwrap(),
            Expectation::Attribute {
                resource_type: ResourceType::Circuit,
                key: String::from("sku_tier"),
                value: String::from("Premium")
            }
        );
        assert_eq!(
            "name:circuit~prod".parse::<Expectation>().unwrap(),
            Expectation::NameContains {
                resource_type: ResourceType::Circuit,
                substring: String::from("prod")
            }
        );
    }

    #[test]
    fn test_parse_invalid_expectations() {
        for expr in [
            "present",
            "present:gateway",
            "count:circuit",
            "count:circuit=-1",
            "attr:circuit=Premium",
            "attr:circuit.=x",
            "name:circuit",
            "exists:circuit",
        ] {
            assert!(expr.parse::<Expectation>().is_err(), "{expr} should be rejected");
        }
    }

    #[test]
    fn test_expectation_display_round_trips() {
        let expr = "attr:microsoft_peering.advertised_public_prefixes=203.0.113.0/24";
        assert_eq!(expr.parse::<Expectation>().unwrap().to_string(), expr);
    }

    #[test]
    fn test_check_reports_each_outcome() {
        let mut config = base_config("rg-core", "prod");
        config.circuit_authorizations.push("auth1", "authorization-1");
        let plan = plan_for(&config);

        let expectations: Vec<Expectation> = [
            "present:circuit",
            "absent:private_peering",
            "count:authorization=1",
            "attr:circuit.bandwidth_in_mbps=1000",
            "attr:circuit.tags=environment=prod",
            "name:circuit~prod",
            "present:microsoft_peering",
        ]
        .iter()
        .map(|e| e.parse().unwrap())
        .collect();

        let report = PlanVerifier::new().check(&plan, &expectations);
        assert!(!report.passed());
        assert_eq!(report.failed_count(), 1);
        assert!(!report.outcomes[6].passed);
        assert!(report.into_result().is_err());
    }
}
