//! Plan construction from validated configuration.
//!
//! The builder always emits one circuit node first, then the enabled
//! peerings, then one node per authorization in configured order. Every
//! sub-resource records the circuit node as its dependency.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::{
    AuthorizationConfig, CircuitConfig, ConfigHasher, MicrosoftPeeringConfig, PeeringConfig,
    ValidatedConfig,
};
use crate::naming::NamingPolicy;

use super::plan::{AttributeValue, ResourceNode, ResourcePlan, ResourceType};

/// Peering type value for private peering.
pub const PRIVATE_PEERING_TYPE: &str = "AzurePrivatePeering";

/// Peering type value for Microsoft peering.
pub const MICROSOFT_PEERING_TYPE: &str = "MicrosoftPeering";

/// Tag carrying the environment token.
const ENVIRONMENT_TAG: &str = "environment";

/// Index of the circuit node in every built plan.
const CIRCUIT_INDEX: usize = 0;

/// Builds resource plans.
#[derive(Debug, Default)]
pub struct ResourcePlanBuilder {
    naming: NamingPolicy,
    hasher: ConfigHasher,
}

impl ResourcePlanBuilder {
    /// Creates a new plan builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            naming: NamingPolicy::new(),
            hasher: ConfigHasher::new(),
        }
    }

    /// Builds the plan for a validated configuration.
    ///
    /// Building cannot fail: every user-facing problem is caught by the
    /// validator before a [`ValidatedConfig`] exists.
    #[must_use]
    pub fn build(&self, config: &ValidatedConfig) -> ResourcePlan {
        let circuit = config.circuit();
        debug_assert!(circuit.bandwidth_in_mbps > 0, "bandwidth must be positive");

        let base = NamingPolicy::base_from_resource_group(&circuit.resource_group);
        let mut nodes = vec![self.circuit_node(circuit, base)];

        if let Some(peering) = config.private_peering() {
            nodes.push(self.private_peering_node(circuit, base, peering));
        }

        if let Some(microsoft) = config.microsoft_peering() {
            nodes.push(self.microsoft_peering_node(circuit, base, microsoft));
        }

        for (key, auth) in config.authorizations() {
            nodes.push(Self::authorization_node(key, auth));
        }

        let fingerprint = self.hasher.hash_config(config);
        info!(
            "Planned {} resource(s) for circuit {}",
            nodes.len(),
            nodes[CIRCUIT_INDEX].physical_name
        );

        ResourcePlan::new(fingerprint, nodes)
    }

    fn circuit_node(&self, circuit: &CircuitConfig, base: &str) -> ResourceNode {
        let name = self
            .naming
            .compute_name(ResourceType::Circuit, base, &circuit.environment);
        debug!("Circuit name: {name}");

        let mut tags = circuit.tags.clone();
        tags.entry(String::from(ENVIRONMENT_TAG))
            .or_insert_with(|| circuit.environment.clone());

        let mut attributes = IndexMap::new();
        attributes.insert(String::from("name"), AttributeValue::from(name.as_str()));
        attributes.insert(
            String::from("resource_group_name"),
            AttributeValue::from(circuit.resource_group.as_str()),
        );
        attributes.insert(String::from("location"), AttributeValue::from(circuit.location.as_str()));
        attributes.insert(
            String::from("service_provider_name"),
            AttributeValue::from(circuit.service_provider_name.as_str()),
        );
        attributes.insert(
            String::from("peering_location"),
            AttributeValue::from(circuit.peering_location.as_str()),
        );
        attributes.insert(
            String::from("bandwidth_in_mbps"),
            AttributeValue::from(circuit.bandwidth_in_mbps),
        );
        attributes.insert(String::from("sku_tier"), AttributeValue::from(circuit.sku_tier.as_str()));
        attributes.insert(
            String::from("sku_family"),
            AttributeValue::from(circuit.sku_family.as_str()),
        );
        attributes.insert(
            String::from("allow_classic_operations"),
            AttributeValue::from(circuit.allow_classic_operations),
        );
        attributes.insert(String::from("tags"), AttributeValue::from(tags));

        ResourceNode {
            resource_type: ResourceType::Circuit,
            address: format!("{}.main", ResourceType::Circuit.provider_type()),
            logical_name: String::from("main"),
            physical_name: name,
            attributes,
            depends_on: None,
        }
    }

    fn private_peering_node(
        &self,
        circuit: &CircuitConfig,
        base: &str,
        peering: &PeeringConfig,
    ) -> ResourceNode {
        let mut attributes = peering_attributes(PRIVATE_PEERING_TYPE, peering);
        let name = self
            .naming
            .compute_name(ResourceType::PrivatePeering, base, &circuit.environment);
        attributes.shift_insert(0, String::from("name"), AttributeValue::from(name.as_str()));

        ResourceNode {
            resource_type: ResourceType::PrivatePeering,
            address: format!("{}.private_peering", ResourceType::PrivatePeering.provider_type()),
            logical_name: String::from("private_peering"),
            physical_name: name,
            attributes,
            depends_on: Some(CIRCUIT_INDEX),
        }
    }

    fn microsoft_peering_node(
        &self,
        circuit: &CircuitConfig,
        base: &str,
        microsoft: &MicrosoftPeeringConfig,
    ) -> ResourceNode {
        debug_assert!(
            !microsoft.advertised_public_prefixes.is_empty(),
            "microsoft peering requires advertised prefixes"
        );

        let mut attributes = peering_attributes(MICROSOFT_PEERING_TYPE, &microsoft.peering);
        let name = self
            .naming
            .compute_name(ResourceType::MicrosoftPeering, base, &circuit.environment);
        attributes.shift_insert(0, String::from("name"), AttributeValue::from(name.as_str()));

        let prefixes: Vec<String> = microsoft
            .advertised_public_prefixes
            .iter()
            .map(ToString::to_string)
            .collect();
        attributes.insert(
            String::from("advertised_public_prefixes"),
            AttributeValue::from(prefixes),
        );
        attributes.insert(
            String::from("customer_asn"),
            AttributeValue::from(microsoft.customer_asn),
        );
        if let Some(registry) = microsoft.routing_registry_name {
            attributes.insert(
                String::from("routing_registry_name"),
                AttributeValue::from(registry.as_str()),
            );
        }

        ResourceNode {
            resource_type: ResourceType::MicrosoftPeering,
            address: format!("{}.microsoft_peering", ResourceType::MicrosoftPeering.provider_type()),
            logical_name: String::from("microsoft_peering"),
            physical_name: name,
            attributes,
            depends_on: Some(CIRCUIT_INDEX),
        }
    }

    /// Authorizations keep their configured names; no naming policy applies.
    fn authorization_node(key: &str, auth: &AuthorizationConfig) -> ResourceNode {
        debug_assert!(!auth.name.is_empty(), "authorization name must not be empty");

        let mut attributes = IndexMap::new();
        attributes.insert(String::from("name"), AttributeValue::from(auth.name.as_str()));

        ResourceNode {
            resource_type: ResourceType::Authorization,
            address: format!(
                "{}.authorizations[\"{key}\"]",
                ResourceType::Authorization.provider_type()
            ),
            logical_name: key.to_string(),
            physical_name: auth.name.clone(),
            attributes,
            depends_on: Some(CIRCUIT_INDEX),
        }
    }
}

/// Attributes shared by both peering types.
fn peering_attributes(peering_type: &str, peering: &PeeringConfig) -> IndexMap<String, AttributeValue> {
    debug_assert!((1..=4094).contains(&peering.vlan_id), "vlan_id out of range");

    let mut attributes = IndexMap::new();
    attributes.insert(String::from("peering_type"), AttributeValue::from(peering_type));
    attributes.insert(
        String::from("primary_peer_address_prefix"),
        AttributeValue::from(peering.primary_peer_address_prefix.to_string()),
    );
    attributes.insert(
        String::from("secondary_peer_address_prefix"),
        AttributeValue::from(peering.secondary_peer_address_prefix.to_string()),
    );
    attributes.insert(String::from("vlan_id"), AttributeValue::from(peering.vlan_id));
    attributes.insert(String::from("peer_asn"), AttributeValue::from(peering.peer_asn));
    attributes
}
