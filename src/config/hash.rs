//! Configuration hashing for change detection.
//!
//! This module provides deterministic hashing of validated configurations.
//! The hash is stamped on every plan as its fingerprint so downstream tooling
//! can tell whether two plans came from identical inputs.

use sha2::{Digest, Sha256};

use super::validator::{PeeringConfig, ValidatedConfig};

/// Hasher for computing configuration hashes.
#[derive(Debug, Default)]
pub struct ConfigHasher;

impl ConfigHasher {
    /// Creates a new configuration hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes a hash of the entire validated configuration.
    ///
    /// Fields are length-prefixed so adjacent values cannot run together.
    #[must_use]
    pub fn hash_config(&self, config: &ValidatedConfig) -> String {
        let mut hasher = Sha256::new();

        // Circuit
        let circuit = config.circuit();
        update_str(&mut hasher, &circuit.resource_group);
        update_str(&mut hasher, &circuit.location);
        update_str(&mut hasher, &circuit.environment);
        update_str(&mut hasher, &circuit.service_provider_name);
        update_str(&mut hasher, &circuit.peering_location);
        hasher.update(circuit.bandwidth_in_mbps.to_be_bytes());
        update_str(&mut hasher, circuit.sku_tier.as_str());
        update_str(&mut hasher, circuit.sku_family.as_str());
        hasher.update([u8::from(circuit.allow_classic_operations)]);

        // Tags keep their configured order; order is part of the input.
        hasher.update((circuit.tags.len() as u64).to_be_bytes());
        for (key, value) in &circuit.tags {
            update_str(&mut hasher, key);
            update_str(&mut hasher, value);
        }

        // Private peering
        match config.private_peering() {
            Some(peering) => {
                hasher.update([1u8]);
                update_peering(&mut hasher, peering);
            }
            None => hasher.update([0u8]),
        }

        // Microsoft peering
        match config.microsoft_peering() {
            Some(microsoft) => {
                hasher.update([1u8]);
                update_peering(&mut hasher, &microsoft.peering);
                hasher.update((microsoft.advertised_public_prefixes.len() as u64).to_be_bytes());
                for prefix in &microsoft.advertised_public_prefixes {
                    update_str(&mut hasher, &prefix.to_string());
                }
                hasher.update(microsoft.customer_asn.to_be_bytes());
                update_str(
                    &mut hasher,
                    microsoft.routing_registry_name.map_or("", |r| r.as_str()),
                );
            }
            None => hasher.update([0u8]),
        }

        // Authorizations
        hasher.update((config.authorizations().len() as u64).to_be_bytes());
        for (key, auth) in config.authorizations() {
            update_str(&mut hasher, key);
            update_str(&mut hasher, &auth.name);
        }

        hex::encode(hasher.finalize())
    }
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

fn update_peering(hasher: &mut Sha256, peering: &PeeringConfig) {
    update_str(hasher, &peering.primary_peer_address_prefix.to_string());
    update_str(hasher, &peering.secondary_peer_address_prefix.to_string());
    hasher.update(peering.vlan_id.to_be_bytes());
    hasher.update(peering.peer_asn.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValidator, PlannerConfig};

    fn validated(environment: &str) -> ValidatedConfig {
        let config = PlannerConfig {
            resource_group_name: String::from("rg-hash"),
            location: String::from("westeurope"),
            environment: environment.to_string(),
            service_provider_name: String::from("Equinix"),
            peering_location: String::from("Amsterdam"),
            bandwidth_in_mbps: 1000,
            ..PlannerConfig::default()
        };
        ConfigValidator::new().validate(&config).unwrap()
    }

    #[test]
    fn test_hash_deterministic() {
        let hasher = ConfigHasher::new();
        let config = validated("dev");
        assert_eq!(hasher.hash_config(&config), hasher.hash_config(&config));
        assert_eq!(hasher.hash_config(&config).len(), 64);
    }

    #[test]
    fn test_hash_changes_with_config() {
        let hasher = ConfigHasher::new();
        assert_ne!(
            hasher.hash_config(&validated("dev")),
            hasher.hash_config(&validated("prod"))
        );
    }
}
