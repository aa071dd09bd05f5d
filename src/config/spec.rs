//! Configuration bundle types for the planner.
//!
//! This module defines the structs that map to an `expressroute.yaml` (or JSON)
//! bundle. Fields are intentionally lenient (plain integers, optional strings)
//! so that malformed values reach the validator and are reported together
//! instead of failing deserialization one at a time.

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The root configuration bundle for a planning invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlannerConfig {
    /// Resource group that will hold the circuit.
    #[serde(default)]
    pub resource_group_name: String,
    /// Azure region.
    #[serde(default)]
    pub location: String,
    /// Environment token (e.g. "dev", "test", "prod").
    #[serde(default)]
    pub environment: String,
    /// Connectivity provider (e.g. "Equinix").
    #[serde(default)]
    pub service_provider_name: String,
    /// Provider peering location (e.g. "Amsterdam").
    #[serde(default)]
    pub peering_location: String,
    /// Circuit bandwidth in Mbps.
    #[serde(default)]
    pub bandwidth_in_mbps: i64,
    /// SKU tier; defaults to `Standard` when absent.
    #[serde(default)]
    pub sku_tier: Option<String>,
    /// SKU family; defaults to `MeteredData` when absent.
    #[serde(default)]
    pub sku_family: Option<String>,
    /// Whether classic operations are allowed on the circuit.
    #[serde(default)]
    pub allow_classic_operations: bool,
    /// Whether to plan private peering.
    #[serde(default)]
    pub enable_private_peering: bool,
    /// Private peering settings.
    #[serde(default)]
    pub private_peering: Option<PeeringInput>,
    /// Whether to plan Microsoft peering.
    #[serde(default)]
    pub enable_microsoft_peering: bool,
    /// Microsoft peering settings.
    #[serde(default)]
    pub microsoft_peering: Option<MicrosoftPeeringInput>,
    /// Circuit authorizations keyed by logical id.
    #[serde(default)]
    pub circuit_authorizations: AuthorizationEntries,
    /// Tags applied to the circuit.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: IndexMap<String, String>,
}

/// Addressing settings shared by both peering types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PeeringInput {
    /// Primary link /30 (or /126) subnet.
    #[serde(default)]
    pub primary_peer_address_prefix: Option<String>,
    /// Secondary link /30 (or /126) subnet.
    #[serde(default)]
    pub secondary_peer_address_prefix: Option<String>,
    /// VLAN id for the peering.
    #[serde(default)]
    pub vlan_id: Option<i64>,
    /// Peer (customer edge) ASN.
    #[serde(default)]
    pub peer_asn: Option<i64>,
}

/// Microsoft peering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MicrosoftPeeringInput {
    /// Addressing fields.
    #[serde(flatten)]
    pub peering: PeeringInput,
    /// Public prefixes advertised to Microsoft.
    #[serde(default, deserialize_with = "null_as_default")]
    pub advertised_public_prefixes: Vec<String>,
    /// Customer ASN the prefixes belong to.
    #[serde(default)]
    pub customer_asn: Option<i64>,
    /// Routing registry holding the prefixes.
    #[serde(default)]
    pub routing_registry_name: Option<String>,
}

/// A single circuit authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AuthorizationInput {
    /// Authorization name, used as-is for the resource.
    #[serde(default)]
    pub name: String,
}

/// Authorization entries in document order.
///
/// Unlike a map, duplicate keys are kept so the validator can report them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorizationEntries(Vec<(String, AuthorizationInput)>);

/// Circuit SKU tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SkuTier {
    /// Standard tier.
    #[default]
    Standard,
    /// Premium tier (global reach, higher route limits).
    Premium,
}

/// Circuit SKU family (billing model).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SkuFamily {
    /// Outbound data billed per GB.
    #[default]
    MeteredData,
    /// Flat rate.
    UnlimitedData,
}

/// Internet routing registries accepted for Microsoft peering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoutingRegistry {
    /// American Registry for Internet Numbers.
    Arin,
    /// Asia-Pacific Network Information Centre.
    Apnic,
    /// African Network Information Centre.
    Afrinic,
    /// Latin America and Caribbean Network Information Centre.
    Lacnic,
    /// RIPE Network Coordination Centre.
    Ripencc,
    /// Routing Assets Database.
    Radb,
    /// Allied Telesis Database.
    Altdb,
    /// Level 3 routing registry.
    Level3,
}

impl AuthorizationEntries {
    /// Adds an entry.
    pub fn push(&mut self, key: impl Into<String>, name: impl Into<String>) {
        self.0.push((key.into(), AuthorizationInput { name: name.into() }));
    }

    /// Returns the entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AuthorizationInput)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries (duplicates included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AuthorizationEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AuthorizationEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = AuthorizationEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of authorization keys to {name}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, AuthorizationInput>()? {
                    entries.push((key, value));
                }
                Ok(AuthorizationEntries(entries))
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(AuthorizationEntries::default())
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
                deserializer.deserialize_map(self)
            }
        }

        deserializer.deserialize_option(EntriesVisitor)
    }
}

/// Treats an explicit `null` the same as an omitted field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SkuTier {
    /// Parses a tier from its exact name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Standard" => Some(Self::Standard),
            "Premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Premium => "Premium",
        }
    }
}

impl SkuFamily {
    /// Parses a family from its exact name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MeteredData" => Some(Self::MeteredData),
            "UnlimitedData" => Some(Self::UnlimitedData),
            _ => None,
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MeteredData => "MeteredData",
            Self::UnlimitedData => "UnlimitedData",
        }
    }
}

impl RoutingRegistry {
    /// All known registries.
    pub const ALL: [Self; 8] = [
        Self::Arin,
        Self::Apnic,
        Self::Afrinic,
        Self::Lacnic,
        Self::Ripencc,
        Self::Radb,
        Self::Altdb,
        Self::Level3,
    ];

    /// Parses a registry from its upper-case name (e.g. "ARIN").
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arin => "ARIN",
            Self::Apnic => "APNIC",
            Self::Afrinic => "AFRINIC",
            Self::Lacnic => "LACNIC",
            Self::Ripencc => "RIPENCC",
            Self::Radb => "RADB",
            Self::Altdb => "ALTDB",
            Self::Level3 => "LEVEL3",
        }
    }
}

impl fmt::Display for SkuTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SkuFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RoutingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_parse() {
        assert_eq!(SkuTier::parse("Premium"), Some(SkuTier::Premium));
        assert_eq!(SkuTier::parse("premium"), None);
        assert_eq!(SkuFamily::parse("UnlimitedData"), Some(SkuFamily::UnlimitedData));
        assert_eq!(SkuFamily::parse("Unlimited"), None);
    }

    #[test]
    fn test_routing_registry_parse() {
        assert_eq!(RoutingRegistry::parse("ARIN"), Some(RoutingRegistry::Arin));
        assert_eq!(RoutingRegistry::parse("RIPENCC"), Some(RoutingRegistry::Ripencc));
        assert_eq!(RoutingRegistry::parse("arin"), None);
    }

    #[test]
    fn test_authorization_entries_keep_duplicates() {
        let json = r#"{"auth1": {"name": "a"}, "auth2": {"name": "b"}}"#;
        let entries: AuthorizationEntries = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["auth1", "auth2"]);

        let json = r#"{"auth1": {"name": "a"}, "auth1": {"name": "b"}}"#;
        let entries: AuthorizationEntries = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
    }
}
