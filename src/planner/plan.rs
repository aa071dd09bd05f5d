//! Resource plan types.
//!
//! A plan is an ordered, immutable sequence of resource nodes. Sub-resources
//! hold a back-reference (node index) to the circuit they depend on and are
//! dropped from the plan when that circuit is absent.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{PlanError, PlannerError, Result};

/// Kinds of resources a plan can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// The ExpressRoute circuit itself.
    Circuit,
    /// Azure private peering on the circuit.
    PrivatePeering,
    /// Microsoft peering on the circuit.
    MicrosoftPeering,
    /// An authorization to connect to the circuit.
    Authorization,
}

/// A planned attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// String value.
    String(String),
    /// Ordered list of strings.
    List(Vec<String>),
    /// Ordered string map.
    Map(IndexMap<String, String>),
}

/// A single resource in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Resource kind.
    pub resource_type: ResourceType,
    /// Provisioning engine address (e.g. `azurerm_express_route_circuit.main`).
    pub address: String,
    /// Logical name within the configuration.
    pub logical_name: String,
    /// Name the resource will have once provisioned.
    pub physical_name: String,
    /// Planned attributes.
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeValue>,
    /// Index of the circuit node this resource depends on.
    #[serde(default)]
    pub depends_on: Option<usize>,
}

/// An ordered, immutable resource plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePlan {
    /// Hash of the configuration the plan was built from.
    fingerprint: String,
    /// Nodes in creation order.
    nodes: Vec<ResourceNode>,
}

/// Serialized plan as read back from disk or an external engine.
#[derive(Debug, Deserialize)]
struct PlanDocument {
    #[serde(default)]
    fingerprint: String,
    nodes: Vec<ResourceNode>,
}

impl ResourceType {
    /// All resource types in plan order.
    pub const ALL: [Self; 4] = [
        Self::Circuit,
        Self::PrivatePeering,
        Self::MicrosoftPeering,
        Self::Authorization,
    ];

    /// Returns the snake_case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circuit => "circuit",
            Self::PrivatePeering => "private_peering",
            Self::MicrosoftPeering => "microsoft_peering",
            Self::Authorization => "authorization",
        }
    }

    /// Parses a snake_case identifier.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Returns the provisioning engine resource type.
    #[must_use]
    pub const fn provider_type(self) -> &'static str {
        match self {
            Self::Circuit => "azurerm_express_route_circuit",
            Self::PrivatePeering | Self::MicrosoftPeering => "azurerm_express_route_circuit_peering",
            Self::Authorization => "azurerm_express_route_circuit_authorization",
        }
    }
}

impl ResourceNode {
    /// Returns an attribute by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

impl ResourcePlan {
    /// Creates a plan from nodes already known to be well-formed.
    pub(crate) const fn new(fingerprint: String, nodes: Vec<ResourceNode>) -> Self {
        Self { fingerprint, nodes }
    }

    /// Creates a plan from arbitrary nodes (e.g. reported by an external engine).
    ///
    /// Sub-resources whose dependency does not resolve to a circuit node are
    /// dropped, and the remaining back-references are re-indexed.
    #[must_use]
    pub fn from_nodes(fingerprint: impl Into<String>, nodes: Vec<ResourceNode>) -> Self {
        let keep: Vec<bool> = nodes
            .iter()
            .map(|node| {
                node.resource_type == ResourceType::Circuit
                    || node
                        .depends_on
                        .and_then(|i| nodes.get(i))
                        .is_some_and(|parent| parent.resource_type == ResourceType::Circuit)
            })
            .collect();

        let mut new_index = vec![None; nodes.len()];
        let mut next = 0;
        for (i, kept) in keep.iter().enumerate() {
            if *kept {
                new_index[i] = Some(next);
                next += 1;
            }
        }

        let nodes = nodes
            .into_iter()
            .zip(keep)
            .filter_map(|(mut node, kept)| {
                if !kept {
                    debug!("Dropping {} without a circuit", node.address);
                    return None;
                }
                node.depends_on = if node.resource_type == ResourceType::Circuit {
                    None
                } else {
                    node.depends_on.and_then(|i| new_index[i])
                };
                Some(node)
            })
            .collect();

        Self {
            fingerprint: fingerprint.into(),
            nodes,
        }
    }

    /// Loads a plan from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid plan.
    pub fn from_json(content: &str) -> Result<Self> {
        let document: PlanDocument = serde_json::from_str(content)
            .map_err(|e| PlannerError::Plan(PlanError::invalid_document(e.to_string())))?;
        Ok(Self::from_nodes(document.fingerprint, document.nodes))
    }

    /// Serializes the plan to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PlannerError::internal(format!("Failed to serialize plan: {e}")))
    }

    /// Returns the configuration fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns all nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    /// Returns the number of nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the plan has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the circuit node, if any.
    #[must_use]
    pub fn circuit(&self) -> Option<&ResourceNode> {
        self.nodes
            .iter()
            .find(|n| n.resource_type == ResourceType::Circuit)
    }

    /// Returns nodes of a given type, in plan order.
    pub fn nodes_of(&self, resource_type: ResourceType) -> impl Iterator<Item = &ResourceNode> {
        self.nodes
            .iter()
            .filter(move |n| n.resource_type == resource_type)
    }

    /// Gets nodes that depend on a specific node index.
    #[must_use]
    pub fn dependents(&self, node_idx: usize) -> Vec<(usize, &ResourceNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.depends_on == Some(node_idx))
            .collect()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(",")),
            Self::Map(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                f.write_str(&pairs.join(","))
            }
        }
    }
}

impl fmt::Display for ResourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.physical_name)
    }
}

impl fmt::Display for ResourcePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return write!(f, "Empty plan");
        }

        writeln!(f, "Resource Plan ({} resources):", self.nodes.len())?;
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "  {i}. {node}")?;
        }
        Ok(())
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u16> for AttributeValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<IndexMap<String, String>> for AttributeValue {
    fn from(value: IndexMap<String, String>) -> Self {
        Self::Map(value)
    }
}
