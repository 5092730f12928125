// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::port::{Port, PortId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Input nodes (constants, parameters)
    Input,
    /// Component-wise arithmetic
    Arithmetic,
    /// Vector operations reducing to a fixed type
    Vector,
}

/// How a node's port types are determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeInference {
    /// Port types are fixed by the node definition
    Fixed,
    /// Port types are resolved from the connected inputs
    Arithmetic {
        /// Output type is fixed by the definition and never resolved
        locked_output: bool,
    },
}

impl TypeInference {
    /// Arithmetic inference with a resolved output
    pub const fn arithmetic() -> Self {
        Self::Arithmetic { locked_output: false }
    }

    /// Arithmetic inference with the output locked to its declared type
    pub const fn locked() -> Self {
        Self::Arithmetic { locked_output: true }
    }
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Type inference rule
    pub inference: TypeInference,
    /// Default input ports
    pub inputs: Vec<Port>,
    /// Default output ports
    pub outputs: Vec<Port>,
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Display name (can be customized)
    pub name: String,
    /// Type inference rule
    pub inference: TypeInference,
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: node_type.name.clone(),
            inference: node_type.inference,
            inputs: node_type.inputs.iter().cloned().map(Port::with_new_id).collect(),
            outputs: node_type.outputs.iter().cloned().map(Port::with_new_id).collect(),
        }
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == *port_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == *port_id))
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Whether the resolver manages this node's port types
    pub fn is_arithmetic(&self) -> bool {
        matches!(self.inference, TypeInference::Arithmetic { .. })
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    /// Registered node types by ID
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: indexmap::IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_type::ValueType;

    fn add_type() -> NodeType {
        NodeType {
            id: "add".to_string(),
            name: "Add".to_string(),
            category: NodeCategory::Arithmetic,
            description: "A + B".to_string(),
            inference: TypeInference::arithmetic(),
            inputs: vec![
                Port::input("A", ValueType::Pending),
                Port::input("B", ValueType::Pending),
            ],
            outputs: vec![Port::output("Out", ValueType::Pending)],
        }
    }

    #[test]
    fn test_instances_get_distinct_port_ids() {
        let node_type = add_type();
        let a = Node::new(&node_type);
        let b = Node::new(&node_type);

        assert_ne!(a.id, b.id);
        assert_ne!(a.inputs[0].id, b.inputs[0].id);
        assert_ne!(a.outputs[0].id, node_type.outputs[0].id);
        assert!(a.is_arithmetic());
    }

    #[test]
    fn test_port_lookup() {
        let node = Node::new(&add_type());
        let b = node.inputs[1].id;
        let out = node.outputs[0].id;

        assert_eq!(node.port(&b).map(|p| p.name.as_str()), Some("B"));
        assert_eq!(node.port(&out).map(|p| p.name.as_str()), Some("Out"));
        assert!(node.port(&PortId::new()).is_none());
        assert_eq!(node.output(0).map(|p| p.id), Some(out));
        assert_eq!(node.ports().count(), 3);
    }

    #[test]
    fn test_registry() {
        let mut registry = NodeRegistry::new();
        registry.register(add_type());

        assert!(registry.get("add").is_some());
        assert!(registry.create_node("missing").is_none());
        assert_eq!(registry.types_in_category(NodeCategory::Arithmetic).count(), 1);
        assert_eq!(registry.types_in_category(NodeCategory::Input).count(), 0);
    }
}
