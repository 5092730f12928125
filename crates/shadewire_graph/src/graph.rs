// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! Every topology change refreshes the affected node and everything
//! downstream of it, upstream first, so each input always sees its
//! producer's resolved output type.

use crate::config::ResolverConfig;
use crate::connection::{Connection, ConnectionId, Endpoint};
use crate::node::{Node, NodeId, TypeInference};
use crate::port::{PortDirection, PortId};
use crate::resolve::{ConnectionGroup, InputState, NodeTypeState, Resolution, TypeResolver};
use crate::value_type::ValueType;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};

/// A node graph
#[derive(Debug, Clone)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Resolver run on every arithmetic node after a topology change
    resolver: TypeResolver,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ResolverConfig::default())
    }

    /// Create a new empty graph with a resolver configuration
    pub fn with_config(name: impl Into<String>, config: ResolverConfig) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            resolver: TypeResolver::new(config),
        }
    }

    /// The resolver used by this graph
    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Add a node to the graph and resolve its initial port types
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        self.refresh_node(id);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let consumers: Vec<NodeId> = self
            .connections_for_node(node_id)
            .filter(|c| c.output.node == node_id)
            .map(|c| c.input.node)
            .collect();

        // Remove connections involving this node
        self.connections.retain(|_, c| !c.involves_node(node_id));
        let node = self.nodes.shift_remove(&node_id)?;

        for consumer in consumers {
            self.propagate_from(consumer);
        }
        Some(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connect a producer's output port to a consumer's input port
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        // Validate nodes exist
        let source_node = self.nodes.get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        // Validate ports exist
        let source_port = source_node.port(&from_port)
            .ok_or(ConnectionError::PortNotFound(from_port))?;
        let target_port = target_node.port(&to_port)
            .ok_or(ConnectionError::PortNotFound(to_port))?;

        if source_port.direction != PortDirection::Output
            || target_port.direction != PortDirection::Input
        {
            return Err(ConnectionError::IncompatiblePorts);
        }

        // Checked against the declared type; a resolved input type only
        // narrows what fits without a typecast
        if !ValueType::compatible(target_port.default_type, source_port.value_type) {
            tracing::debug!(
                "Rejected {} output into {} input of {}",
                source_port.value_type,
                target_port.default_type,
                target_node.name
            );
            return Err(ConnectionError::IncompatibleTypes {
                input: target_port.default_type,
                output: source_port.value_type,
            });
        }

        // Inputs take a single producer
        if !target_port.multi_connect && self.producer_of(to_port).is_some() {
            return Err(ConnectionError::PortAlreadyConnected(to_port));
        }

        // Prevent self-loops
        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        if self.downstream_of(to_node).contains(&from_node) {
            return Err(ConnectionError::WouldCreateCycle);
        }

        let connection = Connection::new(
            Endpoint::new(from_node, from_port),
            Endpoint::new(to_node, to_port),
        );
        let id = connection.id;
        self.connections.insert(id, connection);
        self.propagate_from(to_node);
        Ok(id)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&connection_id)?;
        self.propagate_from(connection.input.node);
        Some(connection)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the connection feeding a specific input port
    pub fn producer_of(&self, port_id: PortId) -> Option<&Connection> {
        self.connections.values().find(|c| c.input.port == port_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Producer nodes of every consumer, one entry per connection
    fn producer_index(&self) -> HashMap<NodeId, Vec<NodeId>> {
        let mut index: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for connection in self.connections() {
            index.entry(connection.input.node).or_default().push(connection.output.node);
        }
        index
    }

    /// Consumer nodes of every producer, one entry per connection
    fn consumer_index(&self) -> HashMap<NodeId, Vec<NodeId>> {
        let mut index: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for connection in self.connections() {
            index.entry(connection.output.node).or_default().push(connection.input.node);
        }
        index
    }

    /// Get nodes in topological order, producers before consumers
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let producers = self.producer_index();
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                Self::visit(*node_id, &producers, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        node_id: NodeId,
        producers: &HashMap<NodeId, Vec<NodeId>>,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if temp_mark.contains(&node_id) {
            return Err(CycleError);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        // Producers are ordered before this node
        for &producer in producers.get(&node_id).into_iter().flatten() {
            Self::visit(producer, producers, visited, temp_mark, order)?;
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }

    /// `node_id` and every node reachable from its outputs
    pub fn downstream_of(&self, node_id: NodeId) -> HashSet<NodeId> {
        let consumers = self.consumer_index();
        let mut reached = HashSet::from([node_id]);
        let mut queue = VecDeque::from([node_id]);

        while let Some(current) = queue.pop_front() {
            for &consumer in consumers.get(&current).into_iter().flatten() {
                if reached.insert(consumer) {
                    queue.push_back(consumer);
                }
            }
        }
        reached
    }

    /// Refresh every node, producers first
    pub fn refresh_all(&mut self) -> Result<(), CycleError> {
        for node_id in self.topological_order()? {
            self.refresh_node(node_id);
        }
        Ok(())
    }

    /// Refresh `node_id` and everything downstream of it
    pub fn propagate_from(&mut self, node_id: NodeId) {
        let affected = self.downstream_of(node_id);
        let order = match self.topological_order() {
            Ok(order) => order,
            Err(err) => {
                // connect() rejects cycles, so this only happens on corrupted graphs
                tracing::error!("Cannot propagate types from {:?}: {}", node_id, err);
                return;
            }
        };

        for id in order.into_iter().filter(|id| affected.contains(id)) {
            self.refresh_node(id);
        }
    }

    /// Pull producer types into `node_id`'s inputs and resolve its port types.
    ///
    /// Returns `None` for unknown nodes and nodes with fixed port types.
    pub fn refresh_node(&mut self, node_id: NodeId) -> Option<Resolution> {
        let node = self.nodes.get(&node_id)?;
        let TypeInference::Arithmetic { locked_output } = node.inference else {
            return None;
        };

        let incoming: Vec<Option<ValueType>> = node
            .inputs
            .iter()
            .map(|input| {
                let connection = self.producer_of(input.id)?;
                let producer = self.nodes.get(&connection.output.node)?;
                producer.port(&connection.output.port).map(|port| port.value_type)
            })
            .collect();

        let node = self.nodes.get_mut(&node_id)?;
        let mut ports = NodePorts::new(node, &incoming, locked_output);
        Some(self.resolver.refresh(&mut ports))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// A node's ports viewed through the resolver's collaborator contract
struct NodePorts<'a> {
    node: &'a mut Node,
    connected: Vec<bool>,
    locked_output: bool,
}

impl<'a> NodePorts<'a> {
    /// Wrap `node`, syncing connected inputs to their producer types
    fn new(node: &'a mut Node, incoming: &[Option<ValueType>], locked_output: bool) -> Self {
        let mut connected = Vec::with_capacity(node.inputs.len());
        for (input, producer) in node.inputs.iter_mut().zip(incoming) {
            if let Some(value_type) = producer {
                input.value_type = *value_type;
            }
            connected.push(producer.is_some());
        }

        Self {
            node,
            connected,
            locked_output,
        }
    }
}

impl ConnectionGroup for NodePorts<'_> {
    fn label(&self) -> Option<&str> {
        Some(&self.node.name)
    }

    fn type_state(&self) -> NodeTypeState {
        NodeTypeState {
            inputs: self
                .node
                .inputs
                .iter()
                .zip(&self.connected)
                .map(|(input, &connected)| InputState {
                    value_type: input.value_type,
                    connected,
                })
                .collect(),
            output: self.node.output(0).map_or(ValueType::Pending, |port| port.value_type),
            locked_output: self.locked_output,
        }
    }

    fn reset_value_types(&mut self) {
        for port in self.node.inputs.iter_mut().chain(self.node.outputs.iter_mut()) {
            port.reset();
        }
    }

    fn assign_default_to_empty_inputs(&mut self, value_type: ValueType) {
        for (input, connected) in self.node.inputs.iter_mut().zip(&self.connected) {
            if !connected {
                input.value_type = value_type;
            }
        }
    }

    fn set_output_type(&mut self, value_type: ValueType) {
        if let Some(output) = self.node.outputs.first_mut() {
            output.value_type = value_type;
        }
    }

    fn set_typecast_targets(&mut self, targets: &[u8]) {
        for (input, &target) in self.node.inputs.iter_mut().zip(targets) {
            input.typecast_to(target);
        }
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Source is not an output or target is not an input
    #[error("Connections must run from an output port to an input port")]
    IncompatiblePorts,

    /// Output type can't feed the input
    #[error("Cannot connect {output} output into {input} input")]
    IncompatibleTypes {
        /// Type expected by the input
        input: ValueType,
        /// Type produced by the output
        output: ValueType,
    },

    /// Port is already connected
    #[error("Port already connected: {0:?}")]
    PortAlreadyConnected(PortId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Connection would make the graph cyclic
    #[error("Connection would create a cycle")]
    WouldCreateCycle,
}

/// Error when graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;
