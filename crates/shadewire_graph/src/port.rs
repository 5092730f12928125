// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::value_type::ValueType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Current value type
    pub value_type: ValueType,
    /// Type restored when the node's port types are reset
    pub default_type: ValueType,
    /// Width this input is widened to before use, 0 for no cast
    pub typecast_target: u8,
    /// Whether multiple connections are allowed
    pub multi_connect: bool,
}

impl Port {
    /// Create a new port
    pub fn new(
        id: PortId,
        name: impl Into<String>,
        value_type: ValueType,
        direction: PortDirection,
    ) -> Self {
        let multi_connect = direction == PortDirection::Output;
        Self {
            id,
            name: name.into(),
            direction,
            value_type,
            default_type: value_type,
            typecast_target: 0,
            multi_connect,
        }
    }

    /// Create a new input port
    pub fn input(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(PortId::new(), name, value_type, PortDirection::Input)
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, value_type: ValueType) -> Self {
        // Outputs can have multiple connections by default
        Self::new(PortId::new(), name, value_type, PortDirection::Output)
    }

    /// Give the port a fresh ID, used when instantiating from a node type
    pub fn with_new_id(mut self) -> Self {
        self.id = PortId::new();
        self
    }

    /// Component count of the current value type
    pub fn component_count(&self) -> Option<u8> {
        self.value_type.component_count()
    }

    /// Component count after the typecast, if any, is applied
    pub fn effective_component_count(&self) -> Option<u8> {
        match self.typecast_target {
            0 => self.component_count(),
            target => Some(target),
        }
    }

    /// Request that this input be widened to `target` components
    pub fn typecast_to(&mut self, target: u8) {
        self.typecast_target = target;
    }

    /// Restore the declared type and drop any typecast
    pub fn reset(&mut self) {
        self.value_type = self.default_type;
        self.typecast_target = 0;
    }

    /// Whether an output of type `output` fits this port's current type without a cast
    pub fn accepts(&self, output: ValueType) -> bool {
        ValueType::compatible(self.value_type, output)
    }

    /// Check if a connection to another port is valid.
    ///
    /// Inputs are checked against their declared type; the type written by
    /// the resolver is only a hint and may be widened by a typecast.
    pub fn can_connect(&self, other: &Port) -> bool {
        // Must be opposite directions
        if self.direction == other.direction {
            return false;
        }

        let (input, output) = match self.direction {
            PortDirection::Input => (self, other),
            PortDirection::Output => (other, self),
        };
        ValueType::compatible(input.default_type, output.value_type)
    }
}
