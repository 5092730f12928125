// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic graph node types.
//!
//! Constants have fixed output types. Arithmetic nodes start with pending
//! ports and take their types from whatever gets wired into them; reductions
//! such as `dot` resolve their inputs the same way but always output a scalar.

use crate::node::{NodeCategory, NodeRegistry, NodeType, TypeInference};
use crate::port::Port;
use crate::value_type::ValueType;

fn constant(id: &str, name: &str, value_type: ValueType) -> NodeType {
    NodeType {
        id: id.to_string(),
        name: name.to_string(),
        category: NodeCategory::Input,
        description: format!("Constant {value_type} value"),
        inference: TypeInference::Fixed,
        inputs: vec![],
        outputs: vec![Port::output("Value", value_type)],
    }
}

fn arithmetic(id: &str, name: &str, description: &str, inputs: &[&str]) -> NodeType {
    NodeType {
        id: id.to_string(),
        name: name.to_string(),
        category: NodeCategory::Arithmetic,
        description: description.to_string(),
        inference: TypeInference::arithmetic(),
        inputs: inputs
            .iter()
            .map(|name| Port::input(*name, ValueType::Pending))
            .collect(),
        outputs: vec![Port::output("Out", ValueType::Pending)],
    }
}

fn reduction(id: &str, name: &str, description: &str, inputs: &[&str]) -> NodeType {
    NodeType {
        category: NodeCategory::Vector,
        inference: TypeInference::locked(),
        outputs: vec![Port::output("Out", ValueType::Scalar)],
        ..arithmetic(id, name, description, inputs)
    }
}

/// Create the arithmetic node registry with all available node types
pub fn create_arithmetic_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Constants
    // ========================================================================

    registry.register(constant("value", "Value", ValueType::Scalar));
    registry.register(constant("vector2", "Vector 2", ValueType::Vec2));
    registry.register(constant("vector3", "Vector 3", ValueType::Vec3));
    registry.register(constant("vector4", "Vector 4", ValueType::Vec4));

    // ========================================================================
    // Component-wise arithmetic
    // ========================================================================

    registry.register(arithmetic("add", "Add", "A + B", &["A", "B"]));
    registry.register(arithmetic("subtract", "Subtract", "A - B", &["A", "B"]));
    registry.register(arithmetic("multiply", "Multiply", "A * B", &["A", "B"]));
    registry.register(arithmetic("divide", "Divide", "A / B", &["A", "B"]));
    registry.register(arithmetic("min", "Min", "Component-wise minimum", &["A", "B"]));
    registry.register(arithmetic("max", "Max", "Component-wise maximum", &["A", "B"]));
    registry.register(arithmetic("power", "Power", "Val raised to Exp", &["Val", "Exp"]));
    registry.register(arithmetic("lerp", "Lerp", "Blend between A and B by T", &["A", "B", "T"]));
    registry.register(arithmetic("abs", "Abs", "Absolute value", &["In"]));
    registry.register(arithmetic("fract", "Frac", "Fractional part", &["In"]));

    // ========================================================================
    // Reductions (output locked to scalar)
    // ========================================================================

    registry.register(reduction("dot", "Dot", "Dot product of A and B", &["A", "B"]));
    registry.register(reduction("distance", "Distance", "Distance between A and B", &["A", "B"]));
    registry.register(reduction("length", "Length", "Vector length", &["In"]));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contents() {
        let registry = create_arithmetic_registry();
        assert_eq!(registry.types_in_category(NodeCategory::Input).count(), 4);
        assert_eq!(registry.types_in_category(NodeCategory::Arithmetic).count(), 10);
        assert_eq!(registry.types_in_category(NodeCategory::Vector).count(), 3);
    }

    #[test]
    fn test_lerp_has_three_pending_inputs() {
        let lerp = create_arithmetic_registry().create_node("lerp").unwrap();
        assert_eq!(lerp.inputs.len(), 3);
        assert!(lerp.inputs.iter().all(|p| p.default_type == ValueType::Pending));
        assert_eq!(lerp.inference, TypeInference::arithmetic());
    }

    #[test]
    fn test_reductions_are_locked_to_scalar() {
        let registry = create_arithmetic_registry();
        for id in ["dot", "distance", "length"] {
            let node = registry.create_node(id).unwrap();
            assert_eq!(node.inference, TypeInference::locked(), "{id}");
            assert_eq!(node.outputs[0].value_type, ValueType::Scalar, "{id}");
        }
    }

    #[test]
    fn test_constants_are_fixed() {
        let node = create_arithmetic_registry().create_node("vector3").unwrap();
        assert!(!node.is_arithmetic());
        assert_eq!(node.outputs[0].value_type, ValueType::Vec3);
    }
}
