// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value types carried by arithmetic ports and the dominance rule between them.
//!
//! The types form a small widening lattice:
//! - `Pending` is the bottom element (unresolved)
//! - `Scalar` is absorbed into any vector width
//! - width-2 types never dominate another type
//! - `Vec3` and `Vec4` compare directly, with 4 winning
//!
//! Some pairs have no defined join and degrade to `Pending` so a half-wired
//! graph still settles into a stable state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type of an arithmetic port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueType {
    /// Not yet determined
    #[default]
    Pending,
    /// Single component
    Scalar,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// 4D vector
    Vec4,
    /// Accepts a scalar or a 2D vector
    ScalarOrVec2,
    /// Accepts a scalar or a 3D vector
    ScalarOrVec3,
    /// Accepts a scalar or a 4D vector
    ScalarOrVec4,
}

impl ValueType {
    /// Every value type, in declaration order
    pub const ALL: [ValueType; 8] = [
        Self::Pending,
        Self::Scalar,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::ScalarOrVec2,
        Self::ScalarOrVec3,
        Self::ScalarOrVec4,
    ];

    /// Number of components for concrete types, `None` for pending and generic types
    pub fn component_count(self) -> Option<u8> {
        match self {
            Self::Scalar => Some(1),
            Self::Vec2 => Some(2),
            Self::Vec3 => Some(3),
            Self::Vec4 => Some(4),
            Self::Pending | Self::ScalarOrVec2 | Self::ScalarOrVec3 | Self::ScalarOrVec4 => None,
        }
    }

    /// Whether this is a concrete producer type (`Scalar` through `Vec4`)
    pub fn is_concrete(self) -> bool {
        self.component_count().is_some()
    }

    /// Whether this is one of the scalar-or-vector placeholder types
    pub fn is_generic(self) -> bool {
        matches!(self, Self::ScalarOrVec2 | Self::ScalarOrVec3 | Self::ScalarOrVec4)
    }

    /// Whether this type has more than one component or may widen to a vector
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Vec2 | Self::Vec3 | Self::Vec4) || self.is_generic()
    }

    fn is_width2(self) -> bool {
        matches!(self, Self::Vec2 | Self::ScalarOrVec2)
    }

    /// Dominant type of `self` and `other`.
    ///
    /// Rules, in priority order:
    /// 1. equal types join to themselves
    /// 2. `Pending` joins to the other operand
    /// 3. `Scalar` joins to the vector operand
    /// 4. a width-2 type joins to the other operand (`Vec2` wins over `ScalarOrVec2`)
    /// 5. `Vec3` and `Vec4` join to `Vec4`
    /// 6. anything else is ambiguous and joins to `Pending`
    pub fn join(self, other: ValueType) -> ValueType {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Pending, t) | (t, Self::Pending) => t,
            (Self::Scalar, t) | (t, Self::Scalar) if t.is_vector() => t,
            (Self::Vec2, Self::ScalarOrVec2) | (Self::ScalarOrVec2, Self::Vec2) => Self::Vec2,
            (w, t) | (t, w) if w.is_width2() => t,
            (Self::Vec3, Self::Vec4) | (Self::Vec4, Self::Vec3) => Self::Vec4,
            _ => Self::Pending,
        }
    }

    /// Whether joining `self` and `other` falls through to the ambiguous case
    pub fn join_is_ambiguous(self, other: ValueType) -> bool {
        self != Self::Pending && other != Self::Pending && self.join(other) == Self::Pending
    }

    /// Fold [`ValueType::join`] over a sequence, starting from `Pending`
    pub fn join_all(types: impl IntoIterator<Item = ValueType>) -> ValueType {
        types.into_iter().fold(Self::Pending, Self::join)
    }

    /// Type used to seed unconnected inputs when the connected ones join to `self`.
    ///
    /// A scalar base is ambiguous on multi-input nodes (the empty input could
    /// be a scalar or any vector), so it only seeds `Scalar` on single-input nodes.
    pub fn to_generic(self, input_count: usize) -> ValueType {
        match self {
            Self::Scalar if input_count > 1 => Self::Pending,
            Self::Scalar => Self::Scalar,
            Self::Vec2 => Self::ScalarOrVec2,
            Self::Vec3 => Self::ScalarOrVec3,
            Self::Vec4 => Self::ScalarOrVec4,
            _ => Self::Pending,
        }
    }

    /// Whether an output of type `output` may be wired into an input expecting `input`
    pub fn compatible(input: ValueType, output: ValueType) -> bool {
        if input == output {
            return true;
        }

        match input {
            Self::Pending => output.is_concrete(),
            Self::ScalarOrVec2 => matches!(output, Self::Scalar | Self::Vec2),
            Self::ScalarOrVec3 => matches!(output, Self::Scalar | Self::Vec3),
            Self::ScalarOrVec4 => matches!(output, Self::Scalar | Self::Vec4),
            _ => false,
        }
    }

    /// Width that 2-component inputs are widened to when the output is `self`.
    ///
    /// `Some(0)` means no cast is needed, `None` means `self` is not a valid
    /// resolved output type.
    pub fn typecast_target(self) -> Option<u8> {
        match self {
            Self::Scalar | Self::ScalarOrVec2 | Self::Vec2 => Some(0),
            Self::Vec3 | Self::ScalarOrVec3 => Some(3),
            Self::Vec4 | Self::ScalarOrVec4 => Some(4),
            Self::Pending => None,
        }
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scalar => "scalar",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::ScalarOrVec2 => "scalar|vec2",
            Self::ScalarOrVec3 => "scalar|vec3",
            Self::ScalarOrVec4 => "scalar|vec4",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
