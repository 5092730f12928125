// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value-type inference for `ShadeWire` arithmetic node graphs.
//!
//! Arithmetic nodes accept scalars and 2/3/4-component vectors. Whenever the
//! graph changes, every affected node re-resolves:
//! - the type of each unconnected input (a scalar-or-vector placeholder)
//! - its output type (the dominant type of its inputs)
//! - which 2-component inputs must be widened to match the output
//!
//! ## Architecture
//!
//! - [`value_type`] holds the type lattice and the compatibility check
//! - [`resolve`] holds the per-node resolver, independent of graph storage
//! - [`graph`] stores nodes and connections and drives the resolver in
//!   topological order

pub mod config;
pub mod connection;
pub mod graph;
pub mod graphs;
pub mod node;
pub mod port;
pub mod resolve;
pub mod value_type;

pub use config::{ConfigError, ResolverConfig};
pub use connection::{Connection, ConnectionId, Endpoint};
pub use graph::{ConnectionError, CycleError, Graph};
pub use node::{Node, NodeId, NodeRegistry, NodeType, TypeInference};
pub use port::{Port, PortDirection, PortId};
pub use resolve::{ConnectionGroup, InputState, NodeTypeState, Resolution, TypeResolver};
pub use value_type::ValueType;
