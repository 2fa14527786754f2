//! Model data structures
//!
//! This module provides the graph the engine reads and writes:
//!
//! - [`Model`]: append-only, dependency-ordered node table
//! - [`ports`]: identities and wirings of node outputs
//! - [`NodeCore`]: identity and ports embedded in every node kind
//! - [`validation`]: structural consistency checks
//!
//! # Overview
//!
//! A model is built by appending nodes. A node can only be appended once
//! every output it reads from is already in the model, so iteration order is
//! always a dependency order.
//!
//! # Example
//!
//! ```ignore
//! use model_transformer::model::{Model, PortType};
//! use model_transformer::nodes::{InputNode, SumNode};
//!
//! let mut model = Model::new();
//! let input = model.add(InputNode::new(PortType::Real, 8))?;
//! let sum = model.add(SumNode::new(input.output(0)?.clone())?)?;
//!
//! for node in model.nodes() {
//!     println!("{} {}", node.id(), node.kind());
//! }
//! ```

pub mod accessors;
pub mod graph;
pub mod node;
pub mod ports;
pub mod validation;

// Re-export main types
pub use graph::{Model, NodeHandle, NodeMap};
pub use node::NodeCore;
pub use ports::{
    InputPort, NodeId, OutputPort, PortAddress, PortElement, PortElements, PortRange, PortType,
};
pub use validation::{validate_model, ValidationResult};
