//! Error types for model-transformer
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

use crate::model::{NodeId, PortAddress, PortElement, PortType};

/// Main error type for model transformation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// An element has no counterpart in the destination model
    #[error("No correspondence registered for element {0}")]
    UnmappedElement(PortElement),

    /// A node finished its copy or refinement without mapping one of its outputs
    #[error("Node {node} ({kind}) did not map output port {port}")]
    UnmappedOutput {
        /// Visited node
        node: NodeId,
        /// Node kind
        kind: &'static str,
        /// Unmapped output port index
        port: usize,
    },

    /// A port reference points at a node or port missing from the model
    #[error("Dangling reference to {0}")]
    DanglingReference(PortAddress),

    /// A range reaches past the end of its output port
    #[error("Range {start}..{end} out of bounds for {address} of size {size}")]
    RangeOutOfBounds {
        /// Referenced port
        address: PortAddress,
        /// Range start
        start: usize,
        /// Range end (exclusive)
        end: usize,
        /// Size of the referenced port
        size: usize,
    },

    /// Value types of two wirings disagree
    #[error("Port type mismatch: expected {expected}, found {found}")]
    PortTypeMismatch {
        /// Expected type
        expected: PortType,
        /// Actual type
        found: PortType,
    },

    /// Element counts of two wirings disagree
    #[error("Size mismatch: expected {expected} elements, found {found}")]
    SizeMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        found: usize,
    },

    /// Node not present in the model
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Node identity already present in the model
    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeId),

    /// Output port index past the node's last output
    #[error("Node {node} has no output port {port}")]
    NoSuchOutput {
        /// Node
        node: NodeId,
        /// Requested port index
        port: usize,
    },

    /// Node is not of the requested kind
    #[error("Node {node} is a {found} node, expected {expected}")]
    UnexpectedNodeKind {
        /// Node
        node: NodeId,
        /// Expected kind
        expected: &'static str,
        /// Actual kind
        found: &'static str,
    },

    /// A node-facing primitive was called outside a transformation pass
    #[error("No transformation pass is active")]
    NoActivePass,

    /// A node failed to build itself or its replacement
    #[error("Failed to construct {kind} node: {message}")]
    NodeConstruction {
        /// Kind of node being built
        kind: &'static str,
        /// Failure description
        message: String,
    },

    /// Model validation failed
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransformError {
    /// Build a node construction error
    pub fn construction(kind: &'static str, message: impl Into<String>) -> Self {
        Self::NodeConstruction {
            kind,
            message: message.into(),
        }
    }
}

/// Result type alias for transformation operations
pub type TransformResult<T> = Result<T, TransformError>;
