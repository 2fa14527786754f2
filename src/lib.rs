//! # Model Transformer
//!
//! Copy, refinement, and generic transformation passes over typed dataflow
//! models.
//!
//! A [`Model`](model::Model) is an append-only graph of nodes whose inputs
//! reference individual elements of earlier nodes' output ports. The
//! [`ModelTransformer`](transform::ModelTransformer) rebuilds a model pass by
//! pass while recording where every source output element ended up, so callers
//! can always locate the counterpart of an original output in the result.
//!
//! ## Features
//!
//! - **Copy**: Structurally identical copy of a model or of the ancestors of
//!   selected outputs
//! - **Refine**: Repeatedly replace composite nodes by finer ones until
//!   nothing changes, every node is compilable, or the pass limit is hit
//! - **Transform**: Run an arbitrary per-node rewrite as a single pass
//! - **Pipelines**: Chain passes while keeping end-to-end correspondence
//!
//! ## Example
//!
//! ```ignore
//! use model_transformer::prelude::*;
//! use model_transformer::nodes::{InputNode, L2NormNode};
//!
//! let mut model = Model::new();
//! let x = model.add(InputNode::new(PortType::Real, 8))?;
//! let norm = model.add(L2NormNode::new(x.output(0)?.clone())?)?;
//!
//! let mut transformer = ModelTransformer::new();
//! let refined = transformer.refine_model(&model, &TransformContext::new(), 10)?;
//! let result = transformer.corresponding_outputs(norm.output(0)?)?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod error;
pub mod model;
pub mod nodes;
pub mod traits;
pub mod transform;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use model_transformer::prelude::*`
pub mod prelude {
    pub use crate::error::{TransformError, TransformResult};
    pub use crate::model::{
        validate_model, Model, NodeHandle, NodeId, OutputPort, PortAddress, PortElement,
        PortElements, PortType,
    };
    pub use crate::traits::{ModelPass, Node, TransformPipeline};
    pub use crate::transform::{
        CopyPass, FnPass, ModelTransformer, NodeAction, RefinePass, TransformConfig,
        TransformContext,
    };
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{TransformError, TransformResult};
pub use traits::Node;

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_prelude_end_to_end() {
        use crate::nodes::{InputNode, L2NormNode, OutputNode};
        use crate::prelude::*;

        let mut model = Model::new();
        let x = model.add(InputNode::new(PortType::Real, 4)).unwrap();
        let norm = model
            .add(L2NormNode::new(x.output(0).unwrap().clone()).unwrap())
            .unwrap();
        model
            .add(OutputNode::new(norm.output(0).unwrap().clone()))
            .unwrap();

        let mut transformer = ModelTransformer::new();
        let refined = transformer
            .refine_model(&model, &TransformContext::new(), 10)
            .unwrap();
        assert!(validate_model(&refined).is_valid);

        let result = transformer
            .corresponding_outputs(norm.output(0).unwrap())
            .unwrap();
        assert_eq!(result.size(), 1);
        let owner = refined.owner_of(&result.ranges()[0].address).unwrap();
        assert_eq!(owner.kind(), "UnaryOperation");
    }
}
