//! Reference node library
//!
//! Small set of node kinds implementing [`Node`](crate::traits::Node),
//! used by the tests and benchmarks and as templates for real node libraries:
//!
//! - **Sources and sinks**: [`InputNode`], [`ConstantNode`], [`OutputNode`]
//! - **Primitives**: [`UnaryOperationNode`], [`BinaryOperationNode`], [`SumNode`]
//! - **Composites** that refine into primitives: [`DotProductNode`]
//!   (multiply + sum) and [`L2NormNode`] (dot product + square root)
//!
//! # Example
//!
//! ```ignore
//! use model_transformer::nodes::{InputNode, L2NormNode};
//!
//! let mut model = Model::new();
//! let x = model.add(InputNode::new(PortType::Real, 16))?;
//! let norm = model.add(L2NormNode::new(x.output(0)?.clone())?)?;
//! ```

/// Binary elementwise operations
pub mod binary;
/// Constant values
pub mod constant;
/// Dot product
pub mod dot_product;
/// Model inputs
pub mod input;
/// Euclidean norm
pub mod l2_norm;
/// Model outputs
pub mod output;
/// Sum of elements
pub mod sum;
/// Unary elementwise operations
pub mod unary;

pub use binary::{BinaryOperation, BinaryOperationNode};
pub use constant::ConstantNode;
pub use dot_product::DotProductNode;
pub use input::InputNode;
pub use l2_norm::L2NormNode;
pub use output::OutputNode;
pub use sum::SumNode;
pub use unary::{UnaryOperation, UnaryOperationNode};

use crate::error::{TransformError, TransformResult};
use crate::model::PortElements;

/// Check that two wirings can be combined elementwise
pub(crate) fn check_same_shape(a: &PortElements, b: &PortElements) -> TransformResult<()> {
    if a.port_type() != b.port_type() {
        return Err(TransformError::PortTypeMismatch {
            expected: a.port_type(),
            found: b.port_type(),
        });
    }
    if a.size() != b.size() {
        return Err(TransformError::SizeMismatch {
            expected: a.size(),
            found: b.size(),
        });
    }
    Ok(())
}

/// Reject wirings with no elements
pub(crate) fn check_not_empty(kind: &'static str, input: &PortElements) -> TransformResult<()> {
    if input.is_empty() {
        Err(TransformError::construction(kind, "input has no elements"))
    } else {
        Ok(())
    }
}
