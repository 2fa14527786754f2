use std::any::Any;
use std::fmt;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortElements};
use crate::traits::Node;
use crate::transform::ModelTransformer;

/// Elementwise unary operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperation {
    /// |x|
    Abs,
    /// e^x
    Exp,
    /// ln x
    Log,
    /// -x
    Negate,
    /// √x
    Sqrt,
    /// x²
    Square,
}

impl fmt::Display for UnaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnaryOperation::Abs => "abs",
            UnaryOperation::Exp => "exp",
            UnaryOperation::Log => "log",
            UnaryOperation::Negate => "negate",
            UnaryOperation::Sqrt => "sqrt",
            UnaryOperation::Square => "square",
        };
        f.write_str(name)
    }
}

/// Applies a unary operation to every element of its input
#[derive(Debug)]
pub struct UnaryOperationNode {
    core: NodeCore,
    operation: UnaryOperation,
}

impl UnaryOperationNode {
    /// Create a node applying `operation` to `input`
    pub fn new(input: PortElements, operation: UnaryOperation) -> Self {
        let (port_type, size) = (input.port_type(), input.size());
        Self {
            core: NodeCore::new()
                .with_input("input", input)
                .with_output("output", port_type, size),
            operation,
        }
    }

    /// The operation applied
    pub fn operation(&self) -> UnaryOperation {
        self.operation
    }
}

impl Node for UnaryOperationNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "UnaryOperation"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let input = transformer.transform_port_elements(self.core.input(0)?)?;
        let new_node = transformer.add_node(UnaryOperationNode::new(input, self.operation))?;
        transformer.map_output_port(self.output(0)?, new_node.output(0)?)
    }

    fn attributes(&self) -> String {
        self.operation.to_string()
    }
}
