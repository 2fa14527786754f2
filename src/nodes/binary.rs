use std::any::Any;
use std::fmt;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortElements};
use crate::traits::Node;
use crate::transform::ModelTransformer;

use super::check_same_shape;

/// Elementwise binary operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    /// a + b
    Add,
    /// a - b
    Subtract,
    /// a * b
    Multiply,
    /// a / b
    Divide,
}

impl fmt::Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOperation::Add => "add",
            BinaryOperation::Subtract => "subtract",
            BinaryOperation::Multiply => "multiply",
            BinaryOperation::Divide => "divide",
        };
        f.write_str(name)
    }
}

/// Combines two equally sized inputs element by element
#[derive(Debug)]
pub struct BinaryOperationNode {
    core: NodeCore,
    operation: BinaryOperation,
}

impl BinaryOperationNode {
    /// Create a node computing `operation(input1, input2)`
    ///
    /// Fails if the inputs differ in type or size.
    pub fn new(
        input1: PortElements,
        input2: PortElements,
        operation: BinaryOperation,
    ) -> TransformResult<Self> {
        check_same_shape(&input1, &input2)?;
        let (port_type, size) = (input1.port_type(), input1.size());
        Ok(Self {
            core: NodeCore::new()
                .with_input("input1", input1)
                .with_input("input2", input2)
                .with_output("output", port_type, size),
            operation,
        })
    }

    /// The operation applied
    pub fn operation(&self) -> BinaryOperation {
        self.operation
    }
}

impl Node for BinaryOperationNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "BinaryOperation"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let input1 = transformer.transform_port_elements(self.core.input(0)?)?;
        let input2 = transformer.transform_port_elements(self.core.input(1)?)?;
        let new_node =
            transformer.add_node(BinaryOperationNode::new(input1, input2, self.operation)?)?;
        transformer.map_output_port(self.output(0)?, new_node.output(0)?)
    }

    fn attributes(&self) -> String {
        self.operation.to_string()
    }
}
