use std::any::Any;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortElements};
use crate::traits::Node;
use crate::transform::ModelTransformer;

use super::{check_not_empty, check_same_shape, BinaryOperation, BinaryOperationNode, SumNode};

/// Dot product of two equally sized inputs
///
/// Refines into an elementwise multiply followed by a sum.
#[derive(Debug)]
pub struct DotProductNode {
    core: NodeCore,
}

impl DotProductNode {
    /// Create a node computing `input1 · input2`
    pub fn new(input1: PortElements, input2: PortElements) -> TransformResult<Self> {
        check_same_shape(&input1, &input2)?;
        check_not_empty("DotProduct", &input1)?;
        let port_type = input1.port_type();
        Ok(Self {
            core: NodeCore::new()
                .with_input("input1", input1)
                .with_input("input2", input2)
                .with_output("output", port_type, 1),
        })
    }
}

impl Node for DotProductNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "DotProduct"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let input1 = transformer.transform_port_elements(self.core.input(0)?)?;
        let input2 = transformer.transform_port_elements(self.core.input(1)?)?;
        let new_node = transformer.add_node(DotProductNode::new(input1, input2)?)?;
        transformer.map_output_port(self.output(0)?, new_node.output(0)?)
    }

    fn refine(&self, transformer: &mut ModelTransformer) -> TransformResult<bool> {
        let input1 = transformer.transform_port_elements(self.core.input(0)?)?;
        let input2 = transformer.transform_port_elements(self.core.input(1)?)?;

        let products = transformer.add_node(BinaryOperationNode::new(
            input1,
            input2,
            BinaryOperation::Multiply,
        )?)?;
        let sum = transformer.add_node(SumNode::new(products.output(0)?.clone())?)?;

        transformer.map_output_port(self.output(0)?, sum.output(0)?)?;
        Ok(true)
    }
}
