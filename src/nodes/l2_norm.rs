use std::any::Any;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortElements};
use crate::traits::Node;
use crate::transform::ModelTransformer;

use super::{check_not_empty, DotProductNode, UnaryOperation, UnaryOperationNode};

/// Euclidean norm of the input
///
/// Refines into `sqrt(x · x)`; the dot product then refines further on the
/// next pass.
#[derive(Debug)]
pub struct L2NormNode {
    core: NodeCore,
}

impl L2NormNode {
    /// Create a node computing `‖input‖₂`
    pub fn new(input: PortElements) -> TransformResult<Self> {
        check_not_empty("L2Norm", &input)?;
        let port_type = input.port_type();
        Ok(Self {
            core: NodeCore::new()
                .with_input("input", input)
                .with_output("output", port_type, 1),
        })
    }
}

impl Node for L2NormNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "L2Norm"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let input = transformer.transform_port_elements(self.core.input(0)?)?;
        let new_node = transformer.add_node(L2NormNode::new(input)?)?;
        transformer.map_output_port(self.output(0)?, new_node.output(0)?)
    }

    fn refine(&self, transformer: &mut ModelTransformer) -> TransformResult<bool> {
        let input = transformer.transform_port_elements(self.core.input(0)?)?;

        let squared = transformer.add_node(DotProductNode::new(input.clone(), input)?)?;
        let root = transformer.add_node(UnaryOperationNode::new(
            squared.output(0)?.clone(),
            UnaryOperation::Sqrt,
        ))?;

        transformer.map_output_port(self.output(0)?, root.output(0)?)?;
        Ok(true)
    }
}
