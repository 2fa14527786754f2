use std::any::Any;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortType};
use crate::traits::Node;
use crate::transform::ModelTransformer;

/// A value fed into the model from outside
#[derive(Debug)]
pub struct InputNode {
    core: NodeCore,
}

impl InputNode {
    /// Create an input of `size` elements
    pub fn new(port_type: PortType, size: usize) -> Self {
        Self {
            core: NodeCore::new().with_output("output", port_type, size),
        }
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.core.outputs()[0].size
    }
}

impl Node for InputNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Input"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let output = self.output(0)?;
        let new_node = transformer.add_node(InputNode::new(output.port_type, output.size))?;
        transformer.map_output_port(output, new_node.output(0)?)
    }
}
