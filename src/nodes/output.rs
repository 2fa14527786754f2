use std::any::Any;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortElements};
use crate::traits::Node;
use crate::transform::ModelTransformer;

/// Marks values the model exposes to its caller
///
/// Passes its input through unchanged.
#[derive(Debug)]
pub struct OutputNode {
    core: NodeCore,
}

impl OutputNode {
    /// Create an output reading `input`
    pub fn new(input: PortElements) -> Self {
        let (port_type, size) = (input.port_type(), input.size());
        Self {
            core: NodeCore::new()
                .with_input("input", input)
                .with_output("output", port_type, size),
        }
    }
}

impl Node for OutputNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Output"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let input = transformer.transform_port_elements(self.core.input(0)?)?;
        let new_node = transformer.add_node(OutputNode::new(input))?;
        transformer.map_output_port(self.output(0)?, new_node.output(0)?)
    }
}
