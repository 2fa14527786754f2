use std::any::Any;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortElements};
use crate::traits::Node;
use crate::transform::ModelTransformer;

use super::check_not_empty;

/// Sum of all input elements
#[derive(Debug)]
pub struct SumNode {
    core: NodeCore,
}

impl SumNode {
    /// Create a node summing `input`
    pub fn new(input: PortElements) -> TransformResult<Self> {
        check_not_empty("Sum", &input)?;
        let port_type = input.port_type();
        Ok(Self {
            core: NodeCore::new()
                .with_input("input", input)
                .with_output("output", port_type, 1),
        })
    }
}

impl Node for SumNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Sum"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let input = transformer.transform_port_elements(self.core.input(0)?)?;
        let new_node = transformer.add_node(SumNode::new(input)?)?;
        transformer.map_output_port(self.output(0)?, new_node.output(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::model::PortType;

    #[test]
    fn test_empty_input_rejected() {
        let result = SumNode::new(PortElements::empty(PortType::Real));
        assert!(matches!(
            result,
            Err(TransformError::NodeConstruction { kind: "Sum", .. })
        ));
    }
}
