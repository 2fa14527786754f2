use std::any::Any;

use crate::error::TransformResult;
use crate::model::{NodeCore, PortType};
use crate::traits::Node;
use crate::transform::ModelTransformer;

/// A fixed vector of real values
#[derive(Debug)]
pub struct ConstantNode {
    core: NodeCore,
    values: Vec<f64>,
}

impl ConstantNode {
    /// Create a constant holding `values`
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            core: NodeCore::new().with_output("output", PortType::Real, values.len()),
            values,
        }
    }

    /// Constant values
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Node for ConstantNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Constant"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
        let new_node = transformer.add_node(ConstantNode::new(self.values.clone()))?;
        transformer.map_output_port(self.output(0)?, new_node.output(0)?)
    }

    fn attributes(&self) -> String {
        format!("{:?}", self.values)
    }
}
