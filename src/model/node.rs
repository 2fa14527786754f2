//! Identity and ports shared by every node kind

use smallvec::SmallVec;

use crate::error::{TransformError, TransformResult};

use super::ports::{InputPort, NodeId, OutputPort, PortAddress, PortElements, PortType};

/// Identity, input wirings, and output ports of a node
///
/// Every node kind embeds one `NodeCore` and exposes it through
/// [`Node::core`](crate::traits::Node::core). The identity is allocated when
/// the core is created and never changes. Cores are not `Clone`, so no two
/// nodes ever share an identity.
#[derive(Debug)]
pub struct NodeCore {
    id: NodeId,
    inputs: SmallVec<[InputPort; 2]>,
    outputs: SmallVec<[OutputPort; 1]>,
}

impl NodeCore {
    /// Create a core with a fresh identity and no ports
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
        }
    }

    /// Add an input wired to `elements`
    pub fn with_input(mut self, name: &'static str, elements: PortElements) -> Self {
        self.inputs.push(InputPort { name, elements });
        self
    }

    /// Add an output port
    pub fn with_output(mut self, name: &'static str, port_type: PortType, size: usize) -> Self {
        let address = PortAddress::new(self.id, self.outputs.len());
        self.outputs.push(OutputPort {
            address,
            name,
            port_type,
            size,
        });
        self
    }

    /// Node identity
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Input ports in order
    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    /// Output ports in order
    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    /// Wiring of input `index`
    pub fn input(&self, index: usize) -> TransformResult<&PortElements> {
        self.inputs
            .get(index)
            .map(|i| &i.elements)
            .ok_or_else(|| TransformError::Internal(format!("{} has no input {index}", self.id)))
    }

    /// Output port `index`
    pub fn output(&self, index: usize) -> TransformResult<&OutputPort> {
        self.outputs.get(index).ok_or(TransformError::NoSuchOutput {
            node: self.id,
            port: index,
        })
    }
}

impl Default for NodeCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_addresses() {
        let core = NodeCore::new()
            .with_output("first", PortType::Real, 3)
            .with_output("second", PortType::Boolean, 1);

        assert_eq!(core.outputs().len(), 2);
        assert_eq!(core.outputs()[1].address, PortAddress::new(core.id(), 1));
        assert_eq!(core.output(0).unwrap().size, 3);
        assert!(matches!(
            core.output(2),
            Err(TransformError::NoSuchOutput { port: 2, .. })
        ));
    }

    #[test]
    fn test_inputs_preserve_order() {
        let source = NodeCore::new().with_output("output", PortType::Real, 2);
        let wiring = source.outputs()[0].elements();
        let core = NodeCore::new()
            .with_input("input1", wiring.clone())
            .with_input("input2", wiring.slice(1, 1).unwrap());

        assert_eq!(core.inputs()[0].name, "input1");
        assert_eq!(core.input(1).unwrap().size(), 1);
        assert!(core.input(2).is_err());
    }
}
