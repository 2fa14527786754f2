//! Model: an append-only, dependency-ordered node table

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::{TransformError, TransformResult};
use crate::traits::Node;

use super::ports::{NodeId, OutputPort, PortAddress, PortElements};

/// Node table type: node id → node (insertion order preserved)
pub type NodeMap = IndexMap<NodeId, Box<dyn Node>>;

/// Computation graph
///
/// Nodes can only be appended, and only once every node they read from is
/// already present. Insertion order is therefore always a valid dependency
/// order, and the model can never contain a cycle or a dangling reference.
#[derive(Default)]
pub struct Model {
    nodes: NodeMap,
}

/// Identity and outputs of a node just added to a model
///
/// Returned by [`Model::add`] and
/// [`ModelTransformer::add_node`](crate::transform::ModelTransformer::add_node)
/// so callers can wire further nodes to it without borrowing the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    id: NodeId,
    outputs: SmallVec<[PortElements; 1]>,
}

impl NodeHandle {
    /// Identity of the added node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// All elements of output port `index`
    pub fn output(&self, index: usize) -> TransformResult<&PortElements> {
        self.outputs.get(index).ok_or(TransformError::NoSuchOutput {
            node: self.id,
            port: index,
        })
    }

    /// Number of output ports
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }

    /// Append a node
    ///
    /// Fails if the node's identity is already taken, if any of its inputs
    /// refers to an element that does not exist in this model, or if one of
    /// its output ports has no elements.
    pub fn add<T: Node>(&mut self, node: T) -> TransformResult<NodeHandle> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(TransformError::DuplicateNode(id));
        }
        if let Some(port) = node.outputs().iter().find(|p| p.size == 0) {
            return Err(TransformError::construction(
                node.kind(),
                format!("output port {} has no elements", port.index()),
            ));
        }
        for input in node.inputs() {
            self.check_elements(&input.elements)?;
        }

        let handle = NodeHandle {
            id,
            outputs: node.outputs().iter().map(OutputPort::elements).collect(),
        };
        self.nodes.insert(id, Box::new(node));
        Ok(handle)
    }

    /// Verify that every range of `elements` lies within an output port of
    /// this model and that the port types agree
    pub fn check_elements(&self, elements: &PortElements) -> TransformResult<()> {
        for range in elements.ranges() {
            let port = self
                .output_port(&range.address)
                .ok_or(TransformError::DanglingReference(range.address))?;
            if port.port_type != elements.port_type() {
                return Err(TransformError::PortTypeMismatch {
                    expected: elements.port_type(),
                    found: port.port_type,
                });
            }
            if range.end() > port.size {
                return Err(TransformError::RangeOutOfBounds {
                    address: range.address,
                    start: range.start,
                    end: range.end(),
                    size: port.size,
                });
            }
        }
        Ok(())
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the model is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        self.nodes.get(&id).map(|n| n.as_ref())
    }

    /// Get a node by id as a concrete type
    pub fn node_as<T: Node>(&self, id: NodeId) -> Option<&T> {
        self.node(id).and_then(|n| n.downcast_ref::<T>())
    }

    /// Position of a node in dependency order
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    /// Iterate nodes in dependency order
    pub fn nodes(&self) -> impl Iterator<Item = &dyn Node> {
        self.nodes.values().map(|n| n.as_ref())
    }

    /// Iterate node ids in dependency order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// All nodes of a concrete type, in dependency order
    pub fn nodes_of_type<T: Node>(&self) -> Vec<&T> {
        self.nodes().filter_map(|n| n.downcast_ref::<T>()).collect()
    }

    /// Node owning the given output port
    pub fn owner_of(&self, address: &PortAddress) -> Option<&dyn Node> {
        self.node(address.node)
            .filter(|n| address.port < n.outputs().len())
    }

    /// Output port at the given address
    pub fn output_port(&self, address: &PortAddress) -> Option<&OutputPort> {
        self.node(address.node)
            .and_then(|n| n.outputs().get(address.port))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.nodes.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeCore, PortRange, PortType};
    use crate::nodes::{BinaryOperation, BinaryOperationNode, ConstantNode, InputNode};
    use crate::transform::ModelTransformer;

    #[test]
    fn test_add_and_lookup() {
        let mut model = Model::new();
        let input = model.add(InputNode::new(PortType::Real, 2)).unwrap();
        let constant = model.add(ConstantNode::new(vec![1.0, 2.0])).unwrap();
        let sum = model
            .add(
                BinaryOperationNode::new(
                    input.output(0).unwrap().clone(),
                    constant.output(0).unwrap().clone(),
                    BinaryOperation::Add,
                )
                .unwrap(),
            )
            .unwrap();

        assert_eq!(model.len(), 3);
        assert!(model.contains(sum.id()));
        assert_eq!(model.position(sum.id()), Some(2));
        assert!(model.node_as::<InputNode>(input.id()).is_some());
        assert!(model.node_as::<InputNode>(sum.id()).is_none());
        assert_eq!(model.nodes_of_type::<ConstantNode>().len(), 1);

        let address = PortAddress::new(constant.id(), 0);
        assert_eq!(model.owner_of(&address).unwrap().id(), constant.id());
        assert!(model.owner_of(&PortAddress::new(constant.id(), 1)).is_none());
    }

    #[test]
    fn test_add_rejects_dangling_input() {
        let mut other = Model::new();
        let foreign = other.add(InputNode::new(PortType::Real, 2)).unwrap();

        let mut model = Model::new();
        let local = model.add(InputNode::new(PortType::Real, 2)).unwrap();
        let result = model.add(
            BinaryOperationNode::new(
                local.output(0).unwrap().clone(),
                foreign.output(0).unwrap().clone(),
                BinaryOperation::Multiply,
            )
            .unwrap(),
        );

        assert!(matches!(result, Err(TransformError::DanglingReference(_))));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_check_elements_bounds_and_type() {
        let mut model = Model::new();
        let input = model.add(InputNode::new(PortType::Real, 2)).unwrap();
        let address = PortAddress::new(input.id(), 0);

        let too_long = PortElements::from_range(PortRange::new(address, 1, 2), PortType::Real);
        assert!(matches!(
            model.check_elements(&too_long),
            Err(TransformError::RangeOutOfBounds { end: 3, size: 2, .. })
        ));

        let wrong_type = PortElements::from_range(PortRange::new(address, 0, 2), PortType::Integer);
        assert!(matches!(
            model.check_elements(&wrong_type),
            Err(TransformError::PortTypeMismatch { .. })
        ));

        assert!(model.check_elements(input.output(0).unwrap()).is_ok());
    }

    /// Node borrowing a shared core, so two instances can claim one identity
    #[derive(Debug)]
    struct SharedCoreNode {
        core: &'static NodeCore,
    }

    impl Node for SharedCoreNode {
        fn core(&self) -> &NodeCore {
            self.core
        }

        fn kind(&self) -> &'static str {
            "SharedCore"
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn copy(&self, _transformer: &mut ModelTransformer) -> TransformResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let core: &'static NodeCore =
            Box::leak(Box::new(NodeCore::new().with_output("output", PortType::Real, 1)));
        let mut model = Model::new();
        model.add(SharedCoreNode { core }).unwrap();
        assert!(matches!(
            model.add(SharedCoreNode { core }),
            Err(TransformError::DuplicateNode(_))
        ));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_add_rejects_empty_output_port() {
        let mut model = Model::new();
        let result = model.add(InputNode::new(PortType::Real, 0));
        assert!(matches!(
            result,
            Err(TransformError::NodeConstruction { kind: "Input", .. })
        ));
        assert!(model.is_empty());

        assert!(model.add(ConstantNode::new(Vec::new())).is_err());
    }
}
