//! Node-facing primitives and correspondence queries
//!
//! The primitives are what a node's `copy`/`refine` calls to rebuild itself;
//! they fail outside an active pass. The queries read the table left by the
//! last top-level call.

use tracing::trace;

use crate::error::{TransformError, TransformResult};
use crate::model::{Model, NodeHandle, OutputPort, PortElements};
use crate::nodes::InputNode;
use crate::traits::Node;

use super::context::TransformContext;
use super::core::ModelTransformer;
use super::maps::ElementMap;

impl ModelTransformer {
    // ========================================================================
    // Primitives for node implementors
    // ========================================================================

    /// Translate wiring from the source model into the destination model
    ///
    /// Every referenced element must already be mapped, which dependency
    /// order guarantees for the inputs of the node being visited.
    pub fn transform_port_elements(&self, elements: &PortElements) -> TransformResult<PortElements> {
        self.ensure_pass()?;
        self.translate(elements)
    }

    /// Append a node to the destination model
    ///
    /// The node's inputs must refer to elements already in the destination
    /// model; a refinement wiring to anything else fails here.
    pub fn add_node<T: Node>(&mut self, node: T) -> TransformResult<NodeHandle> {
        self.ensure_pass()?;
        let kind = node.kind();
        let handle = self.model.add(node)?;
        self.stats.nodes_added += 1;
        trace!(node = %handle.id(), kind, "added node");
        Ok(handle)
    }

    /// Map source elements onto destination elements, element by element
    ///
    /// Existing entries are overwritten. The destination elements must exist
    /// in the destination model.
    pub fn map_node_output(
        &mut self,
        old_elements: &PortElements,
        new_elements: &PortElements,
    ) -> TransformResult<()> {
        self.ensure_pass()?;

        if old_elements.port_type() != new_elements.port_type() {
            return Err(TransformError::PortTypeMismatch {
                expected: old_elements.port_type(),
                found: new_elements.port_type(),
            });
        }
        if old_elements.size() != new_elements.size() {
            return Err(TransformError::SizeMismatch {
                expected: old_elements.size(),
                found: new_elements.size(),
            });
        }
        self.model.check_elements(new_elements)?;

        for (old, new) in old_elements.elements().zip(new_elements.elements()) {
            self.element_map.insert(old, new);
        }
        Ok(())
    }

    /// Map a whole source output port onto destination elements
    pub fn map_output_port(
        &mut self,
        old_port: &OutputPort,
        new_elements: &PortElements,
    ) -> TransformResult<()> {
        self.map_node_output(&old_port.elements(), new_elements)
    }

    /// Map a whole source output port onto a whole destination output port
    pub fn map_output_port_to_port(
        &mut self,
        old_port: &OutputPort,
        new_port: &OutputPort,
    ) -> TransformResult<()> {
        self.map_node_output(&old_port.elements(), &new_port.elements())
    }

    /// Context of the active pass
    pub fn context(&self) -> &TransformContext {
        &self.context
    }

    /// Destination model under construction
    pub fn model(&self) -> &Model {
        &self.model
    }

    // ========================================================================
    // Correspondence queries
    // ========================================================================

    /// Destination elements corresponding to source `elements`
    pub fn corresponding_outputs(&self, elements: &PortElements) -> TransformResult<PortElements> {
        self.translate(elements)
    }

    /// Destination elements corresponding to a whole source output port
    pub fn corresponding_port(&self, port: &OutputPort) -> TransformResult<PortElements> {
        self.translate(&port.elements())
    }

    /// Input node of `new_model` corresponding to `node` of the source model
    ///
    /// `new_model` must be the model returned by the last top-level call.
    pub fn corresponding_input_node<'m>(
        &self,
        node: &InputNode,
        new_model: &'m Model,
    ) -> TransformResult<&'m InputNode> {
        let elements = self.corresponding_port(node.output(0)?)?;
        let address = elements
            .ranges()
            .first()
            .map(|r| r.address)
            .ok_or_else(|| TransformError::Internal(format!("input node {} is empty", node.id())))?;

        let candidate = new_model
            .node(address.node)
            .ok_or(TransformError::NodeNotFound(address.node))?;
        candidate
            .downcast_ref::<InputNode>()
            .ok_or(TransformError::UnexpectedNodeKind {
                node: candidate.id(),
                expected: "Input",
                found: candidate.kind(),
            })
    }

    /// The whole correspondence table
    pub fn correspondence(&self) -> &ElementMap {
        &self.element_map
    }

    pub(crate) fn take_correspondence(&mut self) -> ElementMap {
        std::mem::take(&mut self.element_map)
    }

    pub(crate) fn restore_correspondence(&mut self, map: ElementMap) {
        self.element_map = map;
    }

    fn translate(&self, elements: &PortElements) -> TransformResult<PortElements> {
        let translated = elements
            .elements()
            .map(|e| {
                self.element_map
                    .get(&e)
                    .copied()
                    .ok_or(TransformError::UnmappedElement(e))
            })
            .collect::<TransformResult<Vec<_>>>()?;
        Ok(PortElements::from_elements(translated, elements.port_type()))
    }

    fn ensure_pass(&self) -> TransformResult<()> {
        if self.in_pass {
            Ok(())
        } else {
            Err(TransformError::NoActivePass)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, PortAddress, PortRange, PortType};
    use crate::nodes::{ConstantNode, OutputNode, SumNode};

    fn make_test_model() -> (Model, NodeId, NodeId) {
        let mut model = Model::new();
        let input = model.add(InputNode::new(PortType::Real, 4)).unwrap();
        let sum = model
            .add(SumNode::new(input.output(0).unwrap().clone()).unwrap())
            .unwrap();
        (model, input.id(), sum.id())
    }

    #[test]
    fn test_primitives_outside_pass() {
        let mut transformer = ModelTransformer::new();
        let constant = ConstantNode::new(vec![1.0]);
        let elements = constant.output(0).unwrap().elements();

        assert_eq!(
            transformer.add_node(constant).unwrap_err(),
            TransformError::NoActivePass
        );
        assert_eq!(
            transformer.transform_port_elements(&elements).unwrap_err(),
            TransformError::NoActivePass
        );
        assert_eq!(
            transformer.map_node_output(&elements, &elements).unwrap_err(),
            TransformError::NoActivePass
        );
    }

    #[test]
    fn test_query_before_any_pass() {
        let (model, input, _) = make_test_model();
        let input = model.node_as::<InputNode>(input).unwrap();
        let transformer = ModelTransformer::new();

        assert!(matches!(
            transformer.corresponding_port(input.output(0).unwrap()),
            Err(TransformError::UnmappedElement(_))
        ));
        assert!(transformer.corresponding_input_node(input, &model).is_err());
    }

    #[test]
    fn test_corresponding_input_node() {
        let (model, input, _) = make_test_model();
        let input = model.node_as::<InputNode>(input).unwrap();
        let mut transformer = ModelTransformer::new();
        let copy = transformer.copy_model(&model, &TransformContext::new()).unwrap();

        let new_input = transformer.corresponding_input_node(input, &copy).unwrap();
        assert_ne!(new_input.id(), input.id());
        assert_eq!(new_input.output(0).unwrap().size, 4);
        assert!(copy.contains(new_input.id()));
    }

    #[test]
    fn test_corresponding_partial_elements() {
        let (model, input, _) = make_test_model();
        let input = model.node_as::<InputNode>(input).unwrap();
        let mut transformer = ModelTransformer::new();
        let copy = transformer.copy_model(&model, &TransformContext::new()).unwrap();

        let tail = input.output(0).unwrap().elements().slice(2, 2).unwrap();
        let new_tail = transformer.corresponding_outputs(&tail).unwrap();
        let new_input = transformer.corresponding_input_node(input, &copy).unwrap();

        assert_eq!(
            new_tail.ranges(),
            &[PortRange::new(PortAddress::new(new_input.id(), 0), 2, 2)]
        );
    }

    #[test]
    fn test_map_node_output_checks() {
        let (model, _, _) = make_test_model();
        let mut transformer = ModelTransformer::new();

        let result = transformer.transform_model(
            &model,
            |node, t| {
                if node.is::<SumNode>() {
                    let wide = t.add_node(ConstantNode::new(vec![1.0, 2.0]))?;
                    let err = t
                        .map_output_port(node.output(0)?, wide.output(0)?)
                        .unwrap_err();
                    assert_eq!(err, TransformError::SizeMismatch { expected: 1, found: 2 });

                    let foreign = ConstantNode::new(vec![3.0]);
                    let err = t
                        .map_output_port(node.output(0)?, &foreign.output(0)?.elements())
                        .unwrap_err();
                    assert!(matches!(err, TransformError::DanglingReference(_)));

                    t.map_output_port(node.output(0)?, &wide.output(0)?.slice(1, 1)?)
                } else {
                    node.copy(t)
                }
            },
            &TransformContext::new(),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_add_node_rejects_foreign_inputs() {
        let (model, input, _) = make_test_model();
        let untranslated = model.node(input).unwrap().output(0).unwrap().elements();
        let mut transformer = ModelTransformer::new();

        let result = transformer.transform_model(
            &model,
            |node, t| {
                if node.is::<SumNode>() {
                    // wires to the source model instead of translating
                    t.add_node(SumNode::new(untranslated.clone())?)?;
                    unreachable!("add_node must reject source-model wiring");
                }
                node.copy(t)
            },
            &TransformContext::new(),
        );

        assert!(matches!(result, Err(TransformError::DanglingReference(_))));
    }

    #[test]
    fn test_several_old_ports_share_new_output() {
        let mut model = Model::new();
        let a = model.add(InputNode::new(PortType::Real, 1)).unwrap();
        let first = model.add(OutputNode::new(a.output(0).unwrap().clone())).unwrap();
        let second = model.add(OutputNode::new(a.output(0).unwrap().clone())).unwrap();

        let mut transformer = ModelTransformer::new();
        let merged = transformer
            .transform_model(
                &model,
                |node, t| {
                    if node.is::<OutputNode>() {
                        // both outputs collapse onto the input itself
                        let source = t.transform_port_elements(&node.inputs()[0].elements)?;
                        t.map_output_port(node.output(0)?, &source)
                    } else {
                        node.copy(t)
                    }
                },
                &TransformContext::new(),
            )
            .unwrap();

        assert_eq!(merged.len(), 1);
        let first_port = model.node(first.id()).unwrap().output(0).unwrap();
        let second_port = model.node(second.id()).unwrap().output(0).unwrap();
        assert_eq!(
            transformer.corresponding_port(first_port).unwrap(),
            transformer.corresponding_port(second_port).unwrap()
        );
    }
}
