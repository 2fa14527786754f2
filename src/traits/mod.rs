//! Core traits for model-transformer
//!
//! Defines the two extension points of the engine:
//!
//! - [`Node`]: the capability every node kind implements so the transformer
//!   can copy or refine it without knowing its concrete type
//! - [`ModelPass`]: a whole-model step that can be chained in a
//!   [`TransformPipeline`]

use std::any::Any;
use std::fmt;

use smallvec::SmallVec;
use tracing::debug;

use crate::error::TransformResult;
use crate::model::{InputPort, Model, NodeCore, NodeId, OutputPort};
use crate::transform::{compose_maps, ModelTransformer};

/// Capability implemented by every node kind
///
/// A node never mutates itself or the model it lives in. During a pass the
/// transformer hands itself to the node, and the node rebuilds itself in the
/// destination model through the transformer's primitives.
///
/// # Example
///
/// ```ignore
/// impl Node for NegateNode {
///     fn core(&self) -> &NodeCore { &self.core }
///     fn kind(&self) -> &'static str { "Negate" }
///     fn as_any(&self) -> &dyn Any { self }
///
///     fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()> {
///         let input = transformer.transform_port_elements(self.core.input(0)?)?;
///         let new_node = transformer.add_node(NegateNode::new(input))?;
///         transformer.map_output_port(self.output(0)?, new_node.output(0)?)
///     }
/// }
/// ```
pub trait Node: fmt::Debug + Any {
    /// Identity and ports
    fn core(&self) -> &NodeCore;

    /// Kind name, stable across instances of the same node type
    fn kind(&self) -> &'static str;

    /// Upcast for typed lookups
    fn as_any(&self) -> &dyn Any;

    /// Build an identical node in the destination model and map every output
    fn copy(&self, transformer: &mut ModelTransformer) -> TransformResult<()>;

    /// Build an equivalent node or sub-graph in the destination model
    ///
    /// Returns `true` when the node replaced itself with something other than
    /// a copy. The default copies.
    fn refine(&self, transformer: &mut ModelTransformer) -> TransformResult<bool> {
        self.copy(transformer)?;
        Ok(false)
    }

    /// Kind-specific parameters that take part in structural comparison
    ///
    /// Node kinds with parameters must override this and render every one of
    /// them. Refinement stops once a pass leaves the model structurally
    /// unchanged, and two nodes of the same kind with equal wiring but
    /// different unrendered parameters compare equal. The default renders
    /// nothing, which is only right for parameterless kinds.
    fn attributes(&self) -> String {
        String::new()
    }

    /// Node identity
    fn id(&self) -> NodeId {
        self.core().id()
    }

    /// Input ports in order
    fn inputs(&self) -> &[InputPort] {
        self.core().inputs()
    }

    /// Output ports in order
    fn outputs(&self) -> &[OutputPort] {
        self.core().outputs()
    }

    /// Output port `index`
    fn output(&self, index: usize) -> TransformResult<&OutputPort> {
        self.core().output(index)
    }

    /// Nodes feeding this node, in first-use order, without duplicates
    fn dependencies(&self) -> SmallVec<[NodeId; 4]> {
        let mut ids: SmallVec<[NodeId; 4]> = SmallVec::new();
        for input in self.inputs() {
            for address in input.elements.addresses() {
                if !ids.contains(&address.node) {
                    ids.push(address.node);
                }
            }
        }
        ids
    }
}

impl dyn Node {
    /// Downcast to a concrete node type
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Check the concrete node type
    pub fn is<T: Node>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// A whole-model transformation step
pub trait ModelPass {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Transform `model`, leaving the old→new correspondence in `transformer`
    fn run(&self, model: &Model, transformer: &mut ModelTransformer) -> TransformResult<Model>;
}

/// Ordered chain of passes
///
/// After [`run`](Self::run) the transformer's correspondence table maps the
/// input model to the final model across all passes.
#[derive(Default)]
pub struct TransformPipeline {
    passes: Vec<Box<dyn ModelPass>>,
}

impl TransformPipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Add a pass to the pipeline
    #[allow(clippy::should_implement_trait)]
    pub fn add<P: ModelPass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Number of passes
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order
    ///
    /// An empty pipeline behaves like a plain copy.
    pub fn run(&self, model: &Model, transformer: &mut ModelTransformer) -> TransformResult<Model> {
        let Some((first, rest)) = self.passes.split_first() else {
            return transformer.copy_model(model, &Default::default());
        };

        debug!(pass = first.name(), "running pipeline pass");
        let mut current = first.run(model, transformer)?;
        let mut correspondence = transformer.take_correspondence();

        for pass in rest {
            debug!(pass = pass.name(), nodes = current.len(), "running pipeline pass");
            let next = pass.run(&current, transformer)?;
            correspondence = compose_maps(&correspondence, &transformer.take_correspondence());
            current = next;
        }

        transformer.restore_correspondence(correspondence);
        Ok(current)
    }
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.passes.iter().map(|p| p.name()).collect();
        f.debug_struct("TransformPipeline")
            .field("passes", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PortType;
    use crate::nodes::{DotProductNode, InputNode, L2NormNode, SumNode};
    use crate::transform::{CopyPass, RefinePass, TransformContext};

    fn make_test_model() -> (Model, NodeId, NodeId) {
        let mut model = Model::new();
        let input = model.add(InputNode::new(PortType::Real, 3)).unwrap();
        let norm = model
            .add(L2NormNode::new(input.output(0).unwrap().clone()).unwrap())
            .unwrap();
        (model, input.id(), norm.id())
    }

    #[test]
    fn test_dependencies() {
        let (model, input, norm) = make_test_model();
        let node = model.node(norm).unwrap();
        assert_eq!(node.dependencies().as_slice(), &[input]);
        assert!(model.node(input).unwrap().dependencies().is_empty());
    }

    #[test]
    fn test_downcast() {
        let (model, input, norm) = make_test_model();
        assert!(model.node(input).unwrap().is::<InputNode>());
        assert!(model.node(norm).unwrap().downcast_ref::<InputNode>().is_none());
        assert!(model.node(norm).unwrap().downcast_ref::<L2NormNode>().is_some());
    }

    #[test]
    fn test_empty_pipeline_copies() {
        let (model, _, _) = make_test_model();
        let mut transformer = ModelTransformer::new();
        let result = TransformPipeline::new().run(&model, &mut transformer).unwrap();
        assert_eq!(result.len(), model.len());
        assert!(result.structurally_equals(&model));
    }

    #[test]
    fn test_pipeline_composes_correspondence() {
        let (model, _, norm) = make_test_model();
        let pipeline = TransformPipeline::new()
            .add(CopyPass::new(TransformContext::new()))
            .add(RefinePass::new(TransformContext::new(), 1))
            .add(RefinePass::new(TransformContext::new(), 1));
        assert_eq!(pipeline.len(), 3);

        let mut transformer = ModelTransformer::new();
        let result = pipeline.run(&model, &mut transformer).unwrap();

        // L2Norm -> DotProduct + Sqrt -> Multiply + Sum + Sqrt
        assert!(result.nodes_of_type::<DotProductNode>().is_empty());
        assert_eq!(result.nodes_of_type::<SumNode>().len(), 1);

        let old_output = model.node(norm).unwrap().output(0).unwrap();
        let new_output = transformer.corresponding_port(old_output).unwrap();
        let owner = result.owner_of(&new_output.ranges()[0].address).unwrap();
        assert_eq!(owner.kind(), "UnaryOperation");
    }
}
