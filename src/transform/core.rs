//! Core transformation loop
//!
//! Implements the passes that walk a source model in dependency order and
//! rebuild it, node by node, into a fresh destination model.

use std::mem;

use tracing::{debug, trace, warn};

use crate::error::{TransformError, TransformResult};
use crate::model::{validate_model, Model, NodeId, PortElement};
use crate::traits::Node;

use super::context::{NodeAction, TransformContext};
use super::maps::{compose_maps, ElementMap};

/// Default bound on refinement passes
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Transform configuration
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Refinement pass limit used by [`ModelTransformer::refine`]
    pub max_iterations: usize,
    /// Whether to validate the model produced by every pass
    pub validate_passes: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            validate_passes: false,
        }
    }
}

/// Statistics from the last top-level call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformStats {
    /// Number of passes performed
    pub passes: usize,
    /// Number of source nodes visited
    pub nodes_visited: usize,
    /// Number of nodes that replaced themselves during refinement
    pub nodes_refined: usize,
    /// Number of nodes added to destination models
    pub nodes_added: usize,
}

/// Whether every visited node must map all of its outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    /// Copy and refinement: each output must have a counterpart
    Total,
    /// Custom transforms may drop nodes, e.g. when fusing
    Partial,
}

/// Copies, refines, and transforms models
///
/// Every top-level call (`copy_model*`, `refine_model`, `transform_model`)
/// starts from a clean state and builds a fresh model. While a pass runs, the
/// transformer is handed to each visited node, which rebuilds itself through
/// [`transform_port_elements`](Self::transform_port_elements),
/// [`add_node`](Self::add_node) and [`map_node_output`](Self::map_node_output).
///
/// After the call returns, the correspondence queries map elements of the
/// input model to elements of the returned model.
///
/// A failed call leaves no partial result behind: the destination model and
/// the correspondence table are cleared.
#[derive(Debug, Default)]
pub struct ModelTransformer {
    pub(super) model: Model,
    pub(super) context: TransformContext,
    pub(super) element_map: ElementMap,
    pub(super) in_pass: bool,
    pub(super) stats: TransformStats,
    is_model_compilable: bool,
    config: TransformConfig,
}

impl ModelTransformer {
    /// Create a new transformer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the transformer
    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Get statistics of the last top-level call
    pub fn stats(&self) -> &TransformStats {
        &self.stats
    }

    /// Whether the model returned by the last top-level call is compilable
    ///
    /// With a decision function, every node must be marked
    /// [`NodeAction::Compile`]. Without one, the model counts as compilable
    /// once a pass leaves it unchanged.
    pub fn is_model_compilable(&self) -> bool {
        self.is_model_compilable
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Copy every node of `model`
    pub fn copy_model(
        &mut self,
        model: &Model,
        context: &TransformContext,
    ) -> TransformResult<Model> {
        self.begin(context);
        debug!(nodes = model.len(), "copying model");

        let result = self.run_pass(model.nodes(), Coverage::Total, |node, t| node.copy(t))?;
        self.is_model_compilable = self.assess(model, &result);
        Ok(result)
    }

    /// Copy the nodes needed to compute `output`
    pub fn copy_model_for_output(
        &mut self,
        model: &Model,
        output: NodeId,
        context: &TransformContext,
    ) -> TransformResult<Model> {
        self.copy_model_for_outputs(model, &[output], context)
    }

    /// Copy the nodes needed to compute all of `outputs`
    ///
    /// Nodes that none of the outputs depend on are skipped, and have no
    /// correspondence afterwards.
    pub fn copy_model_for_outputs(
        &mut self,
        model: &Model,
        outputs: &[NodeId],
        context: &TransformContext,
    ) -> TransformResult<Model> {
        self.begin(context);

        let ids = model.ancestors(outputs).inspect_err(|_| self.reset())?;
        debug!(
            nodes = model.len(),
            selected = ids.len(),
            outputs = outputs.len(),
            "copying model subset"
        );

        let nodes = ids.iter().filter_map(|id| model.node(*id));
        let result = self.run_pass(nodes, Coverage::Total, |node, t| node.copy(t))?;
        self.is_model_compilable = self.assess_subset(&result);
        Ok(result)
    }

    /// Refine `model` for at most `max_iterations` passes
    ///
    /// Each pass asks every node to refine itself, except nodes the context
    /// marks [`NodeAction::Compile`], which are copied. Stops early once the
    /// result is compilable or a pass leaves the model unchanged. With
    /// `max_iterations == 0` this is a plain copy.
    pub fn refine_model(
        &mut self,
        model: &Model,
        context: &TransformContext,
        max_iterations: usize,
    ) -> TransformResult<Model> {
        if max_iterations == 0 {
            return self.copy_model(model, context);
        }

        self.begin(context);
        debug!(nodes = model.len(), max_iterations, "refining model");

        self.refine_iterations(model, max_iterations)
            .inspect_err(|_| self.reset())
    }

    /// Refine `model` using the configured pass limit
    pub fn refine(&mut self, model: &Model, context: &TransformContext) -> TransformResult<Model> {
        self.refine_model(model, context, self.config.max_iterations)
    }

    /// Apply `transform` to every node of `model`
    ///
    /// `transform` takes the place of `copy`: it builds the node's
    /// replacement through the transformer and maps the outputs that have
    /// one. Outputs left unmapped (a producer folded into its consumer, say)
    /// have no correspondence afterwards, and a later node that reads them
    /// fails with [`TransformError::UnmappedElement`].
    pub fn transform_model<F>(
        &mut self,
        model: &Model,
        mut transform: F,
        context: &TransformContext,
    ) -> TransformResult<Model>
    where
        F: FnMut(&dyn Node, &mut ModelTransformer) -> TransformResult<()>,
    {
        self.begin(context);
        debug!(nodes = model.len(), "transforming model");

        let result = self.run_pass(model.nodes(), Coverage::Partial, |node, t| transform(node, t))?;
        self.is_model_compilable = self.assess(model, &result);
        Ok(result)
    }

    // ========================================================================
    // Pass machinery
    // ========================================================================

    fn begin(&mut self, context: &TransformContext) {
        self.reset();
        self.context = context.clone();
        self.stats = TransformStats::default();
    }

    fn reset(&mut self) {
        self.model = Model::new();
        self.element_map.clear();
        self.in_pass = false;
        self.is_model_compilable = false;
    }

    /// Build a fresh model by visiting `nodes` in order
    fn run_pass<'m, I, F>(
        &mut self,
        nodes: I,
        coverage: Coverage,
        mut visit: F,
    ) -> TransformResult<Model>
    where
        I: IntoIterator<Item = &'m dyn Node>,
        F: FnMut(&dyn Node, &mut Self) -> TransformResult<()>,
    {
        self.model = Model::new();
        self.element_map.clear();
        self.in_pass = true;

        let visited = self.visit_all(nodes, coverage, &mut visit);
        self.in_pass = false;

        let result = visited.and_then(|()| {
            let model = mem::take(&mut self.model);
            if self.config.validate_passes {
                validate_model(&model).into_result()?;
            }
            Ok(model)
        });

        match result {
            Ok(model) => {
                self.stats.passes += 1;
                Ok(model)
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    fn visit_all<'m, I, F>(
        &mut self,
        nodes: I,
        coverage: Coverage,
        visit: &mut F,
    ) -> TransformResult<()>
    where
        I: IntoIterator<Item = &'m dyn Node>,
        F: FnMut(&dyn Node, &mut Self) -> TransformResult<()>,
    {
        for node in nodes {
            trace!(node = %node.id(), kind = node.kind(), "visiting node");
            visit(node, self)?;
            self.stats.nodes_visited += 1;
            if coverage == Coverage::Total {
                self.check_outputs_mapped(node)?;
            }
        }
        Ok(())
    }

    /// Every element of every output of `node` must have a counterpart
    fn check_outputs_mapped(&self, node: &dyn Node) -> TransformResult<()> {
        for port in node.outputs() {
            let complete = (0..port.size)
                .all(|i| self.element_map.contains_key(&PortElement::new(port.address, i)));
            if !complete {
                return Err(TransformError::UnmappedOutput {
                    node: node.id(),
                    kind: node.kind(),
                    port: port.index(),
                });
            }
        }
        Ok(())
    }

    fn refine_node(node: &dyn Node, transformer: &mut Self) -> TransformResult<()> {
        let action = transformer.context.node_action(node);
        trace!(node = %node.id(), kind = node.kind(), ?action, "refining node");

        match action {
            NodeAction::Compile => node.copy(transformer),
            NodeAction::Default | NodeAction::Refine => {
                if node.refine(transformer)? {
                    transformer.stats.nodes_refined += 1;
                }
                Ok(())
            }
        }
    }

    fn refine_iterations(&mut self, model: &Model, max_iterations: usize) -> TransformResult<Model> {
        let mut current: Option<Model> = None;
        let mut correspondence: Option<ElementMap> = None;
        let mut compilable = false;

        for iteration in 0..max_iterations {
            let source = current.as_ref().unwrap_or(model);
            let refined = self.run_pass(source.nodes(), Coverage::Total, Self::refine_node)?;

            let progressed = !refined.structurally_equals(source);
            compilable = self.assess(source, &refined);

            let pass_map = mem::take(&mut self.element_map);
            correspondence = Some(match correspondence {
                Some(previous) => compose_maps(&previous, &pass_map),
                None => pass_map,
            });

            debug!(
                iteration,
                nodes = refined.len(),
                progressed,
                compilable,
                "refinement pass complete"
            );
            current = Some(refined);

            if compilable || !progressed {
                break;
            }
            if iteration + 1 == max_iterations {
                warn!(
                    max_iterations,
                    "refinement stopped at the iteration limit before the model became compilable"
                );
            }
        }

        self.element_map = correspondence.unwrap_or_default();
        self.is_model_compilable = compilable;
        current.ok_or_else(|| TransformError::Internal("refinement performed no passes".into()))
    }

    /// Compilability of `result`, produced from `source` by one pass
    fn assess(&self, source: &Model, result: &Model) -> bool {
        if self.context.has_node_action_function() {
            self.context.is_model_compilable(result)
        } else {
            result.structurally_equals(source)
        }
    }

    /// Compilability of a subset copy, which never changes structure
    fn assess_subset(&self, result: &Model) -> bool {
        !self.context.has_node_action_function() || self.context.is_model_compilable(result)
    }
}
