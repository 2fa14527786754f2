//! Ready-made model passes for [`TransformPipeline`](crate::traits::TransformPipeline)

use crate::error::TransformResult;
use crate::model::Model;
use crate::traits::{ModelPass, Node};

use super::context::TransformContext;
use super::core::{ModelTransformer, DEFAULT_MAX_ITERATIONS};

/// Copy every node
#[derive(Debug, Clone, Default)]
pub struct CopyPass {
    context: TransformContext,
}

impl CopyPass {
    /// Create a copy pass
    pub fn new(context: TransformContext) -> Self {
        Self { context }
    }
}

impl ModelPass for CopyPass {
    fn name(&self) -> &str {
        "copy"
    }

    fn run(&self, model: &Model, transformer: &mut ModelTransformer) -> TransformResult<Model> {
        transformer.copy_model(model, &self.context)
    }
}

/// Refine until compilable, unchanged, or out of iterations
#[derive(Debug, Clone)]
pub struct RefinePass {
    context: TransformContext,
    max_iterations: usize,
}

impl RefinePass {
    /// Create a refine pass
    pub fn new(context: TransformContext, max_iterations: usize) -> Self {
        Self {
            context,
            max_iterations,
        }
    }
}

impl Default for RefinePass {
    fn default() -> Self {
        Self::new(TransformContext::new(), DEFAULT_MAX_ITERATIONS)
    }
}

impl ModelPass for RefinePass {
    fn name(&self) -> &str {
        "refine"
    }

    fn run(&self, model: &Model, transformer: &mut ModelTransformer) -> TransformResult<Model> {
        transformer.refine_model(model, &self.context, self.max_iterations)
    }
}

/// Apply a per-node function, as in
/// [`ModelTransformer::transform_model`]
pub struct FnPass<F> {
    name: String,
    context: TransformContext,
    transform: F,
}

impl<F> FnPass<F>
where
    F: Fn(&dyn Node, &mut ModelTransformer) -> TransformResult<()>,
{
    /// Create a named pass from a per-node function
    pub fn new(name: impl Into<String>, context: TransformContext, transform: F) -> Self {
        Self {
            name: name.into(),
            context,
            transform,
        }
    }
}

impl<F> ModelPass for FnPass<F>
where
    F: Fn(&dyn Node, &mut ModelTransformer) -> TransformResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, model: &Model, transformer: &mut ModelTransformer) -> TransformResult<Model> {
        transformer.transform_model(model, |node, t| (self.transform)(node, t), &self.context)
    }
}
