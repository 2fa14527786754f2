//! Transform context
//!
//! Carries the policy of the process driving a transformation (usually a
//! compiler): which nodes are final targets and which should be refined.

use std::fmt;
use std::sync::Arc;

use crate::model::{Model, NodeId};
use crate::traits::Node;

/// Action to take on a node during refinement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeAction {
    /// Let the node decide
    #[default]
    Default,
    /// Ask the node to refine itself
    Refine,
    /// The node is a compilation target: copy it as-is
    Compile,
}

/// Decision function mapping a node to the action to take on it
pub type NodeActionFunction = Arc<dyn Fn(&dyn Node) -> NodeAction + Send + Sync>;

/// Policy for a transformation pass
///
/// Holds an optional decision function and nothing else. Without one,
/// every node gets [`NodeAction::Default`].
#[derive(Clone, Default)]
pub struct TransformContext {
    node_action_function: Option<NodeActionFunction>,
}

impl TransformContext {
    /// Create a context with no decision function
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with the given decision function
    pub fn with_action_function<F>(f: F) -> Self
    where
        F: Fn(&dyn Node) -> NodeAction + Send + Sync + 'static,
    {
        Self {
            node_action_function: Some(Arc::new(f)),
        }
    }

    /// Create a context that marks the listed node kinds as compilable
    /// and leaves every other node to its default action
    pub fn compiling_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let kinds: Vec<String> = kinds.into_iter().map(Into::into).collect();
        Self::with_action_function(move |node| {
            if kinds.iter().any(|k| k == node.kind()) {
                NodeAction::Compile
            } else {
                NodeAction::Default
            }
        })
    }

    /// Replace the decision function
    pub fn set_node_action_function<F>(&mut self, f: F)
    where
        F: Fn(&dyn Node) -> NodeAction + Send + Sync + 'static,
    {
        self.node_action_function = Some(Arc::new(f));
    }

    /// Check if a decision function is installed
    pub fn has_node_action_function(&self) -> bool {
        self.node_action_function.is_some()
    }

    /// Action to take on `node`
    pub fn node_action(&self, node: &dyn Node) -> NodeAction {
        self.node_action_function
            .as_ref()
            .map(|f| f(node))
            .unwrap_or_default()
    }

    /// Check if `node` is a compilation target
    pub fn is_node_compilable(&self, node: &dyn Node) -> bool {
        self.node_action(node) == NodeAction::Compile
    }

    /// Check if every node of `model` is a compilation target
    pub fn is_model_compilable(&self, model: &Model) -> bool {
        model.nodes().all(|n| self.is_node_compilable(n))
    }

    /// Nodes of `model` that are not compilation targets
    pub fn uncompilable_nodes(&self, model: &Model) -> Vec<NodeId> {
        model
            .nodes()
            .filter(|n| !self.is_node_compilable(*n))
            .map(|n| n.id())
            .collect()
    }
}

impl fmt::Debug for TransformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformContext")
            .field("has_node_action_function", &self.has_node_action_function())
            .finish()
    }
}
