//! Model traversal and comparison
//!
//! Methods for walking dependencies and comparing whole models.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{TransformError, TransformResult};
use crate::traits::Node;

use super::graph::Model;
use super::ports::NodeId;

impl Model {
    // ========================================================================
    // Dependencies
    // ========================================================================

    /// Nodes feeding the given node
    pub fn dependencies(&self, id: NodeId) -> TransformResult<Vec<&dyn Node>> {
        let node = self.node(id).ok_or(TransformError::NodeNotFound(id))?;
        node.dependencies()
            .into_iter()
            .map(|dep| self.node(dep).ok_or(TransformError::NodeNotFound(dep)))
            .collect()
    }

    /// Nodes reading from the given node, in dependency order
    pub fn dependents(&self, id: NodeId) -> TransformResult<Vec<&dyn Node>> {
        if !self.contains(id) {
            return Err(TransformError::NodeNotFound(id));
        }
        Ok(self
            .nodes()
            .filter(|n| n.dependencies().contains(&id))
            .collect())
    }

    /// The given nodes plus everything they transitively depend on,
    /// in dependency order
    pub fn ancestors(&self, outputs: &[NodeId]) -> TransformResult<Vec<NodeId>> {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<NodeId> = Vec::with_capacity(outputs.len());

        for &id in outputs {
            if !self.contains(id) {
                return Err(TransformError::NodeNotFound(id));
            }
            stack.push(id);
        }

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = self.node(id).ok_or(TransformError::NodeNotFound(id))?;
            stack.extend(node.dependencies().into_iter().filter(|d| !visited.contains(d)));
        }

        Ok(self.node_ids().filter(|id| visited.contains(id)).collect())
    }

    /// Nodes nothing else reads from
    pub fn sinks(&self) -> Vec<&dyn Node> {
        let mut used: FxHashSet<NodeId> = FxHashSet::default();
        for node in self.nodes() {
            used.extend(node.dependencies());
        }
        self.nodes().filter(|n| !used.contains(&n.id())).collect()
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Check if two models have the same structure
    ///
    /// Node identities are ignored: nodes are matched by position, and each
    /// input range is compared by the position of the node it reads from.
    /// Kinds, attributes, port types, and sizes must all agree.
    pub fn structurally_equals(&self, other: &Model) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let positions = |model: &Model| -> FxHashMap<NodeId, usize> {
            model.node_ids().enumerate().map(|(i, id)| (id, i)).collect()
        };
        let ours = positions(self);
        let theirs = positions(other);

        self.nodes().zip(other.nodes()).all(|(a, b)| {
            if a.kind() != b.kind() || a.attributes() != b.attributes() {
                return false;
            }

            let outputs_match = a.outputs().len() == b.outputs().len()
                && a.outputs()
                    .iter()
                    .zip(b.outputs())
                    .all(|(x, y)| x.port_type == y.port_type && x.size == y.size);
            if !outputs_match || a.inputs().len() != b.inputs().len() {
                return false;
            }

            a.inputs().iter().zip(b.inputs()).all(|(x, y)| {
                let (x, y) = (&x.elements, &y.elements);
                x.port_type() == y.port_type()
                    && x.ranges().len() == y.ranges().len()
                    && x.ranges().iter().zip(y.ranges()).all(|(p, q)| {
                        p.start == q.start
                            && p.len == q.len
                            && p.address.port == q.address.port
                            && ours.get(&p.address.node) == theirs.get(&q.address.node)
                    })
            })
        })
    }

    // ========================================================================
    // Debugging
    // ========================================================================

    /// Pretty-print the model for debugging
    pub fn dump(&self) -> String {
        let mut out = format!("=== Model ({} nodes) ===\n", self.len());

        for node in self.nodes() {
            let inputs: Vec<String> = node
                .inputs()
                .iter()
                .map(|i| format!("{}={}", i.name, i.elements))
                .collect();
            let outputs: Vec<String> = node
                .outputs()
                .iter()
                .map(|o| format!("{}:{}[{}]", o.name, o.port_type, o.size))
                .collect();
            let attributes = node.attributes();

            out.push_str(&format!(
                "  {} {}{}: ({}) -> ({})\n",
                node.id(),
                node.kind(),
                if attributes.is_empty() {
                    String::new()
                } else {
                    format!("<{attributes}>")
                },
                inputs.join(", "),
                outputs.join(", "),
            ));
        }

        out
    }
}
