//! Model validation
//!
//! Check models for structural consistency.

use rustc_hash::FxHashSet;

use crate::error::{TransformError, TransformResult};

use super::graph::Model;
use super::ports::NodeId;

/// Validation result with detailed issues
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the model is valid
    pub is_valid: bool,
    /// List of errors (critical issues)
    pub errors: Vec<String>,
    /// List of warnings (non-critical issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.is_valid = false;
    }

    /// Add a warning
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Convert into a `TransformResult`, failing on any error
    pub fn into_result(self) -> TransformResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(TransformError::ValidationFailed(self.errors.join("; ")))
        }
    }
}

/// Validate a model
///
/// Checks:
/// - every input reads from a node placed earlier (dependency order)
/// - every referenced port exists, with matching type and in-bounds ranges
/// - every node has at least one output port
///
/// Nodes whose outputs are never read are reported as warnings.
pub fn validate_model(model: &Model) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut used: FxHashSet<NodeId> = FxHashSet::default();

    for node in model.nodes() {
        if node.outputs().is_empty() {
            result.add_error(format!("{} ({}) has no output ports", node.id(), node.kind()));
        }

        for input in node.inputs() {
            for address in input.elements.addresses() {
                used.insert(address.node);
                if !seen.contains(&address.node) {
                    result.add_error(format!(
                        "{} input '{}' reads {} before it is defined",
                        node.id(),
                        input.name,
                        address
                    ));
                }
            }
            if let Err(e) = model.check_elements(&input.elements) {
                result.add_error(format!("{} input '{}': {e}", node.id(), input.name));
            }
        }

        seen.insert(node.id());
    }

    for node in model.nodes() {
        if !used.contains(&node.id()) && !node.inputs().is_empty() && node.kind() != "Output" {
            result.add_warning(format!("{} ({}) output is never used", node.id(), node.kind()));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PortType;
    use crate::nodes::{InputNode, OutputNode, UnaryOperation, UnaryOperationNode};

    #[test]
    fn test_valid_model() {
        let mut model = Model::new();
        let input = model.add(InputNode::new(PortType::Real, 4)).unwrap();
        let exp = model
            .add(UnaryOperationNode::new(input.output(0).unwrap().clone(), UnaryOperation::Exp))
            .unwrap();
        model.add(OutputNode::new(exp.output(0).unwrap().clone())).unwrap();

        let result = validate_model(&model);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_unused_node_warning() {
        let mut model = Model::new();
        let input = model.add(InputNode::new(PortType::Real, 4)).unwrap();
        model
            .add(UnaryOperationNode::new(input.output(0).unwrap().clone(), UnaryOperation::Exp))
            .unwrap();

        let result = validate_model(&model);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("UnaryOperation"));
    }

    #[test]
    fn test_into_result_reports_errors() {
        let mut result = ValidationResult::valid();
        result.add_error("first");
        result.add_error("second");

        let err = result.into_result().unwrap_err();
        assert_eq!(
            err,
            TransformError::ValidationFailed("first; second".to_string())
        );
    }
}
