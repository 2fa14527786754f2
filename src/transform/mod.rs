//! Model transformation module
//!
//! This module provides the transformation engine:
//!
//! - [`ModelTransformer`]: copy, refinement, and generic transformation passes
//! - [`TransformContext`]: the per-node action policy of a pass
//! - [`maps`]: the old→new element correspondence table
//! - [`passes`]: ready-made passes for pipelines
//!
//! # Overview
//!
//! A pass never edits a model in place. It walks the source model in
//! dependency order and hands the transformer to each node, which rebuilds
//! itself in a fresh destination model:
//!
//! 1. translate its inputs with `transform_port_elements`
//! 2. build its copy or replacement with `add_node`
//! 3. register where its outputs went with `map_node_output`
//!
//! Refinement repeats such passes until every node is compilable according
//! to the context, a pass changes nothing, or the iteration limit is hit.
//!
//! # Example
//!
//! ```ignore
//! use model_transformer::transform::{ModelTransformer, TransformContext};
//!
//! let context = TransformContext::compiling_kinds(["Input", "BinaryOperation", "Sum"]);
//! let mut transformer = ModelTransformer::new();
//! let refined = transformer.refine_model(&model, &context, 10)?;
//!
//! if !transformer.is_model_compilable() {
//!     for id in context.uncompilable_nodes(&refined) {
//!         eprintln!("cannot compile {id}");
//!     }
//! }
//!
//! let new_output = transformer.corresponding_port(old_node.output(0)?)?;
//! ```

pub mod context;
pub mod core;
pub mod maps;
pub mod mapping;
pub mod passes;

// Re-export main types and functions
pub use context::{NodeAction, NodeActionFunction, TransformContext};

pub use self::core::{ModelTransformer, TransformConfig, TransformStats, DEFAULT_MAX_ITERATIONS};

pub use maps::{compose_maps, ElementMap};

pub use passes::{CopyPass, FnPass, RefinePass};
