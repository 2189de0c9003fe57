//! In-memory graph IR for opset conversion
//!
//! This module provides the graph the converter and its adapters operate on:
//!
//! - [`Graph`]: ordered nodes, initializers, graph interface and opset imports
//! - [`Node`]: one operator invocation, identified by a stable [`NodeId`]
//! - [`maps`]: type definitions for the arena and side tables
//!
//! # Overview
//!
//! Nodes live in an insertion-ordered arena keyed by [`NodeId`]. Ids are
//! handed out from a counter and never reused, so a side table keyed by
//! `NodeId` can never alias a node that an adapter inserted after another
//! one was removed.
//!
//! # Example
//!
//! ```ignore
//! use onnx_version_converter::graph::Graph;
//!
//! let mut graph = Graph::import(&model)?;
//! for id in graph.node_ids() {
//!     let node = graph.node(id).unwrap();
//!     println!("{} {}", id, node.op_type());
//! }
//! let model = graph.export(&model);
//! ```

pub mod import;
pub mod ir;
pub mod maps;
pub mod mutators;
pub mod node;

// Re-export main types
pub use ir::Graph;
pub use maps::{ConsumerList, InitializerMap, NodeArena, NodeId};
pub use node::Node;
