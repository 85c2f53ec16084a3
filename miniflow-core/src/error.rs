//! Error Types
//!
//! Every failure the engine can report is a variant of [`GraphError`].
//! Nothing is recovered inside the engine: an error aborts the current
//! sort or forward pass and is handed back to the caller with the node and
//! operation that produced it.

use thiserror::Error;

use crate::graph::{Arity, NodeId};

/// Crate-wide result alias.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

/// Errors raised by the graph engine.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A kernel without a concrete `compute` was executed.
    #[error("node {node}: operation `{op}` has no compute implementation")]
    Unimplemented { node: NodeId, op: &'static str },

    /// A feed key (or direct assignment target) is not an Input node.
    #[error("node {node} is a `{op}` node and cannot be fed a value")]
    InvalidFeedKey { node: NodeId, op: &'static str },

    /// The designated output is absent from the evaluation order.
    #[error("output node {node} is not reachable from the feed")]
    UnreachableOutput { node: NodeId },

    /// Producer values cannot be combined by this node's operation.
    #[error("node {node}: `{op}` failed: {source}")]
    Shape {
        node: NodeId,
        op: &'static str,
        #[source]
        source: TensorError,
    },

    /// Wrong number of producers for a node kind.
    #[error("node {node}: `{op}` expects {expected} inbound nodes, got {actual}")]
    Arity {
        node: NodeId,
        op: &'static str,
        expected: Arity,
        actual: usize,
    },

    /// An id that does not belong to this graph.
    #[error("unknown node {node}")]
    UnknownNode { node: NodeId },

    /// A feed label that matches no node.
    #[error("no node labelled `{label}`")]
    UnknownLabel { label: String },

    /// A producer was read before it held any value.
    #[error("node {consumer} reads node {node}, which has no value yet")]
    MissingValue { node: NodeId, consumer: NodeId },

    /// Kahn's algorithm left nodes unemitted. Only reachable if the graph
    /// contains a cycle, which the builder cannot produce.
    #[error("topological sort stalled with {} nodes unemitted: {stuck:?}", .stuck.len())]
    InternalInconsistency { stuck: Vec<NodeId> },

    #[error("invalid feed json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from tensor construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TensorError {
    #[error("shape {shape:?} holds {expected} elements, got {actual}")]
    ElementCount {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("rank {0} is not supported (at most 2)")]
    Rank(usize),

    #[error("row {row} has {actual} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("incompatible shapes {left:?} and {right:?} for {op}")]
    Incompatible {
        op: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error("shape {shape:?} holds more elements than fit in memory")]
    Overflow { shape: Vec<usize> },

    #[error("cannot reduce an empty tensor")]
    Empty,
}
