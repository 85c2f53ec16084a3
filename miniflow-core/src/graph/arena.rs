//! Graph Arena
//!
//! [`Graph`] owns every node in a single `Vec`, indexed by [`NodeId`].
//! Edges are id lists, so there are no references between nodes and no
//! ownership cycles. The topology is frozen once the graph is built; only
//! node values change afterwards.

use super::node::{Node, NodeId};
use crate::error::{GraphError, Result};
use crate::tensor::Tensor;

/// A built, immutable-topology dataflow graph.
///
/// Create one with [`GraphBuilder`](super::GraphBuilder).
#[derive(Debug, Clone)]
pub struct Graph {
    /// All nodes, indexed by id.
    pub(super) nodes: Vec<Node>,
}

impl Graph {
    pub(super) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Get the total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or(GraphError::UnknownNode { node: id })
    }

    pub(super) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(GraphError::UnknownNode { node: id })
    }

    /// Get a node's cached value.
    pub fn value(&self, id: NodeId) -> Option<&Tensor> {
        self.nodes.get(id.index()).and_then(Node::value)
    }

    /// Find the first node with the given label.
    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.label() == Some(label))
            .map(Node::id)
    }

    /// All Input nodes, in id order.
    pub fn inputs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|node| node.kind().is_input())
            .map(Node::id)
    }

    /// All nodes without consumers, in id order.
    pub fn outputs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|node| node.outbound().is_empty())
            .map(Node::id)
    }

    /// Look up a node that may be written from outside: it must exist and
    /// be an Input.
    pub(super) fn expect_input(&self, id: NodeId) -> Result<&Node> {
        let node = self.node(id)?;
        if node.kind().is_input() {
            Ok(node)
        } else {
            Err(GraphError::InvalidFeedKey {
                node: id,
                op: node.kind().name(),
            })
        }
    }

    /// Overwrite an Input's held value, e.g. with the next batch, without
    /// re-sorting.
    pub fn set_input(&mut self, id: NodeId, value: Tensor) -> Result<()> {
        self.compute_input(id, Some(value))
    }

    /// Run an Input's compute step. An explicit value replaces the held
    /// one; `None` leaves the previously stamped value in place.
    pub fn compute_input(&mut self, id: NodeId, value: Option<Tensor>) -> Result<()> {
        self.expect_input(id)?;
        if let Some(value) = value {
            self.node_mut(id)?.set_value(value);
        }
        Ok(())
    }
}
