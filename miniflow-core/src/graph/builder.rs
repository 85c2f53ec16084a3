//! Graph Construction
//!
//! Graphs are built in two phases:
//!
//! 1. Nodes are added to a [`GraphBuilder`] with their producer lists. A
//!    producer must already exist in the builder, so every edge points from
//!    a lower id to a higher one and no cycle can be expressed.
//! 2. [`GraphBuilder::build`] derives every consumer list from the producer
//!    lists in one pass and freezes the topology.
//!
//! Nothing in between ever sees a half-linked consumer list.

use smallvec::SmallVec;
use tracing::debug;

use super::arena::Graph;
use super::node::{Node, NodeId, NodeKind};
use crate::error::{GraphError, Result};

/// Accumulates nodes before the graph is frozen.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node of any kind.
    ///
    /// `inbound` is copied verbatim; its order is the operand order the
    /// kind's kernel reads.
    pub fn add_node(&mut self, kind: NodeKind, inbound: &[NodeId]) -> Result<NodeId> {
        let id = NodeId::from_index(self.nodes.len());

        let arity = kind.arity();
        if !arity.accepts(inbound.len()) {
            return Err(GraphError::Arity {
                node: id,
                op: kind.name(),
                expected: arity,
                actual: inbound.len(),
            });
        }
        if let Some(&unknown) = inbound.iter().find(|p| p.index() >= self.nodes.len()) {
            return Err(GraphError::UnknownNode { node: unknown });
        }

        self.nodes
            .push(Node::new(id, kind, None, SmallVec::from_slice(inbound)));
        Ok(id)
    }

    /// Add an Input node.
    pub fn input(&mut self) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes
            .push(Node::new(id, NodeKind::Input, None, SmallVec::new()));
        id
    }

    /// Add an Input node with a label usable in JSON feeds.
    pub fn input_labeled(&mut self, label: impl Into<String>) -> NodeId {
        let id = self.input();
        self.nodes[id.index()].set_label(label.into());
        id
    }

    pub fn sum(&mut self, inbound: &[NodeId]) -> Result<NodeId> {
        self.add_node(NodeKind::Sum, inbound)
    }

    pub fn linear(&mut self, features: NodeId, weights: NodeId, bias: NodeId) -> Result<NodeId> {
        self.add_node(NodeKind::Linear, &[features, weights, bias])
    }

    pub fn sigmoid(&mut self, x: NodeId) -> Result<NodeId> {
        self.add_node(NodeKind::Sigmoid, &[x])
    }

    pub fn mse(&mut self, target: NodeId, prediction: NodeId) -> Result<NodeId> {
        self.add_node(NodeKind::Mse, &[target, prediction])
    }

    /// Label an existing node.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(GraphError::UnknownNode { node: id })?;
        node.set_label(label.into());
        Ok(())
    }

    /// Materialize consumer lists and freeze the graph.
    pub fn build(mut self) -> Graph {
        let mut edges = 0;
        for consumer in 0..self.nodes.len() {
            let id = self.nodes[consumer].id();
            let producers = self.nodes[consumer].inbound().to_vec();
            for producer in producers {
                self.nodes[producer.index()].add_outbound(id);
                edges += 1;
            }
        }
        debug!(nodes = self.nodes.len(), edges, "built graph");
        Graph::from_nodes(self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Arity;

    #[test]
    fn inbound_order_is_preserved() {
        let mut builder = GraphBuilder::new();
        let x = builder.input();
        let w = builder.input();
        let b = builder.input();
        let l = builder.linear(x, w, b).unwrap();
        let graph = builder.build();

        assert_eq!(graph.node(l).unwrap().inbound(), &[x, w, b]);
    }

    #[test]
    fn outbound_is_transpose_of_inbound() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let b = builder.input();
        let s1 = builder.sum(&[a, b]).unwrap();
        let s2 = builder.sum(&[a, s1]).unwrap();
        let graph = builder.build();

        assert_eq!(graph.node(a).unwrap().outbound(), &[s1, s2]);
        assert_eq!(graph.node(b).unwrap().outbound(), &[s1]);
        assert_eq!(graph.node(s1).unwrap().outbound(), &[s2]);
        assert!(graph.node(s2).unwrap().outbound().is_empty());

        for node in graph.nodes() {
            for &consumer in node.outbound() {
                assert!(graph.node(consumer).unwrap().inbound().contains(&node.id()));
            }
            for &producer in node.inbound() {
                assert!(graph.node(producer).unwrap().outbound().contains(&node.id()));
            }
        }
    }

    #[test]
    fn repeated_producer_links_once() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let s = builder.sum(&[a, a]).unwrap();
        let graph = builder.build();

        assert_eq!(graph.node(s).unwrap().inbound(), &[a, a]);
        assert_eq!(graph.node(a).unwrap().outbound(), &[s]);
    }

    #[test]
    fn arity_is_checked() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();

        let err = builder.add_node(NodeKind::Linear, &[a, a]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Arity { op: "linear", expected: Arity::Exactly(3), actual: 2, .. }
        ));
        assert!(builder.sum(&[]).is_err());
        assert!(builder.add_node(NodeKind::Input, &[a]).is_err());
    }

    #[test]
    fn forward_references_are_rejected() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let ahead = NodeId::from_index(5);

        let err = builder.sum(&[a, ahead]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { node } if node == ahead));
        assert_eq!(builder.build().len(), 1);
    }
}
