//! Dataflow Graph
//!
//! This module implements the graph engine: the node arena, construction,
//! feeds, ordering and forward evaluation.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are inputs (externally fed values) or computations over the
//!   values of their producers
//! - Edges run from producer to consumer
//!
//! One evaluation cycle is:
//!
//! 1. Build a [`Feed`] mapping Input nodes to values
//! 2. [`Graph::topological_sort`] orders the reachable nodes and stamps
//!    the inputs
//! 3. [`Graph::forward_pass`] computes each node in order and returns the
//!    output's value
//!
//! The order can be kept and reused: overwrite inputs with
//! [`Graph::set_input`] and run the forward pass again.
//!
//! # Design Decisions
//!
//! 1. Nodes live in an arena indexed by [`NodeId`]; edges are id lists.
//!
//! 2. Producer lists are fixed when a node is added, and consumer lists are
//!    derived once in [`GraphBuilder::build`]. Since a producer must exist
//!    before its consumer, the graph cannot contain a cycle.
//!
//! 3. Node kinds are a closed enum dispatched to a [`Kernel`](crate::ops::Kernel).

mod arena;
mod builder;
mod feed;
mod forward;
mod node;
mod scheduler;

pub use arena::Graph;
pub use builder::GraphBuilder;
pub use feed::Feed;
pub use node::{Arity, EdgeList, Node, NodeId, NodeKind};
