//! Graph Nodes
//!
//! This module defines the node types that live in the graph arena.

use std::fmt;

use smallvec::SmallVec;

use crate::ops::{Kernel, LinearKernel, MseKernel, SigmoidKernel, SumKernel};
use crate::tensor::Tensor;

/// Inline storage for a node's edge list. Most nodes have at most three
/// producers.
pub type EdgeList = SmallVec<[NodeId; 4]>;

/// Identifier of a node: its index in the owning graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How many inbound nodes a kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// The kind of node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A source node. Holds an externally supplied value and has no
    /// producers.
    Input,

    /// Elementwise sum of all inbound values.
    Sum,

    /// `inbound[0] · inbound[1] + inbound[2]`: features, weights, bias.
    Linear,

    /// Logistic sigmoid of `inbound[0]`.
    Sigmoid,

    /// Mean squared error between `inbound[0]` (target) and `inbound[1]`
    /// (prediction).
    Mse,
}

static SUM: SumKernel = SumKernel;
static LINEAR: LinearKernel = LinearKernel;
static SIGMOID: SigmoidKernel = SigmoidKernel;
static MSE: MseKernel = MseKernel;

impl NodeKind {
    /// Operation name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Input => "input",
            NodeKind::Sum => SUM.name(),
            NodeKind::Linear => LINEAR.name(),
            NodeKind::Sigmoid => SIGMOID.name(),
            NodeKind::Mse => MSE.name(),
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            NodeKind::Input => Arity::Exactly(0),
            NodeKind::Sum => Arity::AtLeast(1),
            NodeKind::Linear => Arity::Exactly(3),
            NodeKind::Sigmoid => Arity::Exactly(1),
            NodeKind::Mse => Arity::Exactly(2),
        }
    }

    /// The kernel that derives this kind's value. Inputs have none: their
    /// value is only ever written from outside.
    pub fn kernel(&self) -> Option<&'static dyn Kernel> {
        match self {
            NodeKind::Input => None,
            NodeKind::Sum => Some(&SUM),
            NodeKind::Linear => Some(&LINEAR),
            NodeKind::Sigmoid => Some(&SIGMOID),
            NodeKind::Mse => Some(&MSE),
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, NodeKind::Input)
    }
}

/// A node in the graph arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for this node.
    id: NodeId,

    /// What kind of node this is.
    kind: NodeKind,

    /// Optional name, used for diagnostics and labelled feeds.
    label: Option<String>,

    /// Producers, in the order the operation reads them. Fixed at
    /// construction.
    inbound: EdgeList,

    /// Distinct consumers in ascending id order. Derived from every other
    /// node's `inbound` when the graph is built.
    outbound: EdgeList,

    /// Most recently computed (or fed) value.
    value: Option<Tensor>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, label: Option<String>, inbound: EdgeList) -> Self {
        Self {
            id,
            kind,
            label,
            inbound,
            outbound: EdgeList::new(),
            value: None,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = Some(label);
    }

    /// Get all producers, in operand order.
    pub fn inbound(&self) -> &[NodeId] {
        &self.inbound
    }

    /// Get all consumers.
    pub fn outbound(&self) -> &[NodeId] {
        &self.outbound
    }

    /// Record a consumer. Called in ascending consumer order while the
    /// graph is built, so a repeated edge only shows up as a repeat of the
    /// last entry.
    pub(crate) fn add_outbound(&mut self, consumer: NodeId) {
        if self.outbound.last() != Some(&consumer) {
            self.outbound.push(consumer);
        }
    }

    /// Get the cached value, if any pass has produced one yet.
    pub fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    pub(crate) fn set_value(&mut self, value: Tensor) {
        self.value = Some(value);
    }
}
