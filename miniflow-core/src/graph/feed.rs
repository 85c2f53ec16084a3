//! Feed Mapping
//!
//! A [`Feed`] assigns values to Input nodes for the next evaluation. Keys
//! are kept in insertion order; that order is also the order in which the
//! sorter emits the inputs.

use indexmap::IndexMap;

use super::arena::Graph;
use super::node::NodeId;
use crate::error::{GraphError, Result};
use crate::tensor::Tensor;

/// Input node → value for the upcoming pass.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    values: IndexMap<NodeId, Tensor>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a value, returning the one it replaces. A replaced key keeps
    /// its original position.
    pub fn insert(&mut self, node: NodeId, value: impl Into<Tensor>) -> Option<Tensor> {
        self.values.insert(node, value.into())
    }

    pub fn get(&self, node: NodeId) -> Option<&Tensor> {
        self.values.get(&node)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Tensor> {
        self.values.get_mut(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.values.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fed nodes, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Tensor)> + '_ {
        self.values.iter().map(|(&id, value)| (id, value))
    }
}

impl<V: Into<Tensor>> FromIterator<(NodeId, V)> for Feed {
    fn from_iter<I: IntoIterator<Item = (NodeId, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(id, value)| (id, value.into()))
                .collect(),
        }
    }
}

impl Graph {
    /// Build a feed from a JSON object keyed by Input label.
    ///
    /// ```json
    /// { "x": { "shape": [1, 2], "data": [1.0, 2.0] } }
    /// ```
    pub fn feed_from_json(&self, json: &str) -> Result<Feed> {
        let raw: IndexMap<String, Tensor> = serde_json::from_str(json)?;
        let mut feed = Feed::new();
        for (label, value) in raw {
            let id = self
                .find(&label)
                .ok_or_else(|| GraphError::UnknownLabel { label: label.clone() })?;
            self.expect_input(id)?;
            feed.insert(id, value);
        }
        Ok(feed)
    }
}
