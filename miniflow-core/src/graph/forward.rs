//! Forward Pass
//!
//! The driver walks an evaluation order and computes each node from the
//! values its producers already hold. It does not re-check that the order
//! is complete: a restricted order recomputes only the nodes it lists and
//! leaves every other value as it was.

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Graph;
use super::feed::Feed;
use super::node::NodeId;
use crate::error::{GraphError, Result};
use crate::tensor::Tensor;

impl Graph {
    /// Compute every node in `order`, then return `output`'s value.
    ///
    /// Fails with [`GraphError::UnreachableOutput`] before computing
    /// anything if `output` is not in `order`. Any other failure stops the
    /// pass at the failing node; nodes computed before it keep their new
    /// values.
    pub fn forward_pass(&mut self, output: NodeId, order: &[NodeId]) -> Result<&Tensor> {
        self.node(output)?;
        if !order.contains(&output) {
            return Err(GraphError::UnreachableOutput { node: output });
        }

        debug!(nodes = order.len(), output = %output, "forward pass");
        for &id in order {
            self.compute(id)?;
        }

        let node = self.node(output)?;
        node.value().ok_or(GraphError::MissingValue {
            node: output,
            consumer: output,
        })
    }

    /// Sort with `feed`, then run the forward pass for `output`.
    pub fn evaluate(&mut self, feed: &Feed, output: NodeId) -> Result<&Tensor> {
        let order = self.topological_sort(feed)?;
        self.forward_pass(output, &order)
    }

    /// Compute one node. Inputs are a no-op; their value was stamped by the
    /// sorter or set directly.
    fn compute(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        let kind = node.kind();
        let Some(kernel) = kind.kernel() else {
            return self.compute_input(id, None);
        };

        // Producer borrows end before this node's value is written.
        let value = {
            let inputs = node
                .inbound()
                .iter()
                .map(|&producer| {
                    self.value(producer).ok_or(GraphError::MissingValue {
                        node: producer,
                        consumer: id,
                    })
                })
                .collect::<Result<SmallVec<[&Tensor; 4]>>>()?;
            kernel.compute(id, &inputs)?
        };
        trace!(node = %id, op = kind.name(), shape = ?value.shape(), "computed");
        self.node_mut(id)?.set_value(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn sum_of_input_with_itself() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let s = builder.sum(&[a, a]).unwrap();
        let mut graph = builder.build();

        let feed: Feed = [(a, 5.0)].into_iter().collect();
        assert_eq!(graph.evaluate(&feed, s).unwrap(), &Tensor::scalar(10.0));
    }

    #[test]
    fn output_outside_order_is_unreachable() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let b = builder.input();
        let sa = builder.sigmoid(a).unwrap();
        let sb = builder.sigmoid(b).unwrap();
        let mut graph = builder.build();

        let feed: Feed = [(a, 0.0)].into_iter().collect();
        let order = graph.topological_sort(&feed).unwrap();
        let err = graph.forward_pass(sb, &order).unwrap_err();
        assert!(matches!(err, GraphError::UnreachableOutput { node } if node == sb));
        assert!(graph.value(sa).is_none());
    }

    #[test]
    fn unfed_producer_is_a_missing_value() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let b = builder.input();
        let s = builder.sum(&[a, b]).unwrap();
        let mut graph = builder.build();

        let err = graph.forward_pass(s, &[a, b, s]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MissingValue { node, consumer } if node == a && consumer == s
        ));
    }

    #[test]
    fn failure_keeps_earlier_values() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let b = builder.input();
        let sa = builder.sigmoid(a).unwrap();
        let bad = builder.sum(&[sa, b]).unwrap();
        let mut graph = builder.build();

        let mut feed = Feed::new();
        feed.insert(a, Tensor::vector(vec![0.0, 0.0]));
        feed.insert(b, Tensor::vector(vec![1.0]));

        let err = graph.evaluate(&feed, bad).unwrap_err();
        assert!(matches!(err, GraphError::Shape { node, op: "sum", .. } if node == bad));
        assert_eq!(graph.value(sa), Some(&Tensor::vector(vec![0.5, 0.5])));
        assert!(graph.value(bad).is_none());
    }
}
