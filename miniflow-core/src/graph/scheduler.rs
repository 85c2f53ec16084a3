//! Evaluation Scheduler
//!
//! The scheduler turns a feed into an evaluation order: every node that can
//! be reached from the fed inputs, each one after all of its producers.
//!
//! # Algorithm
//!
//! We use Kahn's algorithm over the subgraph reachable from the feed:
//!
//! 1. Discovery: walk consumer edges breadth-first from the feed keys and
//!    count, for every node found, how many of its distinct producers were
//!    also found.
//! 2. Emission: start a FIFO ready queue with the feed keys in feed order.
//!    Pop a node, stamp it with its fed value if it has one, append it to
//!    the order, and decrement the count of each of its consumers. A
//!    consumer whose count reaches zero joins the back of the queue.
//!
//! Consumers are visited in ascending id order, so the order depends only
//! on the graph and the feed's key order.
//!
//! A node whose ancestry does not trace back to the feed is never found, and
//! is therefore left out of the order.

use std::collections::VecDeque;

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::arena::Graph;
use super::feed::Feed;
use super::node::NodeId;
use crate::error::{GraphError, Result};

impl Graph {
    /// Order the subgraph reachable from `feed` and stamp every fed input
    /// with its value.
    ///
    /// Every key is checked before anything is touched: a key that is not
    /// an Input fails with [`GraphError::InvalidFeedKey`] and no node value
    /// changes.
    pub fn topological_sort(&mut self, feed: &Feed) -> Result<Vec<NodeId>> {
        for id in feed.keys() {
            self.expect_input(id)?;
        }

        let mut pending = self.discover(feed);
        let mut ready: VecDeque<NodeId> = feed.keys().collect();
        let mut order = Vec::with_capacity(pending.len());

        while let Some(id) = ready.pop_front() {
            if let Some(value) = feed.get(id) {
                trace!(node = %id, shape = ?value.shape(), "stamping input");
                self.nodes[id.index()].set_value(value.clone());
            }
            order.push(id);

            for &consumer in self.nodes[id.index()].outbound() {
                if let Some(count) = pending.get_mut(&consumer) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(consumer);
                    }
                }
            }
        }

        if order.len() != pending.len() {
            let stuck = pending
                .iter()
                .filter(|&(_, &count)| count > 0)
                .map(|(&id, _)| id)
                .collect();
            return Err(GraphError::InternalInconsistency { stuck });
        }

        debug!(
            inputs = feed.len(),
            nodes = order.len(),
            total = self.nodes.len(),
            "sorted graph"
        );
        Ok(order)
    }

    /// Breadth-first discovery from the feed keys. Returns, for every
    /// reachable node in discovery order, the number of its distinct
    /// producers that are themselves reachable.
    fn discover(&self, feed: &Feed) -> IndexMap<NodeId, usize> {
        let mut pending: IndexMap<NodeId, usize> = feed.keys().map(|id| (id, 0)).collect();
        let mut queue: VecDeque<NodeId> = feed.keys().collect();

        while let Some(id) = queue.pop_front() {
            for &consumer in self.nodes[id.index()].outbound() {
                match pending.entry(consumer) {
                    Entry::Occupied(mut entry) => *entry.get_mut() += 1,
                    Entry::Vacant(entry) => {
                        entry.insert(1);
                        queue.push_back(consumer);
                    }
                }
            }
        }

        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::tensor::Tensor;

    fn position(order: &[NodeId], id: NodeId) -> usize {
        order.iter().position(|&n| n == id).unwrap()
    }

    #[test]
    fn chain_is_sorted_in_dependency_order() {
        // a -> s1 -> s2
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let s1 = builder.sigmoid(a).unwrap();
        let s2 = builder.sigmoid(s1).unwrap();
        let mut graph = builder.build();

        let feed: Feed = [(a, 0.0)].into_iter().collect();
        let order = graph.topological_sort(&feed).unwrap();
        assert_eq!(order, vec![a, s1, s2]);
    }

    #[test]
    fn diamond_waits_for_both_producers() {
        //      a
        //     / \
        //   s1   s2
        //     \ /
        //     sum
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let s1 = builder.sigmoid(a).unwrap();
        let s2 = builder.sum(&[s1]).unwrap();
        let s3 = builder.sigmoid(a).unwrap();
        let sum = builder.sum(&[s2, s3]).unwrap();
        let mut graph = builder.build();

        let feed: Feed = [(a, 1.0)].into_iter().collect();
        let order = graph.topological_sort(&feed).unwrap();

        assert_eq!(order.len(), 5);
        assert!(position(&order, s2) < position(&order, sum));
        assert!(position(&order, s3) < position(&order, sum));
        assert_eq!(*order.last().unwrap(), sum);
    }

    #[test]
    fn tie_break_follows_feed_then_consumer_order() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let b = builder.input();
        let sb = builder.sigmoid(b).unwrap();
        let sa = builder.sigmoid(a).unwrap();
        let mut graph = builder.build();

        let feed: Feed = [(b, 1.0), (a, 2.0)].into_iter().collect();
        assert_eq!(graph.topological_sort(&feed).unwrap(), vec![b, a, sb, sa]);

        let feed: Feed = [(a, 2.0), (b, 1.0)].into_iter().collect();
        assert_eq!(graph.topological_sort(&feed).unwrap(), vec![a, b, sa, sb]);
    }

    #[test]
    fn repeated_edge_counts_once() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let s = builder.sum(&[a, a]).unwrap();
        let mut graph = builder.build();

        let feed: Feed = [(a, 5.0)].into_iter().collect();
        assert_eq!(graph.topological_sort(&feed).unwrap(), vec![a, s]);
    }

    #[test]
    fn nodes_outside_the_feed_are_excluded() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let b = builder.input();
        let sa = builder.sigmoid(a).unwrap();
        let sb = builder.sigmoid(b).unwrap();
        let mut graph = builder.build();

        let feed: Feed = [(a, 0.0)].into_iter().collect();
        let order = graph.topological_sort(&feed).unwrap();
        assert_eq!(order, vec![a, sa]);
        assert!(!order.contains(&sb));
    }

    #[test]
    fn sort_stamps_fed_inputs() {
        let mut builder = GraphBuilder::new();
        let x = builder.input();
        let y = builder.input();
        let _cost = builder.mse(y, x).unwrap();
        let mut graph = builder.build();

        let mut feed = Feed::new();
        feed.insert(x, Tensor::vector(vec![1.0, 2.0]));
        feed.insert(y, Tensor::vector(vec![3.0, 4.0]));
        graph.topological_sort(&feed).unwrap();

        assert_eq!(graph.value(x), feed.get(x));
        assert_eq!(graph.value(y), feed.get(y));
    }

    #[test]
    fn invalid_key_is_rejected_before_stamping() {
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let s = builder.sigmoid(a).unwrap();
        let mut graph = builder.build();

        let mut feed = Feed::new();
        feed.insert(a, 1.0);
        feed.insert(s, 2.0);

        let err = graph.topological_sort(&feed).unwrap_err();
        assert!(matches!(err, GraphError::InvalidFeedKey { node, .. } if node == s));
        assert!(graph.value(a).is_none());
        assert!(graph.value(s).is_none());
    }

    #[test]
    fn cycle_is_reported_as_inconsistency() {
        // Only reachable by bypassing the builder.
        let mut builder = GraphBuilder::new();
        let a = builder.input();
        let s1 = builder.sum(&[a]).unwrap();
        let s2 = builder.sum(&[s1]).unwrap();
        let mut graph = builder.build();
        graph.nodes[s2.index()].add_outbound(s1);

        let feed: Feed = [(a, 1.0)].into_iter().collect();
        let err = graph.topological_sort(&feed).unwrap_err();
        match err {
            GraphError::InternalInconsistency { stuck } => assert_eq!(stuck, vec![s1, s2]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
