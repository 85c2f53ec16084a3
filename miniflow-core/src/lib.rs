//! Miniflow Core
//!
//! This crate provides the engine of the Miniflow dataflow graph
//! evaluator. It implements:
//!
//! - A node arena with producer/consumer edges
//! - Kahn's-algorithm ordering of the subgraph reachable from a feed
//! - A forward-pass driver that computes each node in order
//! - A small set of illustrative node kinds (sum, linear, sigmoid, MSE)
//!
//! Everything runs synchronously on the calling thread. The crate logs
//! through `tracing` and never installs a subscriber itself.
//!
//! # Architecture
//!
//! - `graph`: nodes, construction, feeds, sorting and evaluation
//! - `ops`: the kernels behind each computing node kind
//! - `tensor`: the value type every node caches
//! - `error`: the engine's error types
//!
//! # Example
//!
//! ```rust
//! use miniflow_core::graph::{Feed, GraphBuilder};
//! use miniflow_core::tensor::Tensor;
//!
//! let mut builder = GraphBuilder::new();
//! let x = builder.input();
//! let w = builder.input();
//! let b = builder.input();
//! let out = builder.linear(x, w, b).unwrap();
//! let mut graph = builder.build();
//!
//! let mut feed = Feed::new();
//! feed.insert(x, Tensor::matrix(&[[1.0, 2.0]]).unwrap());
//! feed.insert(w, Tensor::matrix(&[[1.0], [1.0]]).unwrap());
//! feed.insert(b, Tensor::vector(vec![0.0]));
//!
//! let order = graph.topological_sort(&feed).unwrap();
//! let value = graph.forward_pass(out, &order).unwrap();
//! assert_eq!(value, &Tensor::matrix(&[[3.0]]).unwrap());
//! ```

pub mod error;
pub mod graph;
pub mod ops;
pub mod tensor;

pub use error::{GraphError, Result, TensorError};
pub use graph::{Feed, Graph, GraphBuilder, NodeId, NodeKind};
pub use tensor::Tensor;
