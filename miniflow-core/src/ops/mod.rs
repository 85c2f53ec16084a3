//! Node Kernels
//!
//! A kernel derives a node's value from the cached values of its inbound
//! nodes, read positionally. Kernels never see the graph: the forward-pass
//! driver collects the producer values and stores the result, so a kernel
//! cannot touch any other node's state.
//!
//! The set of node kinds is closed (see [`NodeKind`](crate::graph::NodeKind));
//! each computing kind maps to one kernel here.

mod activation;
mod arith;
mod loss;

pub use activation::{sigmoid, SigmoidKernel};
pub use arith::{LinearKernel, SumKernel};
pub use loss::MseKernel;

use crate::error::{GraphError, Result, TensorError};
use crate::graph::{Arity, NodeId};
use crate::tensor::Tensor;

/// The compute capability shared by every node kind.
pub trait Kernel: Send + Sync {
    /// Operation name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Compute the value of `node` from its producers' values.
    ///
    /// The default body reports the operation as unimplemented; every
    /// concrete kernel overrides it.
    fn compute(&self, node: NodeId, inputs: &[&Tensor]) -> Result<Tensor> {
        let _ = inputs;
        Err(GraphError::Unimplemented {
            node,
            op: self.name(),
        })
    }
}

/// Guard positional reads in kernels called outside a built graph.
fn expect_arity(node: NodeId, op: &'static str, inputs: &[&Tensor], expected: Arity) -> Result<()> {
    if expected.accepts(inputs.len()) {
        Ok(())
    } else {
        Err(GraphError::Arity {
            node,
            op,
            expected,
            actual: inputs.len(),
        })
    }
}

/// Attach node context to a tensor failure.
fn shape_error(node: NodeId, op: &'static str) -> impl FnOnce(TensorError) -> GraphError {
    move |source| GraphError::Shape { node, op, source }
}
