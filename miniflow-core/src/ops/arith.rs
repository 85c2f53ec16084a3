//! Additive kernels: `Sum` and `Linear`.

use super::{expect_arity, shape_error, Kernel};
use crate::error::Result;
use crate::graph::{Arity, NodeId};
use crate::tensor::Tensor;

/// Elementwise sum of any number of equally shaped values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumKernel;

impl Kernel for SumKernel {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn compute(&self, node: NodeId, inputs: &[&Tensor]) -> Result<Tensor> {
        expect_arity(node, self.name(), inputs, Arity::AtLeast(1))?;
        let (first, rest) = (inputs[0], &inputs[1..]);
        rest.iter().try_fold(first.clone(), |acc, value| {
            acc.add(value).map_err(shape_error(node, self.name()))
        })
    }
}

/// `X · W + b` for a batch of examples.
///
/// `X` is `[n, k]` (or a single example `[k]`), `W` is `[k, m]` and `b`
/// holds one row of `m` biases added to every example.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl Kernel for LinearKernel {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn compute(&self, node: NodeId, inputs: &[&Tensor]) -> Result<Tensor> {
        expect_arity(node, self.name(), inputs, Arity::Exactly(3))?;
        let (x, w, b) = (inputs[0], inputs[1], inputs[2]);
        x.matmul(w)
            .and_then(|xw| xw.add_row_bias(b))
            .map_err(shape_error(node, self.name()))
    }
}
