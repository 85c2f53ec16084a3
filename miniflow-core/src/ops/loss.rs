//! Error metrics.

use super::{expect_arity, shape_error, Kernel};
use crate::error::{Result, TensorError};
use crate::graph::{Arity, NodeId};
use crate::tensor::Tensor;

/// Mean squared error between a target and a prediction.
///
/// Both operands are flattened first, so a `[n]` target and a `[n, 1]`
/// prediction compare example by example instead of broadcasting.
#[derive(Debug, Clone, Copy, Default)]
pub struct MseKernel;

impl Kernel for MseKernel {
    fn name(&self) -> &'static str {
        "mse"
    }

    fn compute(&self, node: NodeId, inputs: &[&Tensor]) -> Result<Tensor> {
        expect_arity(node, self.name(), inputs, Arity::Exactly(2))?;
        let (target, prediction) = (inputs[0].flatten(), inputs[1].flatten());
        if target.len() != prediction.len() {
            return Err(shape_error(node, self.name())(TensorError::Incompatible {
                op: "mse",
                left: inputs[0].shape().to_vec(),
                right: inputs[1].shape().to_vec(),
            }));
        }

        let squared = target
            .data()
            .iter()
            .zip(prediction.data())
            .map(|(y, a)| (y - a).powi(2))
            .collect();
        let mean = Tensor::vector(squared)
            .mean()
            .map_err(shape_error(node, self.name()))?;
        Ok(Tensor::scalar(mean))
    }
}
