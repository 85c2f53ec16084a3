//! Elementwise nonlinearities.

use super::{expect_arity, Kernel};
use crate::error::Result;
use crate::graph::{Arity, NodeId};
use crate::tensor::Tensor;

/// Logistic sigmoid, split on sign so `exp` never overflows.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SigmoidKernel;

impl Kernel for SigmoidKernel {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    fn compute(&self, node: NodeId, inputs: &[&Tensor]) -> Result<Tensor> {
        expect_arity(node, self.name(), inputs, Arity::Exactly(1))?;
        Ok(inputs[0].map(sigmoid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_of_zero_is_half() {
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn sigmoid_is_symmetric() {
        for x in [0.1, 1.0, 3.5, 10.0] {
            assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn kernel_keeps_shape() {
        let x = Tensor::matrix(&[[0.0, 0.0], [0.0, 0.0]]).unwrap();
        let out = SigmoidKernel.compute(NodeId::from_index(0), &[&x]).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert!(out.data().iter().all(|&v| v == 0.5));
    }
}
