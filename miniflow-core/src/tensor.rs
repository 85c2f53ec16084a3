//! Tensor Values
//!
//! Every node caches one [`Tensor`]: a dense, row-major block of `f64` of
//! rank 0 (scalar), 1 (vector) or 2 (matrix). Only the handful of
//! operations the built-in kernels need are provided here.
//!
//! # Matrix View
//!
//! `matmul` and the bias broadcast treat every tensor as a matrix:
//!
//! - rank 2 `[n, m]` is itself
//! - rank 1 `[m]` is a single row `[1, m]`
//! - rank 0 is `[1, 1]`

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::TensorError;

/// Inline storage for tensor dimensions.
pub type Shape = SmallVec<[usize; 2]>;

const MAX_RANK: usize = 2;

/// A dense `f64` tensor of rank 0, 1 or 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTensor")]
pub struct Tensor {
    shape: Shape,
    data: Vec<f64>,
}

/// Unvalidated wire form, checked on the way in.
#[derive(Deserialize)]
struct RawTensor {
    shape: Shape,
    data: Vec<f64>,
}

impl TryFrom<RawTensor> for Tensor {
    type Error = TensorError;

    fn try_from(raw: RawTensor) -> Result<Self, Self::Error> {
        Tensor::from_shape(&raw.shape, raw.data)
    }
}

impl Tensor {
    /// Create a rank-0 tensor.
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Shape::new(),
            data: vec![value],
        }
    }

    /// Create a rank-1 tensor.
    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: smallvec::smallvec![data.len()],
            data,
        }
    }

    /// Create a rank-2 tensor from rows. Every row must have the same length.
    pub fn matrix<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, TensorError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != cols {
                return Err(TensorError::Ragged {
                    row,
                    expected: cols,
                    actual: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self {
            shape: smallvec::smallvec![rows.len(), cols],
            data,
        })
    }

    /// Create a tensor with an explicit shape over row-major data.
    pub fn from_shape(shape: &[usize], data: Vec<f64>) -> Result<Self, TensorError> {
        if shape.len() > MAX_RANK {
            return Err(TensorError::Rank(shape.len()));
        }
        let expected = element_count(shape)?;
        if expected != data.len() {
            return Err(TensorError::ElementCount {
                shape: shape.to_vec(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape: Shape::from_slice(shape),
            data,
        })
    }

    /// Create a zero-filled tensor.
    pub fn zeros(shape: &[usize]) -> Result<Self, TensorError> {
        if shape.len() > MAX_RANK {
            return Err(TensorError::Rank(shape.len()));
        }
        let len = element_count(shape)?;
        Self::from_shape(shape, vec![0.0; len])
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major element storage.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// The single element of a one-element tensor, whatever its rank.
    pub fn as_scalar(&self) -> Option<f64> {
        match self.data.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Row count under the matrix view.
    pub fn rows(&self) -> usize {
        match self.shape.as_slice() {
            [rows, _] => *rows,
            _ => 1,
        }
    }

    /// Column count under the matrix view.
    pub fn cols(&self) -> usize {
        match self.shape.as_slice() {
            [_, cols] => *cols,
            [len] => *len,
            _ => 1,
        }
    }

    /// Elementwise sum. Shapes must match exactly; there is no broadcasting.
    pub fn add(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        if self.shape != other.shape {
            return Err(self.incompatible("add", other));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a + b)
            .collect();
        Ok(Self {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Matrix product `self · other`, always returning a rank-2 tensor.
    ///
    /// A rank-1 right operand of length `k` is read as a `[k, 1]` column.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        let (n, k) = (self.rows(), self.cols());
        let (k2, m) = match other.shape.as_slice() {
            [rows, cols] => (*rows, *cols),
            [len] => (*len, 1),
            _ => (1, 1),
        };
        if k != k2 {
            return Err(self.incompatible("matmul", other));
        }

        let mut data = vec![0.0; n * m];
        for i in 0..n {
            let row = &self.data[i * k..(i + 1) * k];
            for (p, &lhs) in row.iter().enumerate() {
                let rhs = &other.data[p * m..(p + 1) * m];
                for (out, &w) in data[i * m..(i + 1) * m].iter_mut().zip(rhs) {
                    *out += lhs * w;
                }
            }
        }
        Ok(Self {
            shape: smallvec::smallvec![n, m],
            data,
        })
    }

    /// Add a bias row to every row of a rank-2 tensor.
    ///
    /// The bias must hold exactly one row of `self.cols()` elements, so
    /// `[m]`, `[1, m]` and (for `m == 1`) a scalar are all accepted.
    pub fn add_row_bias(&self, bias: &Tensor) -> Result<Tensor, TensorError> {
        let m = self.cols();
        if self.rank() != MAX_RANK || bias.rows() != 1 || bias.len() != m {
            return Err(self.incompatible("bias", bias));
        }
        let mut data = self.data.clone();
        for row in data.chunks_mut(m.max(1)) {
            for (out, b) in row.iter_mut().zip(&bias.data) {
                *out += b;
            }
        }
        Ok(Self {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Tensor {
        Self {
            shape: self.shape.clone(),
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    /// Reshape into a rank-1 tensor over the same elements.
    pub fn flatten(&self) -> Tensor {
        Self::vector(self.data.clone())
    }

    /// Mean of all elements.
    pub fn mean(&self) -> Result<f64, TensorError> {
        if self.data.is_empty() {
            return Err(TensorError::Empty);
        }
        Ok(self.data.iter().sum::<f64>() / self.data.len() as f64)
    }

    /// Same shape and every element within `tolerance`.
    pub fn approx_eq(&self, other: &Tensor, tolerance: f64) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    fn incompatible(&self, op: &'static str, other: &Tensor) -> TensorError {
        TensorError::Incompatible {
            op,
            left: self.shape.to_vec(),
            right: other.shape.to_vec(),
        }
    }
}

/// Product of the dimensions, or an error if it does not fit in `usize`.
fn element_count(shape: &[usize]) -> Result<usize, TensorError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| TensorError::Overflow {
            shape: shape.to_vec(),
        })
}

impl From<f64> for Tensor {
    fn from(value: f64) -> Self {
        Self::scalar(value)
    }
}

impl From<Vec<f64>> for Tensor {
    fn from(data: Vec<f64>) -> Self {
        Self::vector(data)
    }
}
