//! Generalised matrix product as a graph function.

use crate::contract::{ContractionProperties, contract};
use crate::error::Result;
use crate::function::{Derivative, TensorFunction, check_arity};
use crate::tensor::{SharedTensor, Tensor};

/// `C = contract(A, B, common)`.
///
/// Collapsing `A` to an `m×n` matrix, `B` to `n×p` and `C` to `m×p`:
///
/// ```text
/// ∂C[i,j]/∂A[k,l] = B[l,j] if i == k, else 0
/// ∂C[i,j]/∂B[k,l] = A[i,k] if l == j, else 0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMultiplication {
    common: usize,
}

impl ChainMultiplication {
    pub fn new(common: usize) -> Self {
        Self { common }
    }

    /// Number of contracted axes.
    pub fn common(&self) -> usize {
        self.common
    }
}

impl TensorFunction for ChainMultiplication {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("chain_multiplication", inputs, 2)?;
        Ok(contract(&inputs[0], &inputs[1], self.common)?.into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        let value = self.value(inputs)?;
        let (a, b) = (&inputs[0], &inputs[1]);
        let props = ContractionProperties::compute(a.shape(), b.shape(), self.common)?;
        let (m, n, p) = (props.dleft, props.dmid, props.dright);
        let c_size = m * p;

        let mut d_a = Tensor::zero_jacobian(value.shape(), a.shape());
        {
            let data = d_a.data_mut();
            for i in 0..m {
                for l in 0..n {
                    let row = (i * n + l) * c_size + i * p;
                    data[row..row + p].copy_from_slice(&b.data()[l * p..(l + 1) * p]);
                }
            }
        }

        let mut d_b = Tensor::zero_jacobian(value.shape(), b.shape());
        {
            let data = d_b.data_mut();
            for k in 0..n {
                for l in 0..p {
                    let base = (k * p + l) * c_size + l;
                    for i in 0..m {
                        data[base + i * p] = a.data()[i * n + k];
                    }
                }
            }
        }

        Ok(Derivative {
            value,
            jacobians: vec![d_a.into_shared(), d_b.into_shared()],
        })
    }
}
