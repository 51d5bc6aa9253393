//! Functions that mix elements: axis sums and softmax.

use crate::error::{GraphError, Result};
use crate::function::{Derivative, TensorFunction, check_arity};
use crate::strides::num_elements;
use crate::tensor::{Shape, SharedTensor, Tensor};

/// Sum over one axis, which is removed from the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceSum {
    axis: usize,
}

/// Extents of an input split around the reduced axis.
struct Split {
    left: usize,
    center: usize,
    right: usize,
    output_shape: Shape,
}

impl ReduceSum {
    pub fn new(axis: usize) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    fn split(&self, shape: &[usize]) -> Result<Split> {
        if self.axis >= shape.len() {
            return Err(GraphError::InvalidAxis {
                axis: self.axis,
                rank: shape.len(),
            });
        }
        let mut output_shape = Shape::from_slice(shape);
        output_shape.remove(self.axis);
        Ok(Split {
            left: num_elements(&shape[..self.axis]),
            center: shape[self.axis],
            right: num_elements(&shape[self.axis + 1..]),
            output_shape,
        })
    }

    fn sum(input: &Tensor, split: &Split) -> Result<Tensor> {
        let Split {
            left,
            center,
            right,
            ..
        } = *split;
        let mut data = vec![0.0; left * right];
        for (offset, &x) in input.data().iter().enumerate() {
            let l = offset / (center * right);
            let r = offset % right;
            data[l * right + r] += x;
        }
        Tensor::from_vec(data, &split.output_shape)
    }
}

impl TensorFunction for ReduceSum {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("reduce_sum", inputs, 1)?;
        let split = self.split(inputs[0].shape())?;
        Ok(Self::sum(&inputs[0], &split)?.into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        check_arity("reduce_sum", inputs, 1)?;
        let input = &inputs[0];
        let split = self.split(input.shape())?;
        let value = Self::sum(input, &split)?;

        // J[v, o] = 1 when v and o agree on every axis except the reduced one.
        let (center, right) = (split.center, split.right);
        let output_size = value.len();
        let mut jacobian = Tensor::zero_jacobian(value.shape(), input.shape());
        let data = jacobian.data_mut();
        for v in 0..input.len() {
            let o = (v / (center * right)) * right + v % right;
            data[v * output_size + o] = 1.0;
        }

        Ok(Derivative {
            value: value.into_shared(),
            jacobians: vec![jacobian.into_shared()],
        })
    }
}

/// `s_i = e^{x_i} / Σ_k e^{x_k}` over every element of the input.
///
/// `∂s_j/∂x_i = s_i (δ_ij - s_j)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Softmax;

impl Softmax {
    fn softmax(input: &Tensor) -> Result<Tensor> {
        let max = input.data().iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = input.data().iter().map(|&x| (x - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        Tensor::from_vec(exps.into_iter().map(|e| e / total).collect(), input.shape())
    }
}

impl TensorFunction for Softmax {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("softmax", inputs, 1)?;
        Ok(Self::softmax(&inputs[0])?.into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        check_arity("softmax", inputs, 1)?;
        let value = Self::softmax(&inputs[0])?;
        let s = value.data();
        let n = s.len();

        let mut jacobian = Tensor::zero_jacobian(value.shape(), value.shape());
        let data = jacobian.data_mut();
        for i in 0..n {
            for j in 0..n {
                let delta = if i == j { 1.0 } else { 0.0 };
                data[i * n + j] = s[i] * (delta - s[j]);
            }
        }

        Ok(Derivative {
            value: value.into_shared(),
            jacobians: vec![jacobian.into_shared()],
        })
    }
}
