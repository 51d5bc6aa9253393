//! Built-in tensor functions.
//!
//! Each constructor returns a [`SharedFunction`] ready to be passed to
//! [`GraphBuilder::add_operation`](crate::GraphBuilder::add_operation).
//!
//! | constructor | inputs | value |
//! |---|---|---|
//! | [`add`] | 2, same shape | `a + b` |
//! | [`chain_multiplication`] | 2 | `contract(a, b, k)` |
//! | [`sigmoid`] | 1 | `1 / (1 + e^-x)` |
//! | [`log`] | 1 | `ln x` |
//! | [`reduce_sum`] | 1 | sum over one axis |
//! | [`element_wise_multiplication`] | 2, same shape | `a ⊙ b` |
//! | [`negative`] | 1 | `-x` |
//! | [`softmax`] | 1 | `e^x / Σ e^x` over all elements |
//!
//! Domain errors such as the log of a non-positive number are not checked;
//! NaN and infinity propagate.

mod contraction;
mod elementwise;
mod reduction;

use std::sync::Arc;

pub use contraction::ChainMultiplication;
pub use elementwise::{Add, ElementWiseMultiplication, Log, Negative, Sigmoid};
pub use reduction::{ReduceSum, Softmax};

use crate::function::SharedFunction;
use crate::strides::num_elements;
use crate::tensor::Tensor;

/// Element-wise sum of two tensors of the same shape.
pub fn add() -> SharedFunction {
    Arc::new(Add)
}

/// Contraction of the last `common` axes of the first input with the first
/// `common` axes of the second.
pub fn chain_multiplication(common: usize) -> SharedFunction {
    Arc::new(ChainMultiplication::new(common))
}

/// Logistic sigmoid, element-wise.
pub fn sigmoid() -> SharedFunction {
    Arc::new(Sigmoid)
}

/// Natural logarithm, element-wise.
pub fn log() -> SharedFunction {
    Arc::new(Log)
}

/// Sum over `axis`, which is removed from the shape.
pub fn reduce_sum(axis: usize) -> SharedFunction {
    Arc::new(ReduceSum::new(axis))
}

/// Element-wise (Hadamard) product of two tensors of the same shape.
pub fn element_wise_multiplication() -> SharedFunction {
    Arc::new(ElementWiseMultiplication)
}

/// Element-wise negation.
pub fn negative() -> SharedFunction {
    Arc::new(Negative)
}

/// Softmax over every element of the input, whatever its shape.
pub fn softmax() -> SharedFunction {
    Arc::new(Softmax)
}

/// Jacobian of an element-wise map: zero except `J[p, p] = diagonal[p]`.
fn diagonal_jacobian(shape: &[usize], diagonal: impl IntoIterator<Item = f64>) -> Tensor {
    let mut jacobian = Tensor::zero_jacobian(shape, shape);
    let stride = num_elements(shape) + 1;
    for (i, value) in diagonal.into_iter().enumerate() {
        jacobian.data_mut()[i * stride] = value;
    }
    jacobian
}
