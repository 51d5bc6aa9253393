//! Element-wise functions. Every Jacobian here is diagonal.

use super::diagonal_jacobian;
use crate::error::Result;
use crate::function::{Derivative, TensorFunction, check_arity};
use crate::operations::{self, map, scale, zip_with};
use crate::tensor::{SharedTensor, Tensor};

/// `a + b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl TensorFunction for Add {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("add", inputs, 2)?;
        Ok(operations::add(&inputs[0], &inputs[1])?.into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        let value = self.value(inputs)?;
        let identity = Tensor::identity_jacobian(value.shape()).into_shared();
        Ok(Derivative {
            value,
            jacobians: vec![identity.clone(), identity],
        })
    }
}

/// `a ⊙ b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementWiseMultiplication;

impl TensorFunction for ElementWiseMultiplication {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("element_wise_multiplication", inputs, 2)?;
        let product = zip_with(
            &inputs[0],
            &inputs[1],
            "element_wise_multiplication",
            |a, b| a * b,
        )?;
        Ok(product.into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        let value = self.value(inputs)?;
        let (lhs, rhs) = (&inputs[0], &inputs[1]);
        let d_lhs = diagonal_jacobian(lhs.shape(), rhs.data().iter().copied());
        let d_rhs = diagonal_jacobian(rhs.shape(), lhs.data().iter().copied());
        Ok(Derivative {
            value,
            jacobians: vec![d_lhs.into_shared(), d_rhs.into_shared()],
        })
    }
}

/// `-x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Negative;

impl TensorFunction for Negative {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("negative", inputs, 1)?;
        Ok(scale(&inputs[0], -1.0).into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        let value = self.value(inputs)?;
        let jacobian = scale(&Tensor::identity_jacobian(value.shape()), -1.0);
        Ok(Derivative {
            value,
            jacobians: vec![jacobian.into_shared()],
        })
    }
}

/// `1 / (1 + e^-x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl TensorFunction for Sigmoid {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("sigmoid", inputs, 1)?;
        Ok(map(&inputs[0], |x| 1.0 / (1.0 + (-x).exp())).into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        let value = self.value(inputs)?;
        // s'(x) = s(x) (1 - s(x)), finite wherever s is
        let diagonal = value.data().iter().map(|&s| s * (1.0 - s));
        let jacobian = diagonal_jacobian(value.shape(), diagonal);
        Ok(Derivative {
            value,
            jacobians: vec![jacobian.into_shared()],
        })
    }
}

/// Natural logarithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

impl TensorFunction for Log {
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor> {
        check_arity("log", inputs, 1)?;
        Ok(map(&inputs[0], f64::ln).into_shared())
    }

    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative> {
        let value = self.value(inputs)?;
        let diagonal = inputs[0].data().iter().map(|&x| 1.0 / x);
        let jacobian = diagonal_jacobian(value.shape(), diagonal);
        Ok(Derivative {
            value,
            jacobians: vec![jacobian.into_shared()],
        })
    }
}
