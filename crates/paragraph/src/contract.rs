//! Generalised matrix product over leading/trailing axes.
//!
//! `contract(lhs, rhs, k)` sums the last `k` axes of `lhs` against the first
//! `k` axes of `rhs`:
//!
//! ```text
//! out[i.., j..] = Σ_c lhs[i.., c..] * rhs[c.., j..]
//! ```
//!
//! With `k = 1` on matrices this is ordinary matrix multiplication; with a
//! Jacobian on each side it is the chain rule, and with a perturbation `δx` on
//! the left and `∂f/∂x` on the right it is the first-order change `δf`.

use crate::backend::{ContractionBackend, GenericBackend};
use crate::error::{GraphError, Result};
use crate::strides::num_elements;
use crate::tensor::{Shape, Tensor};

/// Below this many multiply-adds the loop backend beats GEMM setup cost.
#[cfg(feature = "faer")]
const GEMM_MIN_WORK: usize = 4096;

/// Shapes of a contraction after collapsing both operands to matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionProperties {
    /// Product of the uncontracted leading extents of `lhs`.
    pub dleft: usize,
    /// Product of the contracted extents.
    pub dmid: usize,
    /// Product of the uncontracted trailing extents of `rhs`.
    pub dright: usize,
    /// `lhs[..rank - k] ++ rhs[k..]`.
    pub output_shape: Shape,
}

impl ContractionProperties {
    /// Validate a contraction of `common` axes and compute its dimensions.
    ///
    /// # Errors
    ///
    /// - [`GraphError::ContractionRankTooLarge`] if `common` exceeds either rank.
    /// - [`GraphError::ContractionShapeMismatch`] if the paired axes differ.
    pub fn compute(lhs_shape: &[usize], rhs_shape: &[usize], common: usize) -> Result<Self> {
        if common > lhs_shape.len() || common > rhs_shape.len() {
            return Err(GraphError::ContractionRankTooLarge {
                common,
                lhs_rank: lhs_shape.len(),
                rhs_rank: rhs_shape.len(),
            });
        }

        let (lhs_outer, lhs_common) = lhs_shape.split_at(lhs_shape.len() - common);
        let (rhs_common, rhs_outer) = rhs_shape.split_at(common);
        if lhs_common != rhs_common {
            return Err(GraphError::ContractionShapeMismatch {
                lhs: lhs_common.to_vec(),
                rhs: rhs_common.to_vec(),
            });
        }

        let mut output_shape = Shape::with_capacity(lhs_outer.len() + rhs_outer.len());
        output_shape.extend_from_slice(lhs_outer);
        output_shape.extend_from_slice(rhs_outer);

        Ok(Self {
            dleft: num_elements(lhs_outer),
            dmid: num_elements(lhs_common),
            dright: num_elements(rhs_outer),
            output_shape,
        })
    }

    /// Number of multiply-adds the contraction performs.
    pub fn work(&self) -> usize {
        self.dleft * self.dmid * self.dright
    }
}

/// Contract the last `common` axes of `lhs` with the first `common` axes of `rhs`.
///
/// Uses the faer GEMM backend for large products when the `faer` feature is
/// enabled, and the loop backend otherwise.
///
/// # Errors
///
/// See [`ContractionProperties::compute`].
///
/// # Examples
///
/// ```
/// use paragraph::{Tensor, contract};
///
/// // Matrix multiplication: C[i,k] = A[i,j] * B[j,k]
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let b = Tensor::from_vec(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]).unwrap();
/// let c = contract(&a, &b, 1).unwrap();
/// assert_eq!(c.shape(), &[2, 2]);
/// assert_eq!(c.data(), &[4.0, 5.0, 10.0, 11.0]);
/// ```
pub fn contract(lhs: &Tensor, rhs: &Tensor, common: usize) -> Result<Tensor> {
    let props = ContractionProperties::compute(lhs.shape(), rhs.shape(), common)?;

    #[cfg(feature = "faer")]
    if props.work() >= GEMM_MIN_WORK {
        return Ok(contract_prepared::<crate::backend::FaerBackend>(lhs, rhs, props));
    }

    Ok(contract_prepared::<GenericBackend>(lhs, rhs, props))
}

/// Contract with an explicitly chosen backend.
///
/// # Errors
///
/// See [`ContractionProperties::compute`].
pub fn contract_with<B: ContractionBackend>(
    lhs: &Tensor,
    rhs: &Tensor,
    common: usize,
) -> Result<Tensor> {
    let props = ContractionProperties::compute(lhs.shape(), rhs.shape(), common)?;
    Ok(contract_prepared::<B>(lhs, rhs, props))
}

fn contract_prepared<B: ContractionBackend>(
    lhs: &Tensor,
    rhs: &Tensor,
    props: ContractionProperties,
) -> Tensor {
    let mut result = Tensor::zeros(&props.output_shape);
    if props.work() > 0 {
        B::contract_into(result.data_mut(), lhs.data(), rhs.data(), &props);
    }
    result
}
