//! Element-wise tensor operations.

use crate::error::Result;
use crate::tensor::Tensor;

/// Add two tensors of identical shape.
///
/// # Errors
///
/// Returns [`GraphError::ShapeMismatch`](crate::GraphError::ShapeMismatch)
/// if the shapes differ, including tensors of equal size but different rank.
///
/// # Example
///
/// ```
/// use paragraph::Tensor;
/// use paragraph::operations::add;
///
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let b = Tensor::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();
/// assert_eq!(add(&a, &b).unwrap().data(), &[11.0, 22.0, 33.0]);
/// ```
pub fn add(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor> {
    zip_with(lhs, rhs, "add", |a, b| a + b)
}

/// Combine two tensors of identical shape element by element.
///
/// `context` names the caller in the error message on shape mismatch.
pub fn zip_with(
    lhs: &Tensor,
    rhs: &Tensor,
    context: &'static str,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Tensor> {
    lhs.check_same_shape(rhs, context)?;
    let data = lhs
        .data()
        .iter()
        .zip(rhs.data())
        .map(|(&a, &b)| f(a, b))
        .collect();
    Tensor::from_vec(data, lhs.shape())
}

/// Apply `f` to every element, returning a new tensor of the same shape.
pub fn map(tensor: &Tensor, f: impl Fn(f64) -> f64) -> Tensor {
    let mut result = tensor.clone();
    for x in result.data_mut() {
        *x = f(*x);
    }
    result
}

/// Multiply all elements by a scalar, returning a new tensor.
///
/// # Example
///
/// ```
/// use paragraph::Tensor;
/// use paragraph::operations::scale;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// assert_eq!(scale(&t, 2.0).data(), &[2.0, 4.0, 6.0]);
/// ```
pub fn scale(tensor: &Tensor, alpha: f64) -> Tensor {
    map(tensor, |x| x * alpha)
}
