//! Dense row-major tensor type.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{GraphError, Result};
use crate::strides::{compute_offset, compute_position, num_elements};

/// Inline storage for tensor shapes; most tensors and Jacobians have rank <= 6.
pub type Shape = SmallVec<[usize; 6]>;

/// A tensor that may be read by many consumers at once.
///
/// The graph hands tensors around as `SharedTensor` so that an operation's
/// output is never copied for each consumer, and so that releasing a slot is
/// just dropping one strong reference.
pub type SharedTensor = Arc<Tensor>;

/// A dense n-dimensional array of `f64` in row-major order.
///
/// An empty shape denotes a scalar holding exactly one element.
///
/// # Example
///
/// ```
/// use paragraph::Tensor;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// assert_eq!(t.shape(), &[2, 3]);
/// assert_eq!(t.get(&[0, 1]), Some(&2.0)); // row-major: [0,1] is the second element
/// assert_eq!(t.get(&[1, 0]), Some(&4.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f64>,
}

impl Tensor {
    /// Create a tensor from row-major data and a shape.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DataLengthMismatch`] if `data.len()` is not the
    /// product of `shape`.
    pub fn from_vec(data: Vec<f64>, shape: &[usize]) -> Result<Self> {
        let expected = num_elements(shape);
        if data.len() != expected {
            return Err(GraphError::DataLengthMismatch {
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

    /// Create a rank-0 tensor.
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Shape::new(),
            data: vec![value],
        }
    }

    /// Create a zero tensor.
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            shape: Shape::from_slice(shape),
            data: vec![0.0; num_elements(shape)],
        }
    }

    /// Create a tensor by evaluating `f` at every position, in row-major order.
    pub fn from_fn(shape: &[usize], mut f: impl FnMut(&[usize]) -> f64) -> Self {
        let data = (0..num_elements(shape))
            .map(|offset| f(&compute_position(shape, offset)))
            .collect();
        Self {
            shape: Shape::from_slice(shape),
            data,
        }
    }

    /// Zero Jacobian of a function with shape `function_shape` with respect to
    /// a variable with shape `variable_shape`.
    ///
    /// The result has shape `variable_shape ++ function_shape`. Variable axes
    /// come first everywhere in this crate; contraction-based chain rules rely
    /// on it.
    ///
    /// ```
    /// use paragraph::Tensor;
    ///
    /// let j = Tensor::zero_jacobian(&[4], &[2, 3]);
    /// assert_eq!(j.shape(), &[2, 3, 4]);
    /// ```
    pub fn zero_jacobian(function_shape: &[usize], variable_shape: &[usize]) -> Self {
        let mut shape = Shape::with_capacity(variable_shape.len() + function_shape.len());
        shape.extend_from_slice(variable_shape);
        shape.extend_from_slice(function_shape);
        Self::zeros(&shape)
    }

    /// Jacobian of the identity function on tensors of shape `shape`.
    ///
    /// A generalised identity matrix of shape `shape ++ shape`: 1.0 wherever
    /// the variable position equals the function position.
    ///
    /// ```
    /// use paragraph::Tensor;
    ///
    /// let id = Tensor::identity_jacobian(&[2]);
    /// assert_eq!(id.data(), &[1.0, 0.0, 0.0, 1.0]);
    /// ```
    pub fn identity_jacobian(shape: &[usize]) -> Self {
        let mut result = Self::zero_jacobian(shape, shape);
        let n = num_elements(shape);
        for i in 0..n {
            result.data[i * (n + 1)] = 1.0;
        }
        result
    }

    /// Get the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the rank (number of axes).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor has zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get underlying data as slice.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get underlying data as mutable slice.
    ///
    /// Only reachable for owned tensors; once wrapped in a [`SharedTensor`]
    /// the data is read-only.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the tensor and return its data.
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Wrap into a [`SharedTensor`].
    pub fn into_shared(self) -> SharedTensor {
        Arc::new(self)
    }

    /// Get element by linear index.
    #[inline]
    pub fn get_linear(&self, i: usize) -> Option<&f64> {
        self.data.get(i)
    }

    /// Get element by position.
    ///
    /// Returns `None` if the position has the wrong rank or is out of bounds.
    pub fn get(&self, position: &[usize]) -> Option<&f64> {
        if position.len() != self.ndim() {
            return None;
        }
        if position.iter().zip(self.shape.iter()).any(|(&i, &d)| i >= d) {
            return None;
        }
        let offset = compute_offset(&self.shape, position).ok()?;
        self.data.get(offset)
    }

    /// Set element by position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position has the wrong rank or is out of bounds.
    pub fn set(&mut self, position: &[usize], value: f64) -> Result<()> {
        let offset = self.compute_offset(position)?;
        for (axis, (&index, &size)) in position.iter().zip(self.shape.iter()).enumerate() {
            if index >= size {
                return Err(GraphError::IndexOutOfBounds { index, axis, size });
            }
        }
        self.data[offset] = value;
        Ok(())
    }

    /// Row-major offset of `position` within this tensor's data.
    pub fn compute_offset(&self, position: &[usize]) -> Result<usize> {
        compute_offset(&self.shape, position)
    }

    /// Position of the element stored at `offset`.
    pub fn compute_position(&self, offset: usize) -> Vec<usize> {
        compute_position(&self.shape, offset)
    }

    /// Ensure `other` has the same shape, reporting `context` otherwise.
    pub(crate) fn check_same_shape(&self, other: &Tensor, context: &'static str) -> Result<()> {
        if self.shape != other.shape {
            return Err(GraphError::ShapeMismatch {
                context,
                lhs: self.shape.to_vec(),
                rhs: other.shape.to_vec(),
            });
        }
        Ok(())
    }
}
