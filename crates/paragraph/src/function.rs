//! The differentiable-function capability every operation plugs in through.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::tensor::SharedTensor;

/// Value of a function together with its Jacobians.
///
/// `jacobians` is aligned either to the function's own inputs (when returned
/// by [`TensorFunction::gradient`]) or to the moving variables of a
/// [`Graph::partial_gradient`](crate::Graph::partial_gradient) request.
#[derive(Debug, Clone)]
pub struct Derivative {
    pub value: SharedTensor,
    pub jacobians: Vec<SharedTensor>,
}

/// A function from a sequence of tensors to a single tensor, with its
/// first derivatives.
///
/// Implementations must be stateless with respect to evaluation: the graph
/// shares one instance across every operation that uses it and across
/// concurrent evaluations.
pub trait TensorFunction: Debug + Send + Sync {
    /// Compute the function's value.
    fn value(&self, inputs: &[SharedTensor]) -> Result<SharedTensor>;

    /// Compute the value and the Jacobian with respect to each input.
    ///
    /// `value` must equal what [`value`](Self::value) returns for the same
    /// inputs, and `jacobians[i]` must have shape
    /// `inputs[i].shape() ++ value.shape()`.
    fn gradient(&self, inputs: &[SharedTensor]) -> Result<Derivative>;
}

/// A tensor function shared between graphs and operations.
pub type SharedFunction = Arc<dyn TensorFunction>;

/// Fail with [`GraphError::ArityMismatch`] unless exactly `expected` inputs arrived.
pub fn check_arity(function: &'static str, inputs: &[SharedTensor], expected: usize) -> Result<()> {
    if inputs.len() != expected {
        return Err(GraphError::ArityMismatch {
            function,
            expected,
            actual: inputs.len(),
        });
    }
    Ok(())
}
