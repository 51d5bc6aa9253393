//! Error types for paragraph.

use thiserror::Error;

use crate::node::Node;

/// Errors raised when a caller violates the contract of a tensor or graph
/// operation.
///
/// Every variant is a deterministic programming error: retrying the same call
/// fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two tensors were expected to have the same shape.
    #[error("shape mismatch in {context}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        context: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    /// Data length does not match the product of the shape.
    #[error("data length mismatch: shape {shape:?} needs {expected} elements, got {actual}")]
    DataLengthMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Index out of bounds.
    #[error("index {index} out of bounds for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    /// Contraction asked for more common axes than an operand has.
    #[error("cannot contract {common} axes of tensors with ranks {lhs_rank} and {rhs_rank}")]
    ContractionRankTooLarge {
        common: usize,
        lhs_rank: usize,
        rhs_rank: usize,
    },

    /// Contracted axes do not pair up.
    #[error(
        "contracted axes do not match: trailing {lhs:?} of lhs vs leading {rhs:?} of rhs"
    )]
    ContractionShapeMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    /// A tensor function received the wrong number of inputs.
    #[error("{function} expects {expected} input(s), got {actual}")]
    ArityMismatch {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Reduction axis outside the input's rank.
    #[error("cannot reduce a rank-{rank} tensor along axis {axis}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Variable index outside the graph.
    #[error("variable index {index} out of range, graph has {count} variable(s)")]
    VariableOutOfRange { index: usize, count: usize },

    /// Operation index outside the graph.
    #[error("operation index {index} out of range, graph has {count} operation(s)")]
    OperationOutOfRange { index: usize, count: usize },

    /// An operation depends on a node that has not been created yet.
    #[error("dependency {node} of operation '{operation}' does not exist yet")]
    UnknownNode { operation: String, node: Node },

    /// Evaluation reached a variable whose input slot was left unset.
    #[error("no input value supplied for variable {index}")]
    MissingInput { index: usize },

    /// Name lookup found nothing.
    #[error("could not find {kind} with name '{name}'")]
    NameNotFound { kind: &'static str, name: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
