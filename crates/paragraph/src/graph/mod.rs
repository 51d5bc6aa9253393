//! Tensor dependency graphs.
//!
//! A [`GraphBuilder`] records variables (input placeholders) and operations
//! (a [`TensorFunction`](crate::TensorFunction) applied to earlier nodes), and
//! [`GraphBuilder::build_graph`] freezes them into a [`Graph`]. A graph answers
//! two queries for any node, given one input tensor per variable:
//!
//! - [`Graph::value`]: the node's tensor.
//! - [`Graph::partial_gradient`]: the node's tensor plus its exact Jacobian
//!   with respect to each requested variable, composed forward through the
//!   graph by tensor contraction.
//!
//! Both evaluate only the operations the output depends on, in ascending
//! index order, and drop each intermediate tensor as soon as its last reader
//! has consumed it.

mod builder;
mod evaluate;
mod gradient;
mod record;
mod traversal;

pub use builder::GraphBuilder;

use record::{OperationRecord, VariableRecord};

use crate::error::{GraphError, Result};
use crate::node::{Node, Operation, Variable};
use crate::tensor::SharedTensor;

/// An immutable, acyclic tensor dependency graph.
///
/// Evaluation takes `&self` and allocates its own scratch space, so a graph
/// can be shared across threads and queried concurrently.
#[derive(Debug, Clone)]
pub struct Graph {
    variables: Vec<VariableRecord>,
    operations: Vec<OperationRecord>,
}

impl Graph {
    pub(crate) fn from_records(
        variables: Vec<VariableRecord>,
        operations: Vec<OperationRecord>,
    ) -> Self {
        Self {
            variables,
            operations,
        }
    }

    /// Number of variables in the graph.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of operations in the graph.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Build the per-variable input vector from `(variable, tensor)` pairs.
    ///
    /// Variables not mentioned stay `None`. A variable given twice keeps the
    /// last tensor.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::VariableOutOfRange`] for a variable this graph
    /// does not have.
    pub fn create_variable_values(
        &self,
        values: impl IntoIterator<Item = (Variable, SharedTensor)>,
    ) -> Result<Vec<Option<SharedTensor>>> {
        let mut slots = vec![None; self.variables.len()];
        for (variable, tensor) in values {
            self.variable_record(variable)?;
            slots[variable.index()] = Some(tensor);
        }
        Ok(slots)
    }

    /// # Errors
    ///
    /// [`GraphError::VariableOutOfRange`] for an unknown variable.
    pub fn variable_name(&self, variable: Variable) -> Result<&str> {
        Ok(&self.variable_record(variable)?.name)
    }

    /// # Errors
    ///
    /// [`GraphError::OperationOutOfRange`] for an unknown operation.
    pub fn operation_name(&self, operation: Operation) -> Result<&str> {
        Ok(&self.operation_record(operation)?.name)
    }

    /// Find the first variable with the given name.
    ///
    /// # Errors
    ///
    /// [`GraphError::NameNotFound`] if no variable has that name.
    pub fn variable_by_name(&self, name: &str) -> Result<Variable> {
        self.variables
            .iter()
            .position(|record| record.name == name)
            .map(Variable::new)
            .ok_or_else(|| GraphError::NameNotFound {
                kind: "variable",
                name: name.to_string(),
            })
    }

    /// Find the first operation with the given name.
    ///
    /// # Errors
    ///
    /// [`GraphError::NameNotFound`] if no operation has that name.
    pub fn operation_by_name(&self, name: &str) -> Result<Operation> {
        self.operations
            .iter()
            .position(|record| record.name == name)
            .map(Operation::new)
            .ok_or_else(|| GraphError::NameNotFound {
                kind: "operation",
                name: name.to_string(),
            })
    }

    /// Inputs of `operation`, in argument order.
    pub fn dependencies(&self, operation: Operation) -> Result<&[Node]> {
        Ok(&self.operation_record(operation)?.dependencies)
    }

    /// Operations that read `node` directly, in ascending order.
    pub fn consumers(&self, node: impl Into<Node>) -> Result<&[Operation]> {
        match node.into() {
            Node::Variable(v) => Ok(&self.variable_record(v)?.consumers),
            Node::Operation(o) => Ok(&self.operation_record(o)?.consumers),
        }
    }

    /// The highest-indexed operation reading `node`, if any.
    pub fn most_recent_consumer(&self, node: impl Into<Node>) -> Result<Option<Operation>> {
        let index = match node.into() {
            Node::Variable(v) => self.variable_record(v)?.most_recent_consumer,
            Node::Operation(o) => self.operation_record(o)?.most_recent_consumer,
        };
        Ok(index.map(Operation::new))
    }

    fn variable_record(&self, variable: Variable) -> Result<&VariableRecord> {
        self.variables
            .get(variable.index())
            .ok_or(GraphError::VariableOutOfRange {
                index: variable.index(),
                count: self.variables.len(),
            })
    }

    fn operation_record(&self, operation: Operation) -> Result<&OperationRecord> {
        self.operations
            .get(operation.index())
            .ok_or(GraphError::OperationOutOfRange {
                index: operation.index(),
                count: self.operations.len(),
            })
    }
}

/// The tensor bound to `variable`, which must be set.
fn input(inputs: &[Option<SharedTensor>], variable: Variable) -> Result<&SharedTensor> {
    inputs
        .get(variable.index())
        .and_then(Option::as_ref)
        .ok_or(GraphError::MissingInput {
            index: variable.index(),
        })
}
