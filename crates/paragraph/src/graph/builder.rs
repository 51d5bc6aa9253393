//! Incremental graph construction.

use tracing::trace;

use super::Graph;
use super::record::{OperationRecord, VariableRecord};
use crate::error::{GraphError, Result};
use crate::function::SharedFunction;
use crate::node::{Node, Operation, Variable};

/// Accumulates variables and operations, then snapshots them into a [`Graph`].
///
/// Dependencies must already exist when an operation is added, so every
/// built graph is acyclic and its operation indices are a topological order.
///
/// # Examples
///
/// ```
/// use paragraph::{GraphBuilder, Tensor, functions};
///
/// let mut builder = GraphBuilder::new();
/// let a = builder.add_variable("a");
/// let b = builder.add_variable("b");
/// let sum = builder
///     .add_operation("sum", functions::add(), &[a.into(), b.into()])
///     .unwrap();
/// let graph = builder.build_graph();
///
/// let inputs = graph
///     .create_variable_values([
///         (a, Tensor::scalar(1.0).into_shared()),
///         (b, Tensor::scalar(2.0).into_shared()),
///     ])
///     .unwrap();
/// assert_eq!(*graph.value(sum, &inputs).unwrap(), Tensor::scalar(3.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    pub(super) variables: Vec<VariableRecord>,
    pub(super) operations: Vec<OperationRecord>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable. Names are labels only and need not be unique.
    pub fn add_variable(&mut self, name: impl Into<String>) -> Variable {
        let variable = Variable::new(self.variables.len());
        let name = name.into();
        trace!(index = variable.index(), name = %name, "add variable");
        self.variables.push(VariableRecord::new(name));
        variable
    }

    /// Append an operation applying `function` to `dependencies`, in
    /// argument order.
    ///
    /// The new operation becomes the most recent consumer of each
    /// dependency. A node listed twice is recorded as a consumer once.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if a dependency has not been added
    /// to this builder yet. Nothing is recorded in that case.
    pub fn add_operation(
        &mut self,
        name: impl Into<String>,
        function: SharedFunction,
        dependencies: &[Node],
    ) -> Result<Operation> {
        let name = name.into();
        for &node in dependencies {
            let exists = match node {
                Node::Variable(v) => v.index() < self.variables.len(),
                Node::Operation(o) => o.index() < self.operations.len(),
            };
            if !exists {
                return Err(GraphError::UnknownNode {
                    operation: name,
                    node,
                });
            }
        }

        let operation = Operation::new(self.operations.len());
        let index = operation.index();
        for &node in dependencies {
            let (consumers, most_recent) = match node {
                Node::Variable(v) => {
                    let record = &mut self.variables[v.index()];
                    (&mut record.consumers, &mut record.most_recent_consumer)
                }
                Node::Operation(o) => {
                    let record = &mut self.operations[o.index()];
                    (&mut record.consumers, &mut record.most_recent_consumer)
                }
            };
            if consumers.last() != Some(&operation) {
                consumers.push(operation);
            }
            *most_recent = Some(index);
        }

        trace!(
            index,
            name = %name,
            dependencies = dependencies.len(),
            "add operation"
        );
        self.operations.push(OperationRecord::new(
            name,
            function,
            dependencies.to_vec(),
        ));
        Ok(operation)
    }

    /// Number of variables added so far.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of operations added so far.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Snapshot the current records into an immutable graph.
    ///
    /// The builder stays usable. Later additions do not affect graphs that
    /// were already built.
    pub fn build_graph(&self) -> Graph {
        trace!(
            variables = self.variables.len(),
            operations = self.operations.len(),
            "build graph"
        );
        Graph::from_records(self.variables.clone(), self.operations.clone())
    }
}
