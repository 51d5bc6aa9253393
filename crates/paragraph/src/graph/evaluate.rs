//! Value evaluation.

use tracing::{debug_span, trace};

use super::traversal::dependency_operations;
use super::{Graph, input};
use crate::error::Result;
use crate::node::{Node, Operation};
use crate::tensor::SharedTensor;

impl Graph {
    /// Evaluate `output` given one input slot per variable.
    ///
    /// Only the operations `output` depends on are run, and only the input
    /// slots of variables on that path are read; the rest may be `None`.
    /// Intermediate tensors are dropped as soon as their last reader has
    /// gathered them.
    ///
    /// # Errors
    ///
    /// - [`GraphError::VariableOutOfRange`](crate::GraphError::VariableOutOfRange)
    ///   or [`GraphError::OperationOutOfRange`](crate::GraphError::OperationOutOfRange)
    ///   if `output` is not part of this graph.
    /// - [`GraphError::MissingInput`](crate::GraphError::MissingInput) if a
    ///   variable on the path has no tensor.
    /// - Any error raised by an operation's function.
    pub fn value(
        &self,
        output: impl Into<Node>,
        inputs: &[Option<SharedTensor>],
    ) -> Result<SharedTensor> {
        let output = output.into();
        let _span = debug_span!("value", output = %output).entered();

        match output {
            Node::Variable(v) => {
                self.variable_record(v)?;
                Ok(input(inputs, v)?.clone())
            }
            Node::Operation(o) => self.evaluate_operation(o, inputs),
        }
    }

    fn evaluate_operation(
        &self,
        output: Operation,
        inputs: &[Option<SharedTensor>],
    ) -> Result<SharedTensor> {
        self.operation_record(output)?;
        let needed = dependency_operations(&self.operations, output);
        let mut scratch: Vec<Option<SharedTensor>> = vec![None; self.operations.len()];

        // Nothing above `output` can be one of its dependencies.
        for (index, record) in self.operations[..=output.index()].iter().enumerate() {
            if !needed[index] {
                continue;
            }

            let mut gathered = Vec::with_capacity(record.dependencies.len());
            for dependency in &record.dependencies {
                match *dependency {
                    Node::Variable(v) => gathered.push(input(inputs, v)?.clone()),
                    Node::Operation(d) => gathered.push(evaluated(&scratch, d).clone()),
                }
            }
            self.release(index, &record.dependencies, &mut scratch);

            scratch[index] = Some(record.function.value(&gathered)?);
        }

        Ok(evaluated(&scratch, output).clone())
    }

    /// Clear the slots of operation dependencies whose last reader is `index`.
    pub(super) fn release<T>(
        &self,
        index: usize,
        dependencies: &[Node],
        slots: &mut [Option<T>],
    ) {
        for dependency in dependencies {
            if let Node::Operation(d) = *dependency {
                let last_reader = self.operations[d.index()].is_released_by(index);
                if last_reader && slots[d.index()].is_some() {
                    trace!(operation = d.index(), reader = index, "release");
                    slots[d.index()] = None;
                }
            }
        }
    }
}

/// The slot of an operation that has run and whose last reader has not.
///
/// Operations run in ascending order and a slot is cleared only by its
/// highest-index consumer, so every read made by a consumer finds it set.
pub(super) fn evaluated<T>(slots: &[Option<T>], operation: Operation) -> &T {
    slots[operation.index()]
        .as_ref()
        .expect("operation is evaluated before its consumers and released after them")
}

#[cfg(test)]
mod tests {
    use crate::error::GraphError;
    use crate::functions;
    use crate::graph::GraphBuilder;
    use crate::node::{Operation, Variable};
    use crate::tensor::{SharedTensor, Tensor};

    #[test]
    fn test_variable_output_returns_input() {
        let mut builder = GraphBuilder::new();
        let x = builder.add_variable("x");
        let graph = builder.build_graph();

        let t = Tensor::scalar(2.5).into_shared();
        let inputs = graph.create_variable_values([(x, t.clone())]).unwrap();
        let out = graph.value(x, &inputs).unwrap();
        assert!(std::sync::Arc::ptr_eq(&out, &t));
    }

    #[test]
    fn test_unused_inputs_may_be_unset() {
        let mut builder = GraphBuilder::new();
        let x = builder.add_variable("x");
        let unused = builder.add_variable("unused");
        let neg = builder
            .add_operation("neg", functions::negative(), &[x.into()])
            .unwrap();
        builder
            .add_operation("other", functions::negative(), &[unused.into()])
            .unwrap();
        let graph = builder.build_graph();

        let inputs = graph
            .create_variable_values([(x, Tensor::scalar(3.0).into_shared())])
            .unwrap();
        assert_eq!(*graph.value(neg, &inputs).unwrap(), Tensor::scalar(-3.0));
    }

    #[test]
    fn test_missing_input_on_path() {
        let mut builder = GraphBuilder::new();
        let x = builder.add_variable("x");
        let neg = builder
            .add_operation("neg", functions::negative(), &[x.into()])
            .unwrap();
        let graph = builder.build_graph();

        let inputs: Vec<Option<SharedTensor>> = vec![None];
        assert_eq!(
            graph.value(neg, &inputs).unwrap_err(),
            GraphError::MissingInput { index: 0 }
        );
        assert_eq!(
            graph.value(neg, &[]).unwrap_err(),
            GraphError::MissingInput { index: 0 }
        );
    }

    #[test]
    fn test_out_of_range_output() {
        let graph = GraphBuilder::new().build_graph();
        assert_eq!(
            graph.value(Operation::new(0), &[]).unwrap_err(),
            GraphError::OperationOutOfRange { index: 0, count: 0 }
        );
        assert_eq!(
            graph.value(Variable::new(1), &[]).unwrap_err(),
            GraphError::VariableOutOfRange { index: 1, count: 0 }
        );
    }

    #[test]
    fn test_shared_intermediate_read_twice() {
        // y = -x; z = y * y; w = z + y
        let mut builder = GraphBuilder::new();
        let x = builder.add_variable("x");
        let y = builder
            .add_operation("y", functions::negative(), &[x.into()])
            .unwrap();
        let z = builder
            .add_operation(
                "z",
                functions::element_wise_multiplication(),
                &[y.into(), y.into()],
            )
            .unwrap();
        let w = builder
            .add_operation("w", functions::add(), &[z.into(), y.into()])
            .unwrap();
        let graph = builder.build_graph();

        let x_value = Tensor::from_vec(vec![2.0, -1.0], &[2]).unwrap();
        let inputs = graph
            .create_variable_values([(x, x_value.into_shared())])
            .unwrap();
        assert_eq!(graph.value(z, &inputs).unwrap().data(), &[4.0, 1.0]);
        assert_eq!(graph.value(w, &inputs).unwrap().data(), &[2.0, 2.0]);
    }

    #[test]
    fn test_function_error_propagates() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_variable("a");
        let b = builder.add_variable("b");
        let sum = builder
            .add_operation("sum", functions::add(), &[a.into(), b.into()])
            .unwrap();
        let graph = builder.build_graph();

        let inputs = graph
            .create_variable_values([
                (a, Tensor::zeros(&[2]).into_shared()),
                (b, Tensor::zeros(&[3]).into_shared()),
            ])
            .unwrap();
        assert!(matches!(
            graph.value(sum, &inputs),
            Err(GraphError::ShapeMismatch { .. })
        ));
    }
}
