//! Forward-mode Jacobian composition.
//!
//! For an operation `f(D1, .., Dn)` and a moving variable `M`, the chain rule
//! reads
//!
//! ```text
//! ∂f/∂M = Σ_i contract(∂Di/∂M, ∂f/∂Di, rank(Di))
//! ```
//!
//! where `∂Di/∂M` is the identity when `Di` is `M` itself and zero when `Di`
//! is any other variable. Jacobians are laid out `M.shape ++ f.shape`, so
//! contracting over the trailing `rank(Di)` axes of the accumulated Jacobian
//! against the leading axes of the local one composes them directly.
//!
//! Operations that no moving variable reaches skip their function's
//! `gradient` entirely. Per moving variable, an operation it does not reach
//! keeps an implicit zero that is never allocated.

use tracing::{debug_span, trace};

use super::evaluate::evaluated;
use super::traversal::{consumer_operations, dependency_operations};
use super::{Graph, input};
use crate::contract::contract;
use crate::error::{GraphError, Result};
use crate::function::Derivative;
use crate::node::{Node, Operation, Variable};
use crate::operations::add;
use crate::tensor::{SharedTensor, Tensor};

/// Value of one operation and its Jacobian per moving variable. `None`
/// stands for a zero Jacobian.
struct Slot {
    value: SharedTensor,
    jacobians: Vec<Option<SharedTensor>>,
}

impl Graph {
    /// Evaluate `output` together with its Jacobian with respect to each of
    /// `moving`.
    ///
    /// `jacobians[i]` of the result has shape
    /// `moving[i].shape ++ output.shape`. Input slots must be set for every
    /// variable on the output's dependency path and for every moving
    /// variable.
    ///
    /// # Errors
    ///
    /// As [`Graph::value`], plus
    /// [`GraphError::VariableOutOfRange`] for an unknown moving variable and
    /// [`GraphError::ShapeMismatch`] / [`GraphError::ArityMismatch`] when a
    /// function returns Jacobians that do not fit its inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use paragraph::{GraphBuilder, Tensor, functions};
    ///
    /// // y = w * x for scalars
    /// let mut builder = GraphBuilder::new();
    /// let w = builder.add_variable("w");
    /// let x = builder.add_variable("x");
    /// let y = builder
    ///     .add_operation("y", functions::chain_multiplication(0), &[w.into(), x.into()])
    ///     .unwrap();
    /// let graph = builder.build_graph();
    ///
    /// let inputs = graph
    ///     .create_variable_values([
    ///         (w, Tensor::scalar(3.0).into_shared()),
    ///         (x, Tensor::scalar(5.0).into_shared()),
    ///     ])
    ///     .unwrap();
    /// let derivative = graph.partial_gradient(y, &[w, x], &inputs).unwrap();
    /// assert_eq!(*derivative.value, Tensor::scalar(15.0));
    /// assert_eq!(*derivative.jacobians[0], Tensor::scalar(5.0));
    /// assert_eq!(*derivative.jacobians[1], Tensor::scalar(3.0));
    /// ```
    pub fn partial_gradient(
        &self,
        output: impl Into<Node>,
        moving: &[Variable],
        inputs: &[Option<SharedTensor>],
    ) -> Result<Derivative> {
        let output = output.into();
        let _span = debug_span!("partial_gradient", output = %output, moving = moving.len())
            .entered();

        for &variable in moving {
            self.variable_record(variable)?;
        }

        match output {
            Node::Variable(v) => self.variable_gradient(v, moving, inputs),
            Node::Operation(o) => self.operation_gradient(o, moving, inputs),
        }
    }

    fn variable_gradient(
        &self,
        output: Variable,
        moving: &[Variable],
        inputs: &[Option<SharedTensor>],
    ) -> Result<Derivative> {
        self.variable_record(output)?;
        let value = input(inputs, output)?.clone();

        let jacobians = moving
            .iter()
            .map(|&variable| {
                let jacobian = if variable == output {
                    Tensor::identity_jacobian(value.shape())
                } else {
                    Tensor::zero_jacobian(value.shape(), input(inputs, variable)?.shape())
                };
                Ok(jacobian.into_shared())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Derivative { value, jacobians })
    }

    fn operation_gradient(
        &self,
        output: Operation,
        moving: &[Variable],
        inputs: &[Option<SharedTensor>],
    ) -> Result<Derivative> {
        self.operation_record(output)?;

        let reached: Vec<Vec<bool>> = moving
            .iter()
            .map(|v| consumer_operations(&self.variables[v.index()], &self.operations))
            .collect();
        let influenced: Vec<bool> = (0..self.operations.len())
            .map(|index| reached.iter().any(|r| r[index]))
            .collect();
        let needed = dependency_operations(&self.operations, output);

        let mut slots: Vec<Option<Slot>> = (0..self.operations.len()).map(|_| None).collect();

        for (index, record) in self.operations[..=output.index()].iter().enumerate() {
            if !needed[index] {
                continue;
            }

            let mut gathered = Vec::with_capacity(record.dependencies.len());
            for dependency in &record.dependencies {
                match *dependency {
                    Node::Variable(v) => gathered.push(input(inputs, v)?.clone()),
                    Node::Operation(d) => gathered.push(evaluated(&slots, d).value.clone()),
                }
            }

            let (value, local) = if influenced[index] {
                let Derivative { value, jacobians } = record.function.gradient(&gathered)?;
                if jacobians.len() != gathered.len() {
                    return Err(GraphError::ArityMismatch {
                        function: "TensorFunction::gradient",
                        expected: gathered.len(),
                        actual: jacobians.len(),
                    });
                }
                (value, Some(jacobians))
            } else {
                trace!(operation = index, "no moving variable reaches operation");
                (record.function.value(&gathered)?, None)
            };

            let mut jacobians = Vec::with_capacity(moving.len());
            for (m, &variable) in moving.iter().enumerate() {
                let Some(local) = local.as_ref().filter(|_| reached[m][index]) else {
                    jacobians.push(None);
                    continue;
                };

                let variable_shape = input(inputs, variable)?.shape();
                let mut accumulated = Tensor::zero_jacobian(value.shape(), variable_shape);
                for (dependency, partial) in record.dependencies.iter().zip(local) {
                    match *dependency {
                        Node::Variable(v) if v == variable => {
                            accumulated = add(&accumulated, partial)?;
                        }
                        Node::Variable(_) => {}
                        Node::Operation(d) => {
                            let slot = evaluated(&slots, d);
                            if let Some(upstream) = &slot.jacobians[m] {
                                let chained = contract(upstream, partial, slot.value.ndim())?;
                                accumulated = add(&accumulated, &chained)?;
                            }
                        }
                    }
                }
                jacobians.push(Some(accumulated.into_shared()));
            }

            self.release(index, &record.dependencies, &mut slots);
            slots[index] = Some(Slot { value, jacobians });
        }

        let Slot { value, jacobians } = evaluated(&slots, output);

        let jacobians = jacobians
            .iter()
            .zip(moving)
            .map(|(jacobian, &variable)| match jacobian {
                Some(jacobian) => Ok(jacobian.clone()),
                None => {
                    trace!(variable = variable.index(), "zero jacobian");
                    let variable_shape = input(inputs, variable)?.shape();
                    Ok(Tensor::zero_jacobian(value.shape(), variable_shape).into_shared())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Derivative {
            value: value.clone(),
            jacobians,
        })
    }
}
