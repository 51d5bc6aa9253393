//! A [`GraphBuilder`] with one method per built-in function.
//!
//! Operations are named `"<kind>_<n>"`, where `n` counts operations added
//! through the kind-specific methods, starting at 1.
//!
//! # Examples
//!
//! ```
//! use paragraph::{MlGraphBuilder, Tensor};
//!
//! // y = sigmoid(w · x + b)
//! let mut builder = MlGraphBuilder::new();
//! let w = builder.add_variable("w");
//! let x = builder.add_variable("x");
//! let b = builder.add_variable("b");
//! let wx = builder.chain_multiplication(w, x, 1).unwrap();
//! let z = builder.add(wx, b).unwrap();
//! let y = builder.sigmoid(z).unwrap();
//! let graph = builder.build_graph();
//!
//! assert_eq!(graph.operation_name(y).unwrap(), "sigmoid_3");
//!
//! let inputs = graph
//!     .create_variable_values([
//!         (w, Tensor::from_vec(vec![1.0, -1.0], &[1, 2]).unwrap().into_shared()),
//!         (x, Tensor::from_vec(vec![2.0, 2.0], &[2]).unwrap().into_shared()),
//!         (b, Tensor::from_vec(vec![0.0], &[1]).unwrap().into_shared()),
//!     ])
//!     .unwrap();
//! assert_eq!(graph.value(y, &inputs).unwrap().data(), &[0.5]);
//! ```

use crate::error::Result;
use crate::function::SharedFunction;
use crate::functions;
use crate::graph::{Graph, GraphBuilder};
use crate::node::{Node, Operation, Variable};

/// Graph builder that names operations after their function.
#[derive(Debug, Clone, Default)]
pub struct MlGraphBuilder {
    builder: GraphBuilder,
    counter: usize,
}

impl MlGraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable, as [`GraphBuilder::add_variable`].
    pub fn add_variable(&mut self, name: impl Into<String>) -> Variable {
        self.builder.add_variable(name)
    }

    /// Add an operation with an explicit name, as
    /// [`GraphBuilder::add_operation`]. Does not advance the name counter.
    pub fn add_operation(
        &mut self,
        name: impl Into<String>,
        function: SharedFunction,
        dependencies: &[Node],
    ) -> Result<Operation> {
        self.builder.add_operation(name, function, dependencies)
    }

    /// `lhs + rhs`.
    pub fn add(&mut self, lhs: impl Into<Node>, rhs: impl Into<Node>) -> Result<Operation> {
        self.named("add", functions::add(), &[lhs.into(), rhs.into()])
    }

    /// `contract(lhs, rhs, common)`.
    pub fn chain_multiplication(
        &mut self,
        lhs: impl Into<Node>,
        rhs: impl Into<Node>,
        common: usize,
    ) -> Result<Operation> {
        self.named(
            "chain_multiplication",
            functions::chain_multiplication(common),
            &[lhs.into(), rhs.into()],
        )
    }

    /// Element-wise logistic sigmoid.
    pub fn sigmoid(&mut self, node: impl Into<Node>) -> Result<Operation> {
        self.named("sigmoid", functions::sigmoid(), &[node.into()])
    }

    /// Sum over `axis`, which is removed from the shape.
    pub fn reduce_sum(&mut self, node: impl Into<Node>, axis: usize) -> Result<Operation> {
        self.named("reduce_sum", functions::reduce_sum(axis), &[node.into()])
    }

    /// Element-wise natural logarithm.
    pub fn log(&mut self, node: impl Into<Node>) -> Result<Operation> {
        self.named("log", functions::log(), &[node.into()])
    }

    /// `lhs ⊙ rhs`.
    pub fn element_wise_multiplication(
        &mut self,
        lhs: impl Into<Node>,
        rhs: impl Into<Node>,
    ) -> Result<Operation> {
        self.named(
            "element_wise_multiplication",
            functions::element_wise_multiplication(),
            &[lhs.into(), rhs.into()],
        )
    }

    /// `-node`.
    pub fn negative(&mut self, node: impl Into<Node>) -> Result<Operation> {
        self.named("negative", functions::negative(), &[node.into()])
    }

    /// Softmax over all elements.
    pub fn softmax(&mut self, node: impl Into<Node>) -> Result<Operation> {
        self.named("softmax", functions::softmax(), &[node.into()])
    }

    /// Snapshot into a [`Graph`]; see [`GraphBuilder::build_graph`].
    pub fn build_graph(&self) -> Graph {
        self.builder.build_graph()
    }

    fn named(
        &mut self,
        kind: &str,
        function: SharedFunction,
        dependencies: &[Node],
    ) -> Result<Operation> {
        let name = format!("{kind}_{}", self.counter + 1);
        let operation = self.builder.add_operation(name, function, dependencies)?;
        self.counter += 1;
        Ok(operation)
    }
}
