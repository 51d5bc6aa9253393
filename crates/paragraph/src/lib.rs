//! paragraph - tensor dependency graphs with exact forward-mode Jacobians
//!
//! A graph is a DAG whose leaves are variables (input placeholders) and whose
//! internal nodes are operations, each applying a differentiable
//! [`TensorFunction`] to earlier nodes. For any node the graph computes its
//! value and its Jacobian with respect to any subset of the variables.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Graph API (graph, ml modules)
//!     → GraphBuilder / MlGraphBuilder → Graph
//!     → Graph::value, Graph::partial_gradient
//!
//! Level 2: Functions (function, functions modules)
//!     → TensorFunction trait, built-in add / chain_multiplication / ...
//!
//! Level 3: Tensor algebra (tensor, operations, contract modules)
//!     → row-major f64 tensors, element-wise ops, contraction
//!
//! Level 4: Contraction backends (backend module)
//!     → GenericBackend (naive loops)
//!     → FaerBackend (GEMM, `faer` feature)
//! ```
//!
//! A Jacobian of a function with shape `F` with respect to a variable with
//! shape `V` has shape `V ++ F`.
//!
//! # Example
//!
//! ```
//! use paragraph::{GraphBuilder, Tensor, functions};
//!
//! // y = w · x + b
//! let mut builder = GraphBuilder::new();
//! let w = builder.add_variable("w");
//! let x = builder.add_variable("x");
//! let b = builder.add_variable("b");
//! let wx = builder
//!     .add_operation("wx", functions::chain_multiplication(1), &[w.into(), x.into()])
//!     .unwrap();
//! let y = builder
//!     .add_operation("y", functions::add(), &[wx.into(), b.into()])
//!     .unwrap();
//! let graph = builder.build_graph();
//!
//! let inputs = graph
//!     .create_variable_values([
//!         (w, Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap().into_shared()),
//!         (x, Tensor::from_vec(vec![1.0, 1.0], &[2]).unwrap().into_shared()),
//!         (b, Tensor::from_vec(vec![0.5, -0.5], &[2]).unwrap().into_shared()),
//!     ])
//!     .unwrap();
//!
//! let derivative = graph.partial_gradient(y, &[x], &inputs).unwrap();
//! assert_eq!(derivative.value.data(), &[3.5, 6.5]);
//!
//! // dy/dx[k, i] = w[i, k]
//! assert_eq!(derivative.jacobians[0].shape(), &[2, 2]);
//! assert_eq!(derivative.jacobians[0].data(), &[1.0, 3.0, 2.0, 4.0]);
//! ```

pub mod backend;
pub mod contract;
pub mod error;
pub mod function;
pub mod functions;
pub mod graph;
pub mod ml;
pub mod node;
pub mod operations;
pub mod random;
pub mod strides;
pub mod tensor;

pub use contract::contract;
pub use error::{GraphError, Result};
pub use function::{Derivative, SharedFunction, TensorFunction};
pub use graph::{Graph, GraphBuilder};
pub use ml::MlGraphBuilder;
pub use node::{Node, Operation, Variable};
pub use tensor::{Shape, SharedTensor, Tensor};
