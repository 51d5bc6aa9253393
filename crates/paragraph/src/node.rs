//! Identities of graph nodes.
//!
//! A node is a (kind, dense index) pair. Indices are assigned in creation
//! order per kind and double as direct indices into the graph's record
//! vectors, so resolving a node is a plain `Vec` access.

use std::fmt;

/// A graph leaf: a placeholder for an input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(usize);

impl Variable {
    /// Create a variable handle from its index.
    ///
    /// Handles are normally obtained from a
    /// [`GraphBuilder`](crate::GraphBuilder); constructing one by hand is
    /// only meaningful for an index the builder has already handed out.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An internal node: a tensor function applied to earlier nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Operation(usize);

impl Operation {
    /// Create an operation handle from its index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Either a [`Variable`] or an [`Operation`].
///
/// Ordering places every variable before every operation, then orders by
/// index within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    Variable(Variable),
    Operation(Operation),
}

impl Node {
    /// Index within the node's own kind.
    pub fn index(&self) -> usize {
        match self {
            Node::Variable(v) => v.index(),
            Node::Operation(o) => o.index(),
        }
    }

    /// Check if this is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable(_))
    }

    /// Check if this is an operation.
    pub fn is_operation(&self) -> bool {
        matches!(self, Node::Operation(_))
    }
}

impl From<Variable> for Node {
    fn from(v: Variable) -> Self {
        Node::Variable(v)
    }
}

impl From<Operation> for Node {
    fn from(o: Operation) -> Self {
        Node::Operation(o)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Variable(v) => write!(f, "variable #{}", v.index()),
            Node::Operation(o) => write!(f, "operation #{}", o.index()),
        }
    }
}
