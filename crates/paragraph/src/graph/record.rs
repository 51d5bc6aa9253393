//! Per-node bookkeeping shared by the builder and the built graph.

use crate::function::SharedFunction;
use crate::node::{Node, Operation};

#[derive(Debug, Clone)]
pub(crate) struct VariableRecord {
    pub(crate) name: String,
    pub(crate) consumers: Vec<Operation>,
    /// Highest operation index reading this variable.
    pub(crate) most_recent_consumer: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct OperationRecord {
    pub(crate) name: String,
    pub(crate) function: SharedFunction,
    /// Inputs in argument order.
    pub(crate) dependencies: Vec<Node>,
    pub(crate) consumers: Vec<Operation>,
    /// Highest operation index reading this operation's value. Once that
    /// operation has gathered its inputs the value can be dropped.
    pub(crate) most_recent_consumer: Option<usize>,
}

impl VariableRecord {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            consumers: Vec::new(),
            most_recent_consumer: None,
        }
    }
}

impl OperationRecord {
    pub(crate) fn new(name: String, function: SharedFunction, dependencies: Vec<Node>) -> Self {
        Self {
            name,
            function,
            dependencies,
            consumers: Vec::new(),
            most_recent_consumer: None,
        }
    }

    /// Whether operation `index` is the last reader of this record's value.
    #[inline]
    pub(crate) fn is_released_by(&self, index: usize) -> bool {
        self.most_recent_consumer == Some(index)
    }
}
