//! Reachability over operation records.
//!
//! Both walks use an explicit stack and return a dense membership vector
//! indexed by operation, so deep chains cannot overflow the call stack and
//! membership tests during evaluation are a single index.

use super::record::{OperationRecord, VariableRecord};
use crate::node::{Node, Operation};

/// Operations `top` depends on, transitively, including `top` itself.
pub(crate) fn dependency_operations(operations: &[OperationRecord], top: Operation) -> Vec<bool> {
    let mut visited = vec![false; operations.len()];
    let mut stack = vec![top.index()];

    while let Some(index) = stack.pop() {
        if visited[index] {
            continue;
        }
        visited[index] = true;
        for dependency in &operations[index].dependencies {
            if let Node::Operation(o) = *dependency {
                if !visited[o.index()] {
                    stack.push(o.index());
                }
            }
        }
    }

    visited
}

/// Operations that read `variable`, transitively.
pub(crate) fn consumer_operations(
    variable: &VariableRecord,
    operations: &[OperationRecord],
) -> Vec<bool> {
    let mut visited = vec![false; operations.len()];
    let mut stack: Vec<usize> = variable.consumers.iter().map(Operation::index).collect();

    while let Some(index) = stack.pop() {
        if visited[index] {
            continue;
        }
        visited[index] = true;
        for consumer in &operations[index].consumers {
            if !visited[consumer.index()] {
                stack.push(consumer.index());
            }
        }
    }

    visited
}
