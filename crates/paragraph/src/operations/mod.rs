//! Elementwise tensor operations.
//!
//! Every operation returns a new tensor; inputs are never modified.

mod elementwise;

pub use elementwise::{add, map, scale, zip_with};
