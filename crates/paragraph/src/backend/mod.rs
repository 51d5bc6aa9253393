//! Backend abstraction for tensor contraction.
//!
//! A backend computes the flattened product `out[l, r] = Σ_c lhs[l, c] * rhs[c, r]`
//! once [`contract`](crate::contract) has validated shapes and collapsed the
//! operands into `(dleft, dmid)` and `(dmid, dright)` row-major matrices.
//!
//! # Backends
//!
//! - `GenericBackend`: Naive loop-based implementation (always available)
//! - `FaerBackend`: GEMM through faer (cargo feature `faer`, on by default)

#[cfg(feature = "faer")]
mod gemm;
mod generic;

#[cfg(feature = "faer")]
pub use gemm::FaerBackend;
pub use generic::GenericBackend;

use crate::contract::ContractionProperties;

/// Strategy for the dense kernel behind [`contract`](crate::contract).
pub trait ContractionBackend {
    /// Write the contraction of `lhs` and `rhs` into `out`.
    ///
    /// `lhs.len() == props.dleft * props.dmid`,
    /// `rhs.len() == props.dmid * props.dright` and
    /// `out.len() == props.dleft * props.dright` are guaranteed by the caller;
    /// `out` arrives zero-filled.
    fn contract_into(out: &mut [f64], lhs: &[f64], rhs: &[f64], props: &ContractionProperties);
}
