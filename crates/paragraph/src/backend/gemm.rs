//! GEMM-based contraction using faer.
//!
//! Both operands are row-major, faer is column-major. Reading a row-major
//! `m x n` buffer as column-major gives its `n x m` transpose, so the kernel
//! computes `outᵀ = rhsᵀ · lhsᵀ` without copying anything.

use faer::linalg::matmul::matmul;
use faer::{Accum, MatMut, MatRef, Par};

use crate::backend::ContractionBackend;
use crate::contract::ContractionProperties;

/// GEMM backend backed by `faer::linalg::matmul`.
pub struct FaerBackend;

impl ContractionBackend for FaerBackend {
    fn contract_into(out: &mut [f64], lhs: &[f64], rhs: &[f64], props: &ContractionProperties) {
        let ContractionProperties {
            dleft, dmid, dright, ..
        } = *props;

        let lhs_t = MatRef::from_column_major_slice(lhs, dmid, dleft);
        let rhs_t = MatRef::from_column_major_slice(rhs, dright, dmid);
        let out_t = MatMut::from_column_major_slice_mut(out, dright, dleft);

        matmul(out_t, Accum::Replace, rhs_t, lhs_t, 1.0, Par::Seq);
    }
}
