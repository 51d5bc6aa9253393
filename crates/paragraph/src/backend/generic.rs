//! Loop backend for contraction.

use crate::backend::ContractionBackend;
use crate::contract::ContractionProperties;

/// Row-by-row accumulation with plain loops.
///
/// Always available. [`contract`](crate::contract) uses it below the GEMM
/// work threshold and whenever the `faer` feature is off.
pub struct GenericBackend;

impl ContractionBackend for GenericBackend {
    fn contract_into(out: &mut [f64], lhs: &[f64], rhs: &[f64], props: &ContractionProperties) {
        let ContractionProperties {
            dleft, dmid, dright, ..
        } = *props;

        for l in 0..dleft {
            let out_row = &mut out[l * dright..(l + 1) * dright];
            for c in 0..dmid {
                let a = lhs[l * dmid + c];
                let rhs_row = &rhs[c * dright..(c + 1) * dright];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
    }
}
