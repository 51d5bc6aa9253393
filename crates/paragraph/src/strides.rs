//! Stride computation utilities.
//!
//! Uses row-major (C) order: the last axis varies fastest.

use crate::error::{GraphError, Result};

/// Compute row-major strides from shape.
///
/// For shape [d0, d1, d2], returns strides [d1*d2, d2, 1].
///
/// # Examples
///
/// ```
/// use paragraph::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![20, 5, 1]);
/// assert_eq!(compute_strides(&[2, 3]), vec![3, 1]);
/// assert_eq!(compute_strides(&[5]), vec![1]);
/// assert_eq!(compute_strides(&[]), Vec::<usize>::new());
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;

    for (slot, &dim) in strides.iter_mut().zip(shape.iter()).rev() {
        *slot = stride;
        stride *= dim;
    }

    strides
}

/// Convert a position to its offset in row-major storage.
///
/// # Errors
///
/// Returns [`GraphError::WrongNumberOfIndices`] if `position` and `shape`
/// have different lengths. Bounds are not checked here; see
/// [`Tensor::get`](crate::Tensor::get) for a checked accessor.
///
/// # Examples
///
/// ```
/// use paragraph::strides::compute_offset;
///
/// assert_eq!(compute_offset(&[2, 3], &[1, 2]).unwrap(), 5);
/// assert_eq!(compute_offset(&[], &[]).unwrap(), 0);
/// assert!(compute_offset(&[2, 3], &[1]).is_err());
/// ```
pub fn compute_offset(shape: &[usize], position: &[usize]) -> Result<usize> {
    if position.len() != shape.len() {
        return Err(GraphError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: position.len(),
        });
    }

    let mut skip = 1;
    let mut offset = 0;
    for (&idx, &dim) in position.iter().zip(shape.iter()).rev() {
        offset += idx * skip;
        skip *= dim;
    }
    Ok(offset)
}

/// Convert a row-major offset back to a position.
///
/// Exact inverse of [`compute_offset`] for in-range offsets.
pub fn compute_position(shape: &[usize], mut offset: usize) -> Vec<usize> {
    let mut position = vec![0; shape.len()];

    for (slot, &dim) in position.iter_mut().zip(shape.iter()).rev() {
        if dim == 0 {
            continue;
        }
        *slot = offset % dim;
        offset /= dim;
    }

    position
}

/// Product of a shape's extents (1 for a scalar shape).
#[inline]
pub fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_strides_3d() {
        assert_eq!(compute_strides(&[3, 4, 5]), vec![20, 5, 1]);
    }

    #[test]
    fn test_compute_strides_scalar() {
        assert!(compute_strides(&[]).is_empty());
    }

    #[test]
    fn test_compute_offset() {
        // For shape [3, 4, 5] with row-major:
        // index [i, j, k] -> 20*i + 5*j + k
        let shape = [3, 4, 5];
        assert_eq!(compute_offset(&shape, &[0, 0, 0]).unwrap(), 0);
        assert_eq!(compute_offset(&shape, &[0, 0, 1]).unwrap(), 1);
        assert_eq!(compute_offset(&shape, &[0, 1, 0]).unwrap(), 5);
        assert_eq!(compute_offset(&shape, &[1, 0, 0]).unwrap(), 20);
        assert_eq!(
            compute_offset(&shape, &[2, 3, 4]).unwrap(),
            2 * 20 + 3 * 5 + 4
        );
    }

    #[test]
    fn test_compute_offset_wrong_rank() {
        let err = compute_offset(&[3, 4], &[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            GraphError::WrongNumberOfIndices {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_compute_position() {
        let shape = [3, 4, 5];
        assert_eq!(compute_position(&shape, 0), vec![0, 0, 0]);
        assert_eq!(compute_position(&shape, 1), vec![0, 0, 1]);
        assert_eq!(compute_position(&shape, 5), vec![0, 1, 0]);
        assert_eq!(compute_position(&shape, 20), vec![1, 0, 0]);
        assert_eq!(compute_position(&shape, 59), vec![2, 3, 4]);
    }

    #[test]
    fn test_roundtrip() {
        for shape in [vec![3, 4, 5], vec![7], vec![1, 1, 2], vec![2, 1, 3, 2]] {
            let total = num_elements(&shape);
            for offset in 0..total {
                let position = compute_position(&shape, offset);
                assert_eq!(compute_offset(&shape, &position).unwrap(), offset);
            }
        }
    }

    #[test]
    fn test_offsets_follow_strides() {
        let shape = [2, 3, 4];
        let strides = compute_strides(&shape);
        for offset in 0..num_elements(&shape) {
            let position = compute_position(&shape, offset);
            let by_strides: usize = position.iter().zip(&strides).map(|(p, s)| p * s).sum();
            assert_eq!(by_strides, offset);
        }
    }
}
