// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Matrix multiplication and transpose.

use crate::{Shape, Tensor, TensorError};

/// Performs matrix multiplication: `lhs @ rhs`.
///
/// Both inputs must be 2-D tensors with compatible inner dimensions:
/// `lhs` is `[M, K]`, `rhs` is `[K, N]`, and the result is `[M, N]`.
///
/// # Errors
/// Returns [`TensorError::DimensionMismatch`] if either operand is not a
/// matrix or the inner dimensions differ.
pub fn matmul(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    if !lhs.shape().is_matmul_compatible(rhs.shape()) {
        return Err(TensorError::DimensionMismatch {
            op: "matmul",
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        });
    }

    let (m, k) = (lhs.dims()[0], lhs.dims()[1]);
    let n = rhs.dims()[1];

    let mut c = vec![0.0f32; m * n];
    matmul_f32_generic(lhs.as_slice(), rhs.as_slice(), &mut c, m, k, n);

    Ok(Tensor::from_raw(Shape::matrix(m, n), c))
}

/// Returns the transpose of a matrix: `[M, N] -> [N, M]`.
///
/// # Errors
/// Returns [`TensorError::DimensionMismatch`] if `a` is not 2-D.
pub fn transpose(a: &Tensor) -> Result<Tensor, TensorError> {
    if a.rank() != 2 {
        return Err(TensorError::DimensionMismatch {
            op: "transpose",
            lhs: a.shape().clone(),
            rhs: Shape::scalar(),
        });
    }
    let (rows, cols) = (a.dims()[0], a.dims()[1]);
    let src = a.as_slice();
    let mut t = vec![0.0f32; rows * cols];
    for i in 0..cols {
        for j in 0..rows {
            t[i * rows + j] = src[j * cols + i];
        }
    }
    Ok(Tensor::from_raw(Shape::matrix(cols, rows), t))
}

/// Generic (portable) f32 matrix multiplication, accumulating into `c`.
///
/// `a` is `m x k`, `b` is `k x n` and `c` is `m x n`, all row-major; `c` must
/// be zeroed by the caller.
///
/// Uses a simple ikj loop order for better cache locality on the `b` matrix.
/// Not SIMD-optimised, but correct and reasonably cache-friendly.
pub(crate) fn matmul_f32_generic(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    // The inner loop is a saxpy on a row of C, sequential in memory.
    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let a_ip = a[i * k + p];
            let b_row = &b[p * n..(p + 1) * n];
            for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
}
