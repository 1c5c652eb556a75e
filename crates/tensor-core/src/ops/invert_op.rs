// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Matrix inversion by Gauss-Jordan elimination, and least-squares solve.

use super::{matmul, transpose};
use crate::{Shape, Tensor, TensorError};

/// Inverts a square matrix using Gauss-Jordan elimination with partial
/// pivoting on the augmented matrix `[M | I]`.
///
/// Arithmetic is single precision with no iterative refinement, so badly
/// conditioned inputs lose accuracy.
///
/// # Errors
/// Returns [`TensorError::DimensionMismatch`] if `m` is not a square matrix,
/// and [`TensorError::SingularMatrix`] if a pivot column has no non-zero
/// candidate.
pub fn invert(m: &Tensor) -> Result<Tensor, TensorError> {
    if m.rank() != 2 || m.dims()[0] != m.dims()[1] {
        return Err(TensorError::DimensionMismatch {
            op: "invert",
            lhs: m.shape().clone(),
            rhs: m.shape().clone(),
        });
    }
    let n = m.dims()[0];
    let width = 2 * n;
    let mut aug = augment(m.as_slice(), n);

    for k in 0..n {
        let (pivot_row, pivot_abs) = (k..n)
            .map(|i| (i, aug[i * width + k].abs()))
            .fold((k, 0.0f32), |best, cand| if cand.1 > best.1 { cand } else { best });
        if pivot_abs == 0.0 {
            tracing::debug!(column = k, size = n, "singular matrix");
            return Err(TensorError::SingularMatrix { column: k });
        }
        swap_rows(&mut aug, width, k, pivot_row);

        let pivot = aug[k * width + k];
        aug[k * width + k] = 1.0;
        for x in &mut aug[k * width + k + 1..(k + 1) * width] {
            *x /= pivot;
        }

        for i in k + 1..n {
            eliminate(&mut aug, width, i, k);
        }
    }

    for k in (1..n).rev() {
        for i in 0..k {
            eliminate(&mut aug, width, i, k);
        }
    }

    let inv = aug
        .chunks_exact(width)
        .flat_map(|row| row[n..].iter().copied())
        .collect();
    Ok(Tensor::from_raw(Shape::matrix(n, n), inv))
}

/// Solves `M x = b` in the least-squares sense via the normal equations
/// `x = (MᵗM)⁻¹ Mᵗ b`.
///
/// `m` is `r x c` and `b` is `r x 1` (any `r x k` right-hand side works);
/// the result is `c x k`.
///
/// # Errors
/// Returns [`TensorError::DimensionMismatch`] if `m` or `b` is not a matrix or
/// their row counts differ, checked before any arithmetic. Propagates
/// [`TensorError::SingularMatrix`] when `MᵗM` is not invertible.
pub fn solve(m: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    if m.rank() != 2 || b.rank() != 2 || m.dims()[0] != b.dims()[0] {
        return Err(TensorError::DimensionMismatch {
            op: "solve",
            lhs: m.shape().clone(),
            rhs: b.shape().clone(),
        });
    }
    let mt = transpose(m)?;
    let mtm = matmul(&mt, m)?;
    let mtm_inv = invert(&mtm)?;
    let pseudo_inverse = matmul(&mtm_inv, &mt)?;
    matmul(&pseudo_inverse, b)
}

/// Builds the `n x 2n` row-major matrix `[m | I]`.
fn augment(m: &[f32], n: usize) -> Vec<f32> {
    let width = 2 * n;
    let mut aug = vec![0.0f32; n * width];
    for (i, row) in m.chunks_exact(n).enumerate() {
        aug[i * width..i * width + n].copy_from_slice(row);
        aug[i * width + n + i] = 1.0;
    }
    aug
}

fn swap_rows(data: &mut [f32], width: usize, a: usize, b: usize) {
    if a == b {
        return;
    }
    let (lo, hi) = (a.min(b), a.max(b));
    let (head, tail) = data.split_at_mut(hi * width);
    head[lo * width..(lo + 1) * width].swap_with_slice(&mut tail[..width]);
}

/// Subtracts a multiple of normalised row `k` from row `i` so that
/// `row[i][k]` becomes zero. Columns left of `k` are already reduced.
fn eliminate(data: &mut [f32], width: usize, i: usize, k: usize) {
    let s = -data[i * width + k];
    data[i * width + k] = 0.0;
    if s == 0.0 {
        return;
    }
    let (pivot_row, target_row) = if i < k {
        let (head, tail) = data.split_at_mut(k * width);
        (&tail[..width], &mut head[i * width..(i + 1) * width])
    } else {
        let (head, tail) = data.split_at_mut(i * width);
        (&head[k * width..(k + 1) * width], &mut tail[..width])
    };
    for (t, &p) in target_row[k + 1..].iter_mut().zip(&pivot_row[k + 1..]) {
        *t += s * p;
    }
}
