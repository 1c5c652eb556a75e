// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Broadcasting element-wise arithmetic: add, mul, sub and fused axpy.

use crate::tensor::TensorView;
use crate::{Tensor, TensorError};

/// The closed set of binary element-wise operations the broadcast engine
/// can dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementwiseOp {
    /// `a + b`
    Add,
    /// `a * b`
    Mul,
    /// `alpha * a + b`
    Axpy(f32),
}

impl ElementwiseOp {
    /// Applies the operation to a single pair of elements.
    #[inline(always)]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            ElementwiseOp::Add => a + b,
            ElementwiseOp::Mul => a * b,
            ElementwiseOp::Axpy(alpha) => alpha * a + b,
        }
    }

    /// Returns the operation name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ElementwiseOp::Add => "add",
            ElementwiseOp::Mul => "mul",
            ElementwiseOp::Axpy(_) => "axpy",
        }
    }
}

/// Returns `true` if `a` and `b` can be broadcast together.
///
/// # Examples
/// ```
/// use tensor_core::{broadcastable, Tensor};
/// let a = Tensor::zeros([11, 5, 13, 9]).unwrap();
/// assert!(broadcastable(&a, &Tensor::zeros([9]).unwrap()));
/// assert!(!broadcastable(&a, &Tensor::zeros([13]).unwrap()));
/// ```
pub fn broadcastable(a: &Tensor, b: &Tensor) -> bool {
    a.shape().is_broadcast_compatible(b.shape())
}

/// Element-wise `a + b` with broadcasting.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes cannot be broadcast.
pub fn add(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    broadcast_binary(a, b, ElementwiseOp::Add)
}

/// Element-wise `a * b` with broadcasting.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes cannot be broadcast.
pub fn mul(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    broadcast_binary(a, b, ElementwiseOp::Mul)
}

/// Element-wise `a - b` with broadcasting, computed as `axpy(-1, b, a)`.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes cannot be broadcast.
pub fn sub(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    axpy(-1.0, b, a)
}

/// Fused `alpha * x + y` with broadcasting.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes cannot be broadcast.
pub fn axpy(alpha: f32, x: &Tensor, y: &Tensor) -> Result<Tensor, TensorError> {
    broadcast_binary(x, y, ElementwiseOp::Axpy(alpha))
}

/// Applies `op` to every broadcast-aligned pair of elements of `a` and `b`,
/// returning a new tensor of the broadcast shape.
///
/// Operands that already have the result shape, or that are both 1-D, take a
/// flat loop. Everything else goes through the recursive traversal.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes cannot be broadcast.
/// Nothing is allocated in that case.
pub fn broadcast_binary(a: &Tensor, b: &Tensor, op: ElementwiseOp) -> Result<Tensor, TensorError> {
    if !broadcastable(a, b) {
        return Err(TensorError::ShapeMismatch {
            op: op.name(),
            lhs: a.shape().clone(),
            rhs: b.shape().clone(),
        });
    }
    let out_shape = a.shape().broadcast_shape(b.shape())?;
    let mut out = vec![0.0f32; out_shape.num_elements()];

    let (xs, ys) = (a.as_slice(), b.as_slice());
    if a.shape() == &out_shape && b.shape() == &out_shape {
        for ((o, &x), &y) in out.iter_mut().zip(xs).zip(ys) {
            *o = op.apply(x, y);
        }
    } else if a.rank() == 1 && b.rank() == 1 {
        // One side has length 1 and is held for every output position.
        let inc_x = usize::from(xs.len() == out.len());
        let inc_y = usize::from(ys.len() == out.len());
        for (i, o) in out.iter_mut().enumerate() {
            *o = op.apply(xs[i * inc_x], ys[i * inc_y]);
        }
    } else {
        tracing::trace!(op = op.name(), shape = %out_shape, "recursive broadcast");
        broadcast_recursive(a.view(), b.view(), out_shape.dims(), &mut out, op);
    }

    Ok(Tensor::from_raw(out_shape, out))
}

/// Walks the result shape outermost dimension first, writing into `out`,
/// which holds exactly `product(dims)` elements.
fn broadcast_recursive(
    a: TensorView<'_>,
    b: TensorView<'_>,
    dims: &[usize],
    out: &mut [f32],
    op: ElementwiseOp,
) {
    let Some((&n, tail)) = dims.split_first() else {
        out[0] = op.apply(a.as_slice()[0], b.as_slice()[0]);
        return;
    };
    let len: usize = tail.iter().product();
    for (i, chunk) in out.chunks_exact_mut(len).enumerate() {
        let sub_a = select(a, dims.len(), n, i);
        let sub_b = select(b, dims.len(), n, i);
        broadcast_recursive(sub_a, sub_b, tail, chunk, op);
    }
}

/// Picks the operand slice for output index `i` at a depth where the result
/// has `remaining` dimensions left and a leading dimension of `n`.
///
/// An operand with fewer remaining dimensions has not been reached yet and is
/// passed through whole. A reached operand advances when its leading
/// dimension matches `n`, otherwise it holds its single slice.
fn select<'a>(v: TensorView<'a>, remaining: usize, n: usize, i: usize) -> TensorView<'a> {
    if v.rank() != remaining {
        return v;
    }
    if v.dims()[0] == n {
        v.row(i)
    } else {
        v.row(0)
    }
}
