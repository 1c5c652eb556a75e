// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::Shape;

/// Errors that can occur during tensor operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TensorError {
    /// A shape contains a zero dimension, or a derived output shape would.
    #[error("invalid shape {dims:?}: every dimension must be positive")]
    InvalidShape { dims: Vec<usize> },

    /// The provided buffer length does not match the element count of the shape.
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// An index into the leading dimension is out of bounds.
    #[error("index {index} out of range for leading dimension of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Two tensors cannot be broadcast together.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// Matrix or convolution operands have incompatible ranks or inner dimensions.
    #[error("dimension mismatch in {op}: {lhs} vs {rhs}")]
    DimensionMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// Elimination found a pivot column with no non-zero candidate.
    #[error("matrix is singular: no non-zero pivot in column {column}")]
    SingularMatrix { column: usize },

    /// A scalar argument is outside its valid domain.
    #[error("invalid argument to {op}: {detail}")]
    InvalidArgument {
        op: &'static str,
        detail: String,
    },
}

impl TensorError {
    /// Returns `true` for errors that depend on runtime data rather than on
    /// a malformed call site: broadcast shape mismatches and singular matrices.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TensorError::ShapeMismatch { .. } | TensorError::SingularMatrix { .. }
        )
    }
}
