// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

use crate::TensorError;

/// Describes the dimensionality of a [`crate::Tensor`].
///
/// Shapes are immutable once created and provide convenience methods for
/// computing strides, total element counts, and broadcasting compatibility.
///
/// A `Shape` itself may hold a zero dimension; [`crate::Tensor`] constructors
/// reject such shapes via [`Shape::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Checks that no dimension is zero.
    pub fn validate(&self) -> Result<(), TensorError> {
        if self.dims.contains(&0) {
            return Err(TensorError::InvalidShape {
                dims: self.dims.clone(),
            });
        }
        Ok(())
    }

    /// Computes row-major (C-order) strides for this shape.
    ///
    /// The stride for dimension `i` is the number of elements to skip
    /// in the flat buffer to advance one step along that dimension.
    pub fn strides(&self) -> Vec<usize> {
        let rank = self.dims.len();
        if rank == 0 {
            return vec![];
        }
        let mut strides = vec![0usize; rank];
        strides[rank - 1] = 1;
        for i in (0..rank - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Returns `true` if two shapes are broadcast-compatible.
    ///
    /// Shapes are compatible when, aligning dimensions from the right,
    /// each pair is either equal or one of them is 1. Leading dimensions of
    /// the higher-rank shape are unconstrained.
    pub fn is_broadcast_compatible(&self, other: &Shape) -> bool {
        self.dims
            .iter()
            .rev()
            .zip(other.dims.iter().rev())
            .all(|(&a, &b)| a == b || a == 1 || b == 1)
    }

    /// Computes the shape produced by broadcasting `self` against `other`.
    ///
    /// The result has rank `max(self.rank(), other.rank())`. Aligned trailing
    /// positions take the larger of the two dimensions; the remaining leading
    /// positions are copied from the higher-rank shape.
    ///
    /// # Errors
    /// Returns [`TensorError::ShapeMismatch`] if the shapes are incompatible.
    pub fn broadcast_shape(&self, other: &Shape) -> Result<Shape, TensorError> {
        if !self.is_broadcast_compatible(other) {
            return Err(TensorError::ShapeMismatch {
                op: "broadcast",
                lhs: self.clone(),
                rhs: other.clone(),
            });
        }

        let (long, short) = if self.rank() >= other.rank() {
            (&self.dims, &other.dims)
        } else {
            (&other.dims, &self.dims)
        };
        let lead = long.len() - short.len();

        let mut dims = long.clone();
        for (d, &s) in dims[lead..].iter_mut().zip(short.iter()) {
            *d = (*d).max(s);
        }
        Ok(Shape::new(dims))
    }

    /// Returns `true` if both shapes are matrices and `self` is `[M, K]`
    /// while `other` is `[K, N]`.
    pub fn is_matmul_compatible(&self, other: &Shape) -> bool {
        self.rank() == 2 && other.rank() == 2 && self.dims[1] == other.dims[0]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

/// Convenience: `Shape::from([3, 512, 256])`.
impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}
