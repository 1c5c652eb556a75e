// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and view abstractions.

use std::fmt;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Shape, TensorError};

/// An owned, n-dimensional `f32` tensor stored in contiguous memory.
///
/// `Tensor` is the value type every operation consumes and produces.
/// Operations borrow their operands and always return a freshly allocated
/// tensor, so inputs are never mutated.
///
/// # Memory Layout
/// Data is stored in row-major (C) order: the last dimension varies fastest.
/// The buffer length always equals [`Shape::num_elements`], and no dimension
/// is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let t = Tensor::zeros([2, 3]).unwrap();
    /// assert_eq!(t.numel(), 6);
    /// assert!(t.as_slice().iter().all(|&x| x == 0.0));
    /// ```
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] if any dimension is zero.
    pub fn zeros(shape: impl Into<Shape>) -> Result<Self, TensorError> {
        let shape = shape.into();
        shape.validate()?;
        let len = shape.num_elements();
        Ok(Self {
            shape,
            data: vec![0.0; len],
        })
    }

    /// Creates a tensor from a vector of values laid out in row-major order.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let t = Tensor::from_vec([3], vec![1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);
    /// ```
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for a zero dimension and
    /// [`TensorError::BufferSizeMismatch`] if `data.len()` differs from the
    /// element count of `shape`.
    pub fn from_vec(shape: impl Into<Shape>, data: Vec<f32>) -> Result<Self, TensorError> {
        let shape = shape.into();
        shape.validate()?;
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates a rank-0 tensor holding a single value.
    pub fn scalar(value: f32) -> Self {
        Self {
            shape: Shape::scalar(),
            data: vec![value],
        }
    }

    /// Creates a tensor filled uniformly from `[-scale, scale]`.
    ///
    /// The caller owns the generator, and with it the seeding policy.
    ///
    /// Values are drawn from the unit interval and scaled by `|scale|`, so any
    /// finite scale up to `f32::MAX` is accepted.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] if any dimension is zero and
    /// [`TensorError::InvalidArgument`] if `scale` is NaN or infinite.
    pub fn random<R: Rng + ?Sized>(
        shape: impl Into<Shape>,
        scale: f32,
        rng: &mut R,
    ) -> Result<Self, TensorError> {
        if !scale.is_finite() {
            return Err(TensorError::InvalidArgument {
                op: "random",
                detail: format!("scale must be finite, got {scale}"),
            });
        }
        let mut t = Self::zeros(shape)?;
        let bound = scale.abs();
        let unit = Uniform::new_inclusive(-1.0f32, 1.0);
        t.data
            .iter_mut()
            .for_each(|x| *x = unit.sample(rng) * bound);
        Ok(t)
    }

    /// Like [`Tensor::random`], drawing from a [`StdRng`] seeded with `seed`.
    pub fn random_seeded(
        shape: impl Into<Shape>,
        scale: f32,
        seed: u64,
    ) -> Result<Self, TensorError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::random(shape, scale, &mut rng)
    }

    /// Builds a tensor from parts the caller has already validated.
    pub(crate) fn from_raw(shape: Shape, data: Vec<f32>) -> Self {
        debug_assert_eq!(shape.num_elements(), data.len());
        Self { shape, data }
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Returns the number of elements.
    pub fn numel(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns the data in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the data as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Fills the tensor with a constant value.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Returns a copy with every element multiplied by `s`.
    pub fn scale(&self, s: f32) -> Tensor {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| x * s).collect(),
        }
    }

    /// Returns an owned copy of the sub-tensor at `index` along the leading
    /// dimension.
    ///
    /// A rank-1 tensor yields a rank-1 tensor of length 1 rather than a scalar,
    /// so repeated `get` calls bottom out at shape `[1]`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let t = Tensor::from_vec([2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let row = t.get(1).unwrap();
    /// assert_eq!(row.dims(), &[2]);
    /// assert_eq!(row.as_slice(), &[3.0, 4.0]);
    /// ```
    ///
    /// # Errors
    /// Returns [`TensorError::IndexOutOfRange`] if the tensor is a scalar or
    /// `index >= shape[0]`.
    pub fn get(&self, index: usize) -> Result<Tensor, TensorError> {
        let len = self.shape.dim(0).unwrap_or(0);
        if index >= len {
            return Err(TensorError::IndexOutOfRange { index, len });
        }
        if self.rank() == 1 {
            return Ok(Tensor::from_raw(
                Shape::vector(1),
                vec![self.data[index]],
            ));
        }
        Ok(self.row(index).to_tensor())
    }

    /// Reinterprets the buffer under a new shape with the same element count.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for a zero dimension and
    /// [`TensorError::BufferSizeMismatch`] if the element counts differ.
    pub fn reshape(self, shape: impl Into<Shape>) -> Result<Tensor, TensorError> {
        Tensor::from_vec(shape, self.data)
    }

    /// Returns `true` if both tensors have the same shape and every pair of
    /// elements differs by less than `tol`.
    pub fn all_close(&self, other: &Tensor, tol: f32) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() < tol)
    }

    /// Returns a borrowed view over the whole tensor.
    pub(crate) fn view(&self) -> TensorView<'_> {
        TensorView {
            shape: self.shape.dims(),
            data: &self.data,
        }
    }

    /// Returns a borrowed view of the slice at `index` along the leading dimension.
    pub(crate) fn row(&self, index: usize) -> TensorView<'_> {
        self.view().row(index)
    }
}

/// A borrowed, read-only window into a [`Tensor`]'s buffer.
///
/// A view aliases a contiguous suffix of its parent's shape and data. It is
/// tied to the parent's lifetime by the borrow checker and owns nothing, so
/// it can neither outlive nor release its parent. Views stay inside the
/// crate; public operations only ever hand out owned tensors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TensorView<'a> {
    shape: &'a [usize],
    data: &'a [f32],
}

impl<'a> TensorView<'a> {
    /// Returns the dimensions of the viewed region.
    pub(crate) fn dims(&self) -> &'a [usize] {
        self.shape
    }

    /// Returns the number of dimensions.
    pub(crate) fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the viewed data.
    pub(crate) fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Selects slice `index` along the leading dimension: rank `n - 1`,
    /// starting at `index * numel(shape[1..])`.
    ///
    /// # Panics
    /// Panics if the view is a scalar or `index` is out of range; callers
    /// check bounds first.
    pub(crate) fn row(&self, index: usize) -> TensorView<'a> {
        let tail = &self.shape[1..];
        let len: usize = tail.iter().product();
        TensorView {
            shape: tail,
            data: &self.data[index * len..(index + 1) * len],
        }
    }

    /// Deep-copies the viewed region into an owned tensor.
    pub(crate) fn to_tensor(&self) -> Tensor {
        Tensor::from_raw(Shape::from(self.shape), self.data.to_vec())
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank() {
            0 => writeln!(f, "[{:6.3}]", self.data[0]),
            1 => {
                write!(f, "[")?;
                for x in self.data {
                    write!(f, "{x:6.3} ")?;
                }
                writeln!(f, "]")
            }
            _ => (0..self.shape[0]).try_for_each(|i| self.row(i).fmt_nested(f)),
        }
    }
}

/// Prints the tensor one innermost row per line, values as `{:6.3}`.
impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.view().fmt_nested(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(Shape::matrix(2, 3)).unwrap();
        assert_eq!(t.numel(), 6);
        assert_eq!(t.shape(), &Shape::matrix(2, 3));
        assert!(t.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_zeros_rejects_zero_dim() {
        let err = Tensor::zeros([3, 0]).unwrap_err();
        assert_eq!(err, TensorError::InvalidShape { dims: vec![3, 0] });
    }

    #[test]
    fn test_scalar_tensor() {
        let t = Tensor::scalar(2.5);
        assert_eq!(t.rank(), 0);
        assert_eq!(t.numel(), 1);
        assert_eq!(t.as_slice(), &[2.5]);
    }

    #[test]
    fn test_from_vec() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let t = Tensor::from_vec(Shape::matrix(2, 3), data.clone()).unwrap();
        assert_eq!(t.as_slice(), &data[..]);
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let result = Tensor::from_vec(Shape::matrix(2, 3), vec![0.0; 5]);
        assert_eq!(
            result.unwrap_err(),
            TensorError::BufferSizeMismatch {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn test_random_within_scale() {
        let t = Tensor::random_seeded([4, 5, 6], 0.5, 7).unwrap();
        assert_eq!(t.dims(), &[4, 5, 6]);
        assert!(t.as_slice().iter().all(|&x| (-0.5..=0.5).contains(&x)));
        assert!(t.as_slice().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn test_random_extreme_scale() {
        let t = Tensor::random_seeded([64], f32::MAX, 3).unwrap();
        assert!(t.as_slice().iter().all(|x| x.is_finite()));
        assert!(t.as_slice().iter().any(|&x| x.abs() > 1e37));

        let neg = Tensor::random_seeded([4], -2.0, 3).unwrap();
        assert!(neg.as_slice().iter().all(|&x| (-2.0..=2.0).contains(&x)));
    }

    #[test]
    fn test_random_rejects_non_finite_scale() {
        for scale in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                Tensor::random_seeded([4], scale, 1),
                Err(TensorError::InvalidArgument { op: "random", .. })
            ));
        }
    }

    #[test]
    fn test_random_seed_is_deterministic() {
        let a = Tensor::random_seeded([8, 8], 1.0, 42).unwrap();
        let b = Tensor::random_seeded([8, 8], 1.0, 42).unwrap();
        let c = Tensor::random_seeded([8, 8], 1.0, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_get_chain() {
        let r = Tensor::random_seeded([3, 108, 192], 1.0, 1).unwrap();

        let g = r.get(1).unwrap();
        assert_eq!(g.dims(), &[108, 192]);
        assert_eq!(g.as_slice(), &r.as_slice()[108 * 192..2 * 108 * 192]);

        let h = g.get(34).unwrap();
        assert_eq!(h.dims(), &[192]);

        let i = h.get(13).unwrap();
        assert_eq!(i.dims(), &[1]);
        assert_eq!(i.as_slice()[0], h.as_slice()[13]);

        let j = i.get(0).unwrap();
        assert!(i.all_close(&j, 1e-7));
    }

    #[test]
    fn test_get_out_of_range() {
        let t = Tensor::zeros([2, 3]).unwrap();
        assert_eq!(
            t.get(2).unwrap_err(),
            TensorError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            Tensor::scalar(1.0).get(0).unwrap_err(),
            TensorError::IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_get_is_a_deep_copy() {
        let t = Tensor::from_vec([2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut row = t.get(0).unwrap();
        row.fill(9.0);
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_copy_and_scale() {
        let t = Tensor::random_seeded([3, 5], 1.0, 3).unwrap();
        let c = t.clone();
        assert!(t.all_close(&c, 1e-7));

        let w = t.scale(12.3);
        assert!((w.as_slice()[0] - t.as_slice()[0] * 12.3).abs() < 1e-5);
        assert!((w.as_slice()[11] - t.as_slice()[11] * 12.3).abs() < 1e-5);
    }

    #[test]
    fn test_reshape() {
        let t = Tensor::from_vec([2, 6], (0..12).map(|x| x as f32).collect()).unwrap();
        let r = t.clone().reshape([2, 2, 3]).unwrap();
        assert_eq!(r.dims(), &[2, 2, 3]);
        assert_eq!(r.as_slice(), t.as_slice());
        assert!(t.reshape([5]).is_err());
    }

    #[test]
    fn test_all_close_shape_sensitive() {
        let a = Tensor::zeros([2, 3]).unwrap();
        let b = Tensor::zeros([3, 2]).unwrap();
        assert!(!a.all_close(&b, 1.0));
    }

    #[test]
    fn test_view_rows() {
        let t = Tensor::from_vec([2, 2, 2], (0..8).map(|x| x as f32).collect()).unwrap();
        let v = t.row(1);
        assert_eq!(v.dims(), &[2, 2]);
        assert_eq!(v.as_slice(), &[4.0, 5.0, 6.0, 7.0]);

        let s = v.row(1).row(0);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.as_slice(), &[6.0]);
    }

    #[test]
    fn test_display() {
        let t = Tensor::from_vec([2, 2], vec![1.0, -2.0, 0.5, 4.0]).unwrap();
        assert_eq!(
            t.to_string(),
            "[ 1.000 -2.000 ]\n[ 0.500  4.000 ]\n"
        );
        assert_eq!(Tensor::scalar(1.0).to_string(), "[ 1.000]\n");
    }
}
