// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! A small single-precision n-dimensional array engine.
//!
//! This crate provides:
//! - [`Tensor`]: an owned, row-major `f32` tensor.
//! - [`Shape`]: shape descriptors with broadcasting rules.
//! - Broadcasting arithmetic: [`add`], [`mul`], [`sub`], [`axpy`].
//! - Linear algebra: [`matmul`], [`transpose`], [`invert`], [`solve`].
//! - Convolution: [`im2col`], [`conv2d`] and the direct [`conv2d_reference`].
//!
//! # Design Goals
//! - Operands are borrowed and never mutated; results are always owned.
//! - Sub-tensor views borrow from their parent and never leave the crate.
//! - Clean error types via `thiserror`.
//!
//! # Example
//! ```
//! use tensor_core::{add, matmul, Tensor};
//!
//! let a = Tensor::from_vec([2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
//! let row = Tensor::from_vec([2], vec![10.0, 20.0])?;
//! let sum = add(&a, &row)?;
//! assert_eq!(sum.as_slice(), &[11.0, 22.0, 13.0, 24.0]);
//!
//! let product = matmul(&a, &a)?;
//! assert_eq!(product.as_slice(), &[7.0, 10.0, 15.0, 22.0]);
//! # Ok::<(), tensor_core::TensorError>(())
//! ```

mod error;
mod ops;
mod shape;
mod tensor;

pub use error::TensorError;
pub use ops::{
    add, axpy, broadcast_binary, broadcastable, conv2d, conv2d_reference, conv_output_dims,
    im2col, invert, matmul, mul, solve, sub, transpose, ElementwiseOp,
};
pub use shape::Shape;
pub use tensor::Tensor;
