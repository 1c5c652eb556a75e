// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor arithmetic operations.
//!
//! Every operation borrows its operands and returns a freshly allocated
//! [`crate::Tensor`]; inputs are never modified, including on error.

mod broadcast_op;
mod conv_op;
mod invert_op;
mod matmul_op;

pub use broadcast_op::{add, axpy, broadcast_binary, broadcastable, mul, sub, ElementwiseOp};
pub use conv_op::{conv2d, conv2d_reference, conv_output_dims, im2col};
pub use invert_op::{invert, solve};
pub use matmul_op::{matmul, transpose};
