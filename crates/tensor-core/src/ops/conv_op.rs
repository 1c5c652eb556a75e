// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! 2-D convolution: im2col lowering to a matrix multiply, plus a direct
//! reference implementation used to check it.
//!
//! Images are `[C, H, W]` and filter banks are `[outC, C, kh, kw]`. Both
//! strategies treat coordinates outside the image as zero padding and share
//! the output size formula in [`conv_output_dims`].

use super::matmul_op::matmul_f32_generic;
use crate::{Shape, Tensor, TensorError};

/// Computes the spatial output size of a convolution:
/// `(H + 2·pad − kh) / stride + 1` by `(W + 2·pad − kw) / stride + 1`.
///
/// # Errors
/// Returns [`TensorError::InvalidArgument`] if `stride` is zero or the padded
/// extent overflows, and [`TensorError::InvalidShape`] if the kernel is empty
/// or larger than the padded input.
pub fn conv_output_dims(
    h: usize,
    w: usize,
    kh: usize,
    kw: usize,
    stride: usize,
    pad: usize,
) -> Result<(usize, usize), TensorError> {
    if stride == 0 {
        return Err(TensorError::InvalidArgument {
            op: "conv2d",
            detail: "stride must be positive".into(),
        });
    }
    let (Some(padded_h), Some(padded_w)) = (padded_len(h, pad), padded_len(w, pad)) else {
        return Err(TensorError::InvalidArgument {
            op: "conv2d",
            detail: format!("padding {pad} overflows the {h}x{w} input"),
        });
    };
    if kh == 0 || kw == 0 || kh > padded_h || kw > padded_w {
        return Err(TensorError::InvalidShape {
            dims: vec![kh, kw],
        });
    }
    Ok(((padded_h - kh) / stride + 1, (padded_w - kw) / stride + 1))
}

/// Rearranges image patches into the columns of a matrix.
///
/// The result is `[C·kh·kw, outH·outW]`. Row `r` corresponds to
/// `(channel, dy, dx) = (r / (kh·kw), (r / kw) % kh, r % kw)` and column `c`
/// to the output position `(oy, ox) = (c / outW, c % outW)`. Entry `(r, c)`
/// is `image[channel, oy·stride − pad + dy, ox·stride − pad + dx]`, or zero
/// when that coordinate falls in the padding.
///
/// # Errors
/// Returns [`TensorError::DimensionMismatch`] if `image` is not 3-D, plus
/// the errors of [`conv_output_dims`].
pub fn im2col(
    image: &Tensor,
    kh: usize,
    kw: usize,
    stride: usize,
    pad: usize,
) -> Result<Tensor, TensorError> {
    let (channels, h, w) = image_dims(image, "im2col")?;
    let (out_h, out_w) = conv_output_dims(h, w, kh, kw, stride, pad)?;

    let rows = channels * kh * kw;
    let cols = out_h * out_w;
    let src = image.as_slice();
    let mut col = vec![0.0f32; rows * cols];

    for (r, col_row) in col.chunks_exact_mut(cols).enumerate() {
        let channel = r / (kh * kw);
        let dy = (r / kw) % kh;
        let dx = r % kw;
        let plane = &src[channel * h * w..(channel + 1) * h * w];

        for oy in 0..out_h {
            let Some(iy) = source_coord(oy, stride, pad, dy, h) else {
                continue;
            };
            for ox in 0..out_w {
                if let Some(ix) = source_coord(ox, stride, pad, dx, w) {
                    col_row[oy * out_w + ox] = plane[iy * w + ix];
                }
            }
        }
    }

    Ok(Tensor::from_raw(Shape::matrix(rows, cols), col))
}

/// Convolves `image` with `filters` by lowering to a single matrix multiply.
///
/// The filter bank's buffer is read in place as an `[outC, C·kh·kw]` matrix,
/// multiplied by [`im2col`]'s output, and the `[outC, outH·outW]` product is
/// returned as `[outC, outH, outW]`.
///
/// # Errors
/// Returns [`TensorError::DimensionMismatch`] if `image` is not `[C, H, W]`,
/// `filters` is not `[outC, C, kh, kw]`, or the channel counts differ; plus
/// the errors of [`conv_output_dims`].
pub fn conv2d(
    image: &Tensor,
    filters: &Tensor,
    stride: usize,
    pad: usize,
) -> Result<Tensor, TensorError> {
    let geom = ConvGeometry::new(image, filters, stride, pad)?;
    tracing::debug!(
        image = %image.shape(),
        filters = %filters.shape(),
        stride,
        pad,
        "conv2d via im2col"
    );

    let col = im2col(image, geom.kh, geom.kw, stride, pad)?;
    let k = geom.channels * geom.kh * geom.kw;
    let n = geom.out_h * geom.out_w;

    let mut out = vec![0.0f32; geom.out_c * n];
    matmul_f32_generic(filters.as_slice(), col.as_slice(), &mut out, geom.out_c, k, n);

    Tensor::from_vec([geom.out_c, geom.out_h, geom.out_w], out)
}

/// Direct six-loop convolution with the same stride and padding semantics as
/// [`conv2d`]. Slow; exists as an independent check on the im2col path.
///
/// # Errors
/// Same as [`conv2d`].
pub fn conv2d_reference(
    image: &Tensor,
    filters: &Tensor,
    stride: usize,
    pad: usize,
) -> Result<Tensor, TensorError> {
    let ConvGeometry {
        channels,
        h,
        w,
        out_c,
        kh,
        kw,
        out_h,
        out_w,
    } = ConvGeometry::new(image, filters, stride, pad)?;

    let im = image.as_slice();
    let f = filters.as_slice();
    let mut out = vec![0.0f32; out_c * out_h * out_w];

    for z in 0..out_c {
        for c in 0..channels {
            let kernel = &f[(z * channels + c) * kh * kw..(z * channels + c + 1) * kh * kw];
            for y in 0..out_h {
                for x in 0..out_w {
                    let mut sum = 0.0f32;
                    for dy in 0..kh {
                        let Some(iy) = source_coord(y, stride, pad, dy, h) else {
                            continue;
                        };
                        for dx in 0..kw {
                            if let Some(ix) = source_coord(x, stride, pad, dx, w) {
                                sum += im[(c * h + iy) * w + ix] * kernel[dy * kw + dx];
                            }
                        }
                    }
                    out[(z * out_h + y) * out_w + x] += sum;
                }
            }
        }
    }

    Tensor::from_vec([out_c, out_h, out_w], out)
}

/// Maps an output coordinate and kernel offset back to the input axis:
/// `o·stride − pad + d`, or `None` when it lands in the padding.
///
/// The arithmetic is signed so positions left of the image come out negative
/// instead of wrapping.
#[inline]
/// `len + 2·pad`, or `None` when it does not fit in `isize`, which
/// [`source_coord`] relies on.
fn padded_len(len: usize, pad: usize) -> Option<usize> {
    let padded = pad.checked_mul(2)?.checked_add(len)?;
    isize::try_from(padded).is_ok().then_some(padded)
}

fn source_coord(o: usize, stride: usize, pad: usize, d: usize, len: usize) -> Option<usize> {
    let pos = (o * stride) as isize - pad as isize + d as isize;
    if pos < 0 {
        return None;
    }
    let pos = pos as usize;
    (pos < len).then_some(pos)
}

fn image_dims(image: &Tensor, op: &'static str) -> Result<(usize, usize, usize), TensorError> {
    match image.dims() {
        &[c, h, w] => Ok((c, h, w)),
        _ => Err(TensorError::DimensionMismatch {
            op,
            lhs: image.shape().clone(),
            rhs: Shape::scalar(),
        }),
    }
}

/// Validated sizes shared by both convolution strategies.
#[derive(Debug, Clone, Copy)]
struct ConvGeometry {
    channels: usize,
    h: usize,
    w: usize,
    out_c: usize,
    kh: usize,
    kw: usize,
    out_h: usize,
    out_w: usize,
}

impl ConvGeometry {
    fn new(image: &Tensor, filters: &Tensor, stride: usize, pad: usize) -> Result<Self, TensorError> {
        let (channels, h, w) = image_dims(image, "conv2d")?;
        let &[out_c, f_c, kh, kw] = filters.dims() else {
            return Err(TensorError::DimensionMismatch {
                op: "conv2d (filters)",
                lhs: filters.shape().clone(),
                rhs: image.shape().clone(),
            });
        };
        if f_c != channels {
            return Err(TensorError::DimensionMismatch {
                op: "conv2d (channels)",
                lhs: filters.shape().clone(),
                rhs: image.shape().clone(),
            });
        }
        let (out_h, out_w) = conv_output_dims(h, w, kh, kw, stride, pad)?;
        Ok(Self {
            channels,
            h,
            w,
            out_c,
            kh,
            kw,
            out_h,
            out_w,
        })
    }
}
