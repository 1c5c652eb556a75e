// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property tests: the recursive broadcast engine against a flat index-mapping
//! reference, and the im2col convolution against the direct one.

use proptest::prelude::*;
use tensor_core::{
    add, axpy, broadcastable, conv2d, conv2d_reference, mul, sub, Shape, Tensor,
};

// ── Helpers ────────────────────────────────────────────────────

/// Flat broadcasting: for every output position, compute each operand's
/// element by clamping broadcast dimensions to index 0.
fn naive_broadcast(a: &Tensor, b: &Tensor, f: impl Fn(f32, f32) -> f32) -> Tensor {
    let out_shape = a.shape().broadcast_shape(b.shape()).unwrap();
    let out_dims = out_shape.dims();
    let mut out = Vec::with_capacity(out_shape.num_elements());

    for flat in 0..out_shape.num_elements() {
        let mut index = vec![0usize; out_dims.len()];
        let mut rem = flat;
        for (d, &stride) in out_shape.strides().iter().enumerate() {
            index[d] = rem / stride;
            rem %= stride;
        }
        out.push(f(element_at(a, &index), element_at(b, &index)));
    }
    Tensor::from_vec(out_shape, out).unwrap()
}

fn element_at(t: &Tensor, out_index: &[usize]) -> f32 {
    let lead = out_index.len() - t.rank();
    let offset: usize = t
        .dims()
        .iter()
        .zip(t.shape().strides())
        .zip(&out_index[lead..])
        .map(|((&dim, stride), &i)| if dim == 1 { 0 } else { i * stride })
        .sum();
    t.as_slice()[offset]
}

/// Two shapes guaranteed to broadcast: both are right-aligned suffixes of a
/// common full shape with some dimensions collapsed to 1.
fn compatible_shapes() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec(1usize..5, 0..5)
        .prop_flat_map(|full| {
            let n = full.len();
            (
                Just(full),
                0..=n,
                0..=n,
                prop::collection::vec(any::<bool>(), n),
                prop::collection::vec(any::<bool>(), n),
            )
        })
        .prop_map(|(full, rank_a, rank_b, keep_a, keep_b)| {
            let pick = |rank: usize, keep: &[bool]| -> Vec<usize> {
                let start = full.len() - rank;
                full[start..]
                    .iter()
                    .zip(&keep[start..])
                    .map(|(&d, &k)| if k { d } else { 1 })
                    .collect()
            };
            (pick(rank_a, &keep_a), pick(rank_b, &keep_b))
        })
}

// ── Broadcasting ───────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_add_matches_naive((sa, sb) in compatible_shapes(), seed in any::<u64>()) {
        let a = Tensor::random_seeded(sa, 1.0, seed).unwrap();
        let b = Tensor::random_seeded(sb, 1.0, seed.wrapping_add(1)).unwrap();

        let got = add(&a, &b).unwrap();
        let expected = naive_broadcast(&a, &b, |x, y| x + y);
        prop_assert!(got.all_close(&expected, 1e-6));
    }

    #[test]
    fn prop_mul_matches_naive((sa, sb) in compatible_shapes(), seed in any::<u64>()) {
        let a = Tensor::random_seeded(sa, 1.0, seed).unwrap();
        let b = Tensor::random_seeded(sb, 1.0, seed.wrapping_add(1)).unwrap();

        let got = mul(&a, &b).unwrap();
        let expected = naive_broadcast(&a, &b, |x, y| x * y);
        prop_assert!(got.all_close(&expected, 1e-6));
    }

    #[test]
    fn prop_axpy_identities((sx, sy) in compatible_shapes(), seed in any::<u64>()) {
        let x = Tensor::random_seeded(sx, 1.0, seed).unwrap();
        let y = Tensor::random_seeded(sy, 1.0, seed.wrapping_add(1)).unwrap();

        let zero = axpy(0.0, &x, &y).unwrap();
        prop_assert!(zero.all_close(&naive_broadcast(&x, &y, |_, b| b), 1e-6));

        let one = axpy(1.0, &x, &y).unwrap();
        prop_assert!(one.all_close(&add(&x, &y).unwrap(), 1e-6));

        let diff = sub(&y, &x).unwrap();
        prop_assert!(diff.all_close(&naive_broadcast(&x, &y, |a, b| b - a), 1e-6));
    }

    #[test]
    fn prop_add_self_is_double(dims in prop::collection::vec(1usize..6, 0..4), seed in any::<u64>()) {
        let t = Tensor::random_seeded(dims, 1.0, seed).unwrap();
        prop_assert!(add(&t, &t).unwrap().all_close(&t.scale(2.0), 1e-5));
    }
}

#[test]
fn broadcastable_table() {
    let t1 = Tensor::zeros([11, 5, 13, 9]).unwrap();
    let cases: [(&[usize], bool); 7] = [
        (&[9], true),
        (&[13], false),
        (&[1, 9], true),
        (&[2, 9], false),
        (&[13, 9], true),
        (&[11, 1, 13, 1], true),
        (&[12, 1, 13, 1], false),
    ];
    for (dims, expected) in cases {
        let other = Tensor::zeros(dims).unwrap();
        assert_eq!(broadcastable(&t1, &other), expected, "{}", Shape::from(dims));
        assert_eq!(broadcastable(&other, &t1), expected, "{}", Shape::from(dims));
    }
}

// ── Convolution ────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct ConvCase {
    channels: usize,
    h: usize,
    w: usize,
    out_c: usize,
    kh: usize,
    kw: usize,
    stride: usize,
    pad: usize,
}

fn conv_cases() -> impl Strategy<Value = ConvCase> {
    (1usize..4, 1usize..13, 1usize..13, 1usize..5, 1usize..5, 1usize..5, 1usize..4, 0usize..3)
        .prop_map(|(channels, h, w, out_c, kh, kw, stride, pad)| ConvCase {
            channels,
            h,
            w,
            out_c,
            kh,
            kw,
            stride,
            pad,
        })
        .prop_filter("kernel must fit the padded image", |c| {
            c.kh <= c.h + 2 * c.pad && c.kw <= c.w + 2 * c.pad
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_conv2d_matches_reference(case in conv_cases(), seed in any::<u64>()) {
        let image = Tensor::random_seeded([case.channels, case.h, case.w], 1.0, seed).unwrap();
        let filters = Tensor::random_seeded(
            [case.out_c, case.channels, case.kh, case.kw],
            1.0,
            seed.wrapping_add(1),
        )
        .unwrap();

        let fast = conv2d(&image, &filters, case.stride, case.pad).unwrap();
        let slow = conv2d_reference(&image, &filters, case.stride, case.pad).unwrap();

        let out_h = (case.h + 2 * case.pad - case.kh) / case.stride + 1;
        let out_w = (case.w + 2 * case.pad - case.kw) / case.stride + 1;
        prop_assert_eq!(fast.dims(), &[case.out_c, out_h, out_w][..]);
        prop_assert!(fast.all_close(&slow, 1e-4), "{:?}", case);
    }
}
