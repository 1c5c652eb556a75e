// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end use of the public API at realistic sizes.

use tensor_core::{
    add, conv2d, conv2d_reference, im2col, invert, matmul, solve, transpose, Tensor, TensorError,
};

fn identity(n: usize) -> Tensor {
    let mut t = Tensor::zeros([n, n]).unwrap();
    for i in 0..n {
        t.as_mut_slice()[i * n + i] = 1.0;
    }
    t
}

#[test]
fn conv2d_large_image_matches_reference() {
    let image = Tensor::random_seeded([3, 512, 256], 1.0, 2024).unwrap();
    let filters = Tensor::random_seeded([8, 3, 3, 3], 1.0, 2025).unwrap();

    let fast = conv2d(&image, &filters, 1, 1).unwrap();
    let slow = conv2d_reference(&image, &filters, 1, 1).unwrap();

    assert_eq!(fast.dims(), &[8, 512, 256]);
    assert_eq!(slow.dims(), &[8, 512, 256]);
    assert!(fast.all_close(&slow, 1e-4));
}

#[test]
fn conv2d_is_matmul_of_flattened_filters() {
    let image = Tensor::random_seeded([2, 6, 5], 1.0, 1).unwrap();
    let filters = Tensor::random_seeded([3, 2, 3, 3], 1.0, 2).unwrap();

    let col = im2col(&image, 3, 3, 1, 1).unwrap();
    let flat = filters.clone().reshape([3, 2 * 3 * 3]).unwrap();
    let expected = matmul(&flat, &col).unwrap().reshape([3, 6, 5]).unwrap();

    let out = conv2d(&image, &filters, 1, 1).unwrap();
    assert!(out.all_close(&expected, 1e-6));
}

#[test]
fn inverse_of_random_system() {
    let n = 24;
    let mut m = Tensor::random_seeded([n, n], 1.0, 77).unwrap();
    for i in 0..n {
        m.as_mut_slice()[i * n + i] += n as f32;
    }
    let inv = invert(&m).unwrap();
    assert!(matmul(&m, &inv).unwrap().all_close(&identity(n), 1e-4));
    assert!(matmul(&inv, &m).unwrap().all_close(&identity(n), 1e-4));
}

#[test]
fn solve_recovers_known_coefficients() {
    // Build b from known coefficients and check solve returns them.
    let m = Tensor::random_seeded([40, 5], 1.0, 3).unwrap();
    let coeffs = Tensor::from_vec([5, 1], vec![1.5, -2.0, 0.25, 3.0, -0.75]).unwrap();
    let b = matmul(&m, &coeffs).unwrap();

    let x = solve(&m, &b).unwrap();
    assert!(x.all_close(&coeffs, 1e-3), "got {x}");
}

#[test]
fn singular_system_is_branchable() {
    let m = Tensor::from_vec([2, 2], vec![1.0, 2.0, 2.0, 4.0]).unwrap();
    let b = Tensor::from_vec([2, 1], vec![1.0, 2.0]).unwrap();

    match solve(&m, &b) {
        Err(e @ TensorError::SingularMatrix { .. }) => assert!(e.is_recoverable()),
        other => panic!("expected singular matrix, got {other:?}"),
    }
}

#[test]
fn transpose_and_add_compose() {
    let a = Tensor::random_seeded([7, 3], 1.0, 5).unwrap();
    let sym = add(&matmul(&a, &transpose(&a).unwrap()).unwrap(), &identity(7)).unwrap();
    assert!(sym.all_close(&transpose(&sym).unwrap(), 1e-5));
}
