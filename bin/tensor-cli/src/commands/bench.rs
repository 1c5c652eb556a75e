// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tensor-check bench` command: wall-clock timing of the hot operations.
//!
//! Times `add` and `matmul` on square random matrices, then both convolution
//! paths on the configured workload. Each line reports the total time and the
//! time per scalar operation.

use std::time::{Duration, Instant};

use tensor_core::{add, conv2d, conv2d_reference, matmul, Tensor};

use crate::config::HarnessConfig;

pub fn execute(config: &HarnessConfig) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           tensor-check · Timing                      ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let n = config.matrix_size;
    let iterations = config.iterations;
    println!("  Matrix:     {n} x {n}");
    println!("  Iterations: {iterations}");
    println!("  Conv:       {} * {}", config.conv.image, config.conv.filters);
    println!();

    let a = Tensor::random_seeded([n, n], 1.0, config.seed)?;
    let b = Tensor::random_seeded([n, n], 1.0, config.seed.wrapping_add(1))?;

    // ── Element-wise add ───────────────────────────────────────
    let elapsed = time_repeated(iterations, || add(&a, &b).map(drop))?;
    report("tensor_add", elapsed, iterations * n * n);

    // ── Matrix multiply ────────────────────────────────────────
    let elapsed = time_repeated(iterations, || matmul(&a, &b).map(drop))?;
    report("matrix_multiply", elapsed, iterations * n * n * n);

    // ── Convolution ────────────────────────────────────────────
    let conv = &config.conv;
    let image = Tensor::random_seeded(conv.image.clone(), 1.0, config.seed)?;
    let filters = Tensor::random_seeded(conv.filters.clone(), 1.0, config.seed.wrapping_add(2))?;

    let start = Instant::now();
    let fast = conv2d(&image, &filters, conv.stride, conv.pad)?;
    let fast_elapsed = start.elapsed();

    let start = Instant::now();
    let slow = conv2d_reference(&image, &filters, conv.stride, conv.pad)?;
    let slow_elapsed = start.elapsed();

    // One multiply-accumulate per filter tap per output element.
    let macs = fast.numel() * conv.filters.num_elements() / conv.filters.dims()[0];
    report("conv2d", fast_elapsed, macs);
    report("conv2d_reference", slow_elapsed, macs);

    if !fast.all_close(&slow, config.tolerance) {
        tracing::warn!(tolerance = config.tolerance, "conv2d disagrees with reference");
        anyhow::bail!("conv2d output differs from the reference beyond tolerance");
    }
    if fast_elapsed > Duration::ZERO {
        println!(
            "  im2col speedup: {:.1}x",
            slow_elapsed.as_secs_f64() / fast_elapsed.as_secs_f64()
        );
    }

    Ok(())
}

fn time_repeated<F>(iterations: usize, mut f: F) -> anyhow::Result<Duration>
where
    F: FnMut() -> Result<(), tensor_core::TensorError>,
{
    let start = Instant::now();
    for _ in 0..iterations {
        f()?;
    }
    Ok(start.elapsed())
}

fn report(label: &str, elapsed: Duration, scalar_ops: usize) {
    let secs = elapsed.as_secs_f64();
    println!("{label} took {secs:.6} sec");
    println!("{:e} sec/op", per_op(secs, scalar_ops));
    tracing::info!(op = label, secs, scalar_ops, "timed");
}

fn per_op(secs: f64, scalar_ops: usize) -> f64 {
    if scalar_ops == 0 {
        0.0
    } else {
        secs / scalar_ops as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_op() {
        assert_eq!(per_op(2.0, 4), 0.5);
        assert_eq!(per_op(1.0, 0), 0.0);
    }

    #[test]
    fn test_time_repeated_propagates_errors() {
        let a = Tensor::zeros([2, 3]).unwrap();
        let b = Tensor::zeros([2, 3]).unwrap();
        assert!(time_repeated(3, || matmul(&a, &b).map(drop)).is_err());
        assert!(time_repeated(3, || add(&a, &b).map(drop)).is_ok());
    }
}
