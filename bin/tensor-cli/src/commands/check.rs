// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tensor-check check` command: run the built-in correctness suite.
//!
//! Each check is a named closure returning `Result<bool, TensorError>`; an
//! error counts as a failure and is logged alongside the check name.

use tensor_core::{
    add, axpy, broadcastable, conv2d, conv2d_reference, invert, matmul, solve, sub, transpose,
    Tensor, TensorError,
};

use crate::config::HarnessConfig;

type CheckResult = Result<bool, TensorError>;

/// Pass/fail counters for one suite run.
#[derive(Debug, Default)]
pub struct Report {
    pub total: usize,
    pub failed: usize,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.total - self.failed
    }

    fn record(&mut self, name: &str, outcome: CheckResult) {
        self.total += 1;
        match outcome {
            Ok(true) => {
                tracing::debug!(check = name, "passed");
                println!("  ✓ {name}");
            }
            Ok(false) => {
                self.failed += 1;
                tracing::warn!(check = name, "failed");
                println!("  ✗ {name}");
            }
            Err(e) => {
                self.failed += 1;
                tracing::warn!(check = name, error = %e, "failed with error");
                println!("  ✗ {name}: {e}");
            }
        }
    }
}

pub fn execute(config: &HarnessConfig) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           tensor-check · Correctness Suite           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let report = run_suite(config);

    println!();
    println!(
        "{} tests, {} passed, {} failed",
        report.total,
        report.passed(),
        report.failed
    );

    if report.failed > 0 {
        anyhow::bail!("{} of {} checks failed", report.failed, report.total);
    }
    Ok(())
}

/// Runs every check and returns the tallies.
pub fn run_suite(config: &HarnessConfig) -> Report {
    let tol = config.tolerance;
    let seed = config.seed;
    let mut report = Report::default();

    // ── Shapes and indexing ────────────────────────────────────
    report.record("get chain on [3, 108, 192]", check_get_chain(seed));
    report.record("get out of range is an error", {
        Tensor::zeros([3, 4]).map(|t| {
            matches!(t.get(3), Err(TensorError::IndexOutOfRange { .. }))
                && matches!(Tensor::scalar(1.0).get(0), Err(TensorError::IndexOutOfRange { .. }))
        })
    });
    report.record("broadcastable table", Ok(check_broadcastable_table()));
    report.record("copy and scale", check_copy_scale(seed));

    // ── Element-wise ───────────────────────────────────────────
    report.record("add(t, t) == scale(t, 2)", {
        let t = Tensor::random_seeded([4, 10, 12], 1.0, seed);
        t.and_then(|t| Ok(add(&t, &t)?.all_close(&t.scale(2.0), tol)))
    });
    report.record("sub(t, t) == 0", {
        let t = Tensor::random_seeded([7, 9], 1.0, seed);
        t.and_then(|t| Ok(sub(&t, &t)?.as_slice().iter().all(|&x| x == 0.0)))
    });
    report.record("axpy(0, x, y) == broadcast(y)", check_axpy_zero(seed, tol));

    // ── Linear algebra ─────────────────────────────────────────
    report.record("matmul literal", check_matmul_literal(tol));
    report.record("transpose involution", {
        let t = Tensor::random_seeded([29, 13], 1.0, seed);
        t.and_then(|t| Ok(transpose(&transpose(&t)?)? == t))
    });
    report.record("M · M⁻¹ is idempotent", check_inverse_identity(seed, tol));
    report.record("solve four equations", check_solve(tol));

    // ── Convolution ────────────────────────────────────────────
    report.record(
        &format!(
            "conv2d matches reference ({} * {})",
            config.conv.image, config.conv.filters
        ),
        check_conv(config),
    );

    report
}

fn check_get_chain(seed: u64) -> CheckResult {
    let t = Tensor::random_seeded([3, 108, 192], 1.0, seed)?;
    let plane = t.get(2)?;
    let row = plane.get(100)?;
    let cell = row.get(191)?;
    Ok(plane.dims() == [108, 192]
        && row.dims() == [192]
        && cell.dims() == [1]
        && cell.as_slice()[0] == t.as_slice()[2 * 108 * 192 + 100 * 192 + 191])
}

fn check_broadcastable_table() -> bool {
    let big = [11, 5, 13, 9];
    let cases: [(&[usize], bool); 7] = [
        (&[9], true),
        (&[13], false),
        (&[1, 9], true),
        (&[2, 9], false),
        (&[13, 9], true),
        (&[11, 1, 13, 1], true),
        (&[12, 1, 13, 1], false),
    ];
    let Ok(a) = Tensor::zeros(big) else {
        return false;
    };
    cases.iter().all(|&(dims, expected)| {
        Tensor::zeros(dims).is_ok_and(|b| broadcastable(&a, &b) == expected)
    })
}

fn check_copy_scale(seed: u64) -> CheckResult {
    let t = Tensor::random_seeded([5, 6], 1.0, seed)?;
    let copy = t.clone();
    let scaled = copy.scale(12.3);
    Ok(copy == t
        && scaled
            .as_slice()
            .iter()
            .zip(t.as_slice())
            .all(|(&s, &x)| s == x * 12.3))
}

fn check_axpy_zero(seed: u64, tol: f32) -> CheckResult {
    let x = Tensor::random_seeded([6, 8], 1.0, seed)?;
    let y = Tensor::random_seeded([8], 1.0, seed.wrapping_add(1))?;
    let r = axpy(0.0, &x, &y)?;
    let expected = add(&Tensor::zeros([6, 8])?, &y)?;
    Ok(r.all_close(&expected, tol))
}

fn check_matmul_literal(tol: f32) -> CheckResult {
    let m1 = Tensor::from_vec([2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
    let m2 = Tensor::from_vec([2, 2], vec![-1.0, -2.0, -3.0, -4.0])?;
    let expected = Tensor::from_vec([2, 2], vec![-7.0, -10.0, -15.0, -22.0])?;
    Ok(matmul(&m1, &m2)?.all_close(&expected, tol))
}

fn check_inverse_identity(seed: u64, tol: f32) -> CheckResult {
    let n = 32;
    let mut m = Tensor::random_seeded([n, n], 1.0, seed)?;
    for i in 0..n {
        m.as_mut_slice()[i * n + i] += n as f32;
    }
    let ident = matmul(&m, &invert(&m)?)?;
    let isq = matmul(&ident, &ident)?;
    Ok(ident.all_close(&isq, tol))
}

fn check_solve(tol: f32) -> CheckResult {
    let m = Tensor::from_vec(
        [4, 4],
        vec![
            1.0, 1.0, -3.0, 1.0, //
            -5.0, 3.0, -4.0, 1.0, //
            1.0, 0.0, 2.0, -1.0, //
            1.0, 2.0, 0.0, 0.0,
        ],
    )?;
    let b = Tensor::from_vec([4, 1], vec![2.0, 0.0, 1.0, 12.0])?;
    let expected = Tensor::from_vec(
        [4, 1],
        vec![22.0 / 17.0, 91.0 / 17.0, 84.0 / 17.0, 173.0 / 17.0],
    )?;
    Ok(solve(&m, &b)?.all_close(&expected, tol))
}

fn check_conv(config: &HarnessConfig) -> CheckResult {
    let conv = &config.conv;
    let image = Tensor::random_seeded(conv.image.clone(), 1.0, config.seed)?;
    let filters = Tensor::random_seeded(conv.filters.clone(), 1.0, config.seed.wrapping_add(1))?;
    let fast = conv2d(&image, &filters, conv.stride, conv.pad)?;
    let slow = conv2d_reference(&image, &filters, conv.stride, conv.pad)?;
    Ok(fast.all_close(&slow, config.tolerance))
}
