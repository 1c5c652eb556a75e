// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tensor-check print` command: fill a tensor from a seeded RNG and print it.

use tensor_core::Tensor;

pub fn execute(shape: Vec<usize>, scale: f32, seed: u64) -> anyhow::Result<()> {
    let tensor = Tensor::random_seeded(shape, scale, seed)?;
    tracing::info!(shape = %tensor.shape(), seed, "printing random tensor");
    print!("{tensor}");
    Ok(())
}
