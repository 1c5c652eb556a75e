// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-check
//!
//! Command-line harness for the tensor-core library.
//!
//! ## Usage
//! ```bash
//! # Run the correctness suite
//! tensor-check check
//!
//! # Time add, matmul and conv2d
//! tensor-check bench --iterations 20 --size 256
//!
//! # Print a random tensor
//! tensor-check print --shape 2,3,4 --seed 7
//!
//! # Show the configuration in effect
//! tensor-check --config harness.toml config
//! ```

mod commands;
mod config;

use clap::{Parser, Subcommand};

use config::HarnessConfig;

#[derive(Parser)]
#[command(
    name = "tensor-check",
    about = "Correctness and timing harness for the tensor-core engine",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the correctness suite and report pass/fail counts.
    Check,

    /// Time element-wise add, matmul and both conv2d implementations.
    Bench {
        /// Repetitions per timed operation (overrides the config file).
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Side length of the square benchmark matrices (overrides the config file).
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Print a randomly filled tensor.
    Print {
        /// Comma-separated dimensions (e.g., "2,3,4").
        #[arg(long, value_delimiter = ',', default_value = "2,3")]
        shape: Vec<usize>,

        /// Values are drawn uniformly from [-scale, scale].
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// RNG seed (defaults to the configured seed).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Check => commands::check::execute(&config),
        Commands::Bench { iterations, size } => {
            let mut config = config;
            if let Some(iterations) = iterations {
                config.iterations = iterations;
            }
            if let Some(size) = size {
                config.matrix_size = size;
            }
            config.validate()?;
            commands::bench::execute(&config)
        }
        Commands::Print { shape, scale, seed } => {
            commands::print::execute(shape, scale, seed.unwrap_or(config.seed))
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
