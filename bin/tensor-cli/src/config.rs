// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Harness configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! seed = 42
//! iterations = 100
//! matrix_size = 512
//! tolerance = 0.001
//!
//! [conv]
//! image = [3, 512, 256]
//! filters = [8, 3, 3, 3]
//! stride = 1
//! pad = 1
//! ```
//!
//! Every key is optional; missing keys take the values of
//! [`HarnessConfig::default`].

use std::path::{Path, PathBuf};

use tensor_core::Shape;

/// Errors raised while loading or validating a [`HarnessConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML text is malformed or has the wrong types.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("TOML serialise error: {0}")]
    Serialise(#[from] toml::ser::Error),

    /// A value is outside its valid range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the check and bench commands.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Seed for every randomly filled tensor.
    pub seed: u64,
    /// Repetitions per timed operation.
    pub iterations: usize,
    /// Side length of the square matrices used for timing `add` and `matmul`.
    pub matrix_size: usize,
    /// Absolute tolerance for element-wise comparisons.
    pub tolerance: f32,
    /// Convolution workload.
    pub conv: ConvConfig,
}

/// Shapes and hyper-parameters of the convolution workload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvConfig {
    /// Image shape `[C, H, W]`.
    pub image: Shape,
    /// Filter bank shape `[outC, C, kh, kw]`.
    pub filters: Shape,
    pub stride: usize,
    pub pad: usize,
}

impl Default for ConvConfig {
    fn default() -> Self {
        Self {
            image: Shape::from([3, 512, 256]),
            filters: Shape::from([8, 3, 3, 3]),
            stride: 1,
            pad: 1,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: 100,
            matrix_size: 512,
            tolerance: 1e-3,
            conv: ConvConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges and that the convolution shapes fit together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be at least 1".into()));
        }
        if self.matrix_size == 0 {
            return Err(ConfigError::Invalid("matrix_size must be at least 1".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }

        let conv = &self.conv;
        if conv.image.rank() != 3 || conv.filters.rank() != 4 {
            return Err(ConfigError::Invalid(format!(
                "conv expects image [C, H, W] and filters [outC, C, kh, kw], got {} and {}",
                conv.image, conv.filters
            )));
        }
        if conv.image.dim(0) != conv.filters.dim(1) {
            return Err(ConfigError::Invalid(format!(
                "conv channel mismatch: image {} vs filters {}",
                conv.image, conv.filters
            )));
        }
        for shape in [&conv.image, &conv.filters] {
            shape
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("conv: {e}")))?;
        }
        let dims = conv.image.dims();
        let kernel = conv.filters.dims();
        tensor_core::conv_output_dims(dims[1], dims[2], kernel[2], kernel[3], conv.stride, conv.pad)
            .map_err(|e| ConfigError::Invalid(format!("conv: {e}")))?;
        Ok(())
    }
}
