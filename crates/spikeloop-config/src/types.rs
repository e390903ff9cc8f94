// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `spikeloop.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpikeloopConfig {
    pub neuron: NeuronConfig,
    pub surrogate: SurrogateConfig,
    pub simulation: SimulationConfig,
    pub encoder: EncoderConfig,
    pub logging: LoggingConfig,
}

/// Spiking neuron construction surface
///
/// TOML has no null, so subtractive reset is selected with `soft_reset = true`
/// rather than by omitting `v_reset`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronConfig {
    /// "if" or "lif"
    pub model: String,
    pub v_threshold: f32,
    pub v_reset: f32,
    pub soft_reset: bool,
    pub v_init: Option<f32>,
    /// Membrane time constant (lif only)
    pub tau: f32,
    pub detach_reset: bool,
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            model: "if".to_string(),
            v_threshold: 1.0,
            v_reset: 0.0,
            soft_reset: false,
            v_init: None,
            tau: 2.0,
            detach_reset: false,
        }
    }
}

impl NeuronConfig {
    /// Fixed reset value, or `None` in soft-reset mode
    pub fn effective_reset(&self) -> Option<f32> {
        if self.soft_reset {
            None
        } else {
            Some(self.v_reset)
        }
    }
}

/// Surrogate gradient family
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SurrogateConfig {
    /// "sigmoid", "atan" or "triangle"
    pub kind: String,
    /// Sharpness; the family default when absent
    pub alpha: Option<f32>,
}

impl Default for SurrogateConfig {
    fn default() -> Self {
        Self {
            kind: "sigmoid".to_string(),
            alpha: None,
        }
    }
}

/// Temporal driver settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of timesteps T per sample
    pub timesteps: usize,
    /// Seed for stochastic encoders and weight initialisation
    pub seed: u64,
    pub batch_size: usize,
    /// Keep every per-timestep spike tensor in the simulation output
    pub record_spikes: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timesteps: 8,
            seed: 0,
            batch_size: 16,
            record_spikes: false,
        }
    }
}

/// Input encoder selection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// "direct" (static, hoisted into the static prefix) or "poisson"
    pub kind: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            kind: "direct".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    pub level: String,
    /// "text" or "json"
    pub format: String,
    /// Directory for rolling log files (file-logging feature)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            log_dir: None,
        }
    }
}
