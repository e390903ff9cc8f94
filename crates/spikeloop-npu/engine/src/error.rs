// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Engine error types

use spikeloop_npu_neural::NeuralError;
use thiserror::Error;

/// Errors raised while composing or driving a spiking network
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Neural(#[from] NeuralError),

    #[error("Invalid timestep count {0}: at least one timestep is required")]
    InvalidTimesteps(usize),

    #[error("Network has no spiking stage")]
    NoSpikingStage,

    #[error("Invalid static prefix of length {len}: {reason}")]
    InvalidPartition { len: usize, reason: String },

    #[error("Transform '{stage}' failed: {reason}")]
    Transform { stage: String, reason: String },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Network output at timestep {timestep} is not a spike: {value} (the last stage must be spiking)")]
    NonBinaryOutput { timestep: usize, value: f32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, EngineError>;
