// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for neuron construction and stepping

/// Errors raised by surrogates, neuron models and neuron state machines.
///
/// Configuration variants are raised at construction and are never silently
/// corrected. Shape and gradient variants are usage errors raised per call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    #[error("Invalid threshold: v_threshold ({v_threshold}) must be greater than v_reset ({v_reset})")]
    InvalidThreshold { v_threshold: f32, v_reset: f32 },

    #[error("Invalid membrane time constant: tau must be finite and > 0, got {0}")]
    InvalidTimeConstant(f32),

    #[error("Invalid surrogate sharpness: alpha must be finite and > 0, got {0}")]
    InvalidSurrogateAlpha(f32),

    #[error("Invalid neuron parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Shape mismatch: neuron state has shape {expected:?}, input has shape {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Gradient unavailable: {0}")]
    GradientUnavailable(String),
}

pub type Result<T> = core::result::Result<T, NeuralError>;
