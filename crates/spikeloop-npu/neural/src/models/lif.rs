// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # LIF (Leaky Integrate-and-Fire) Neuron Model
//!
//! ## Model Dynamics
//!
//! ```text
//! Charge:
//!     H(t) = V(t-1) + (X(t) - (V(t-1) - V_rest)) / τ
//!
//!     Where:
//!     - τ = membrane time constant (> 0)
//!     - V_rest = V_reset, or 0.0 when the neuron uses subtractive reset
//!
//! Gradients:
//!     ∂H/∂X = 1/τ
//!     ∂H/∂V = 1 - 1/τ
//! ```
//!
//! With τ = 1 the neuron forgets its history every step (`H = X + V_rest`);
//! larger τ integrates over longer windows.

use super::traits::NeuronModel;
use crate::types::{NeuralError, Result};

/// LIF (Leaky Integrate-and-Fire) neuron model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyIntegrateAndFire {
    tau: f32,
}

impl LeakyIntegrateAndFire {
    /// Create a LIF model, rejecting non-finite or non-positive τ
    pub fn new(tau: f32) -> Result<Self> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(NeuralError::InvalidTimeConstant(tau));
        }
        Ok(Self { tau })
    }

    /// Skip validation; only for τ already checked by `new`
    #[inline(always)]
    pub(crate) fn unchecked(tau: f32) -> Self {
        Self { tau }
    }

    pub fn tau(&self) -> f32 {
        self.tau
    }
}

impl NeuronModel for LeakyIntegrateAndFire {
    fn model_name(&self) -> &'static str {
        "Leaky Integrate-and-Fire (LIF)"
    }

    #[inline(always)]
    fn charge(&self, v: f32, x: f32, v_rest: f32) -> f32 {
        v + (x - (v - v_rest)) / self.tau
    }

    #[inline(always)]
    fn input_gain(&self) -> f32 {
        1.0 / self.tau
    }

    #[inline(always)]
    fn potential_gain(&self) -> f32 {
        1.0 - 1.0 / self.tau
    }
}
