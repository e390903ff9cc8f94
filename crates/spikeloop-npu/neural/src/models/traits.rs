// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron model trait

use core::fmt::Debug;

/// Charge equation of a spiking neuron model.
///
/// The gains are the partial derivatives of `charge` and are constant for
/// every shipped model, which keeps backpropagation-through-time a pair of
/// scalar multiplies per element.
pub trait NeuronModel: Send + Sync + Debug {
    /// Get model name (for debugging/logging)
    fn model_name(&self) -> &'static str;

    /// `H(t) = f(V(t-1), X(t))`
    ///
    /// `v_rest` is the potential the model leaks toward (`V_reset`, or 0.0 in
    /// subtractive-reset mode). Models without leak ignore it.
    fn charge(&self, v: f32, x: f32, v_rest: f32) -> f32;

    /// `∂H/∂X`
    fn input_gain(&self) -> f32;

    /// `∂H/∂V`
    fn potential_gain(&self) -> f32;
}
