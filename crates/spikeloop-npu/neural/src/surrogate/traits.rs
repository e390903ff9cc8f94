// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Surrogate function trait

use core::fmt::Debug;

use crate::types::{heaviside, Tensor};

/// A spike decision with an attached backward rule.
///
/// Forward evaluation (`spike`) is always the exact unit step with `Θ(0) = 1`.
/// Backward evaluation (`gradient`) is `σ'(x)` for the family's smooth curve `σ`,
/// bounded everywhere so that no input can produce a non-finite gradient.
///
/// Implementors supply the scalar `primitive` and `derivative`; the tensor
/// methods are derived from them.
pub trait SurrogateFunction: Send + Sync + Debug {
    /// Human-readable family name
    fn name(&self) -> &'static str;

    /// Sharpness coefficient bound at construction
    fn alpha(&self) -> f32;

    /// The smooth curve `σ(x)` whose derivative stands in for `δ(x)`
    fn primitive(&self, x: f32) -> f32;

    /// `σ'(x)`
    fn derivative(&self, x: f32) -> f32;

    /// Forward rule: elementwise `Θ(x)`, values exactly 0.0 or 1.0
    fn spike(&self, x: &Tensor) -> Tensor {
        x.mapv(heaviside)
    }

    /// Backward rule: elementwise `σ'(x)`
    fn gradient(&self, x: &Tensor) -> Tensor {
        x.mapv(|v| self.derivative(v))
    }
}
