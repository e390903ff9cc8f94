// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # IF (Integrate-and-Fire) Neuron Model
//!
//! ```text
//! H(t) = V(t-1) + X(t)
//! ```
//!
//! A perfect integrator: input accumulates without loss until the neuron fires.

use super::traits::NeuronModel;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntegrateAndFire;

impl NeuronModel for IntegrateAndFire {
    fn model_name(&self) -> &'static str {
        "Integrate-and-Fire (IF)"
    }

    #[inline(always)]
    fn charge(&self, v: f32, x: f32, _v_rest: f32) -> f32 {
        v + x
    }

    #[inline(always)]
    fn input_gain(&self) -> f32 {
        1.0
    }

    #[inline(always)]
    fn potential_gain(&self) -> f32 {
        1.0
    }
}
