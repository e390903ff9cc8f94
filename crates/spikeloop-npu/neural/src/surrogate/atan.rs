// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Arctangent Surrogate
//!
//! ```text
//! σ(x)  = 1/2 + atan(π/2 · α · x) / π
//! σ'(x) = (α/2) / (1 + (π/2 · α · x)²)   peak α/2 at x = 0
//! ```
//!
//! Heavier tails than the sigmoid: neurons far from threshold still receive
//! a small gradient.

use core::f32::consts::{FRAC_PI_2, PI};

use super::traits::SurrogateFunction;
use super::validate_alpha;
use crate::types::Result;

pub const DEFAULT_ALPHA: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ATan {
    alpha: f32,
}

impl ATan {
    pub fn new(alpha: f32) -> Result<Self> {
        Ok(Self {
            alpha: validate_alpha(alpha)?,
        })
    }
}

impl Default for ATan {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SurrogateFunction for ATan {
    fn name(&self) -> &'static str {
        "atan"
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline(always)]
    fn primitive(&self, x: f32) -> f32 {
        0.5 + (FRAC_PI_2 * (self.alpha * x)).atan() / PI
    }

    #[inline(always)]
    fn derivative(&self, x: f32) -> f32 {
        // α·x first: π/2·α alone overflows for α near f32::MAX, and inf·0 is NaN
        let scaled = FRAC_PI_2 * (self.alpha * x);
        (self.alpha / 2.0) / (1.0 + scaled * scaled)
    }
}
