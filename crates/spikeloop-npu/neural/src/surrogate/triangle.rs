// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Triangle Surrogate
//!
//! ```text
//! σ'(x) = max(0, α · (1 - α·|x|))       support |x| < 1/α, peak α, area 1
//! ```
//!
//! The only shipped family whose gradient is exactly zero away from the
//! threshold, so neurons far from firing receive no update.

use super::traits::SurrogateFunction;
use super::validate_alpha;
use crate::types::Result;

pub const DEFAULT_ALPHA: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    alpha: f32,
}

impl Triangle {
    pub fn new(alpha: f32) -> Result<Self> {
        Ok(Self {
            alpha: validate_alpha(alpha)?,
        })
    }
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SurrogateFunction for Triangle {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn primitive(&self, x: f32) -> f32 {
        let u = (self.alpha * x).clamp(-1.0, 1.0);
        if u <= 0.0 {
            0.5 * (1.0 + u) * (1.0 + u)
        } else {
            1.0 - 0.5 * (1.0 - u) * (1.0 - u)
        }
    }

    #[inline(always)]
    fn derivative(&self, x: f32) -> f32 {
        (self.alpha * (1.0 - self.alpha * x.abs())).max(0.0)
    }
}
