// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sigmoid Surrogate
//!
//! ```text
//! σ(x)  = 1 / (1 + exp(-αx))
//! σ'(x) = α · σ(x) · (1 - σ(x))        peak α/4 at x = 0
//! ```

use super::traits::SurrogateFunction;
use super::validate_alpha;
use crate::types::Result;

pub const DEFAULT_ALPHA: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sigmoid {
    alpha: f32,
}

impl Sigmoid {
    pub fn new(alpha: f32) -> Result<Self> {
        Ok(Self {
            alpha: validate_alpha(alpha)?,
        })
    }
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SurrogateFunction for Sigmoid {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline(always)]
    fn primitive(&self, x: f32) -> f32 {
        1.0 / (1.0 + (-self.alpha * x).exp())
    }

    #[inline(always)]
    fn derivative(&self, x: f32) -> f32 {
        let s = self.primitive(x);
        self.alpha * s * (1.0 - s)
    }
}
