// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tensor alias and small shape helpers

use ndarray::ArrayD;

use super::error::{NeuralError, Result};

/// Dense `f32` tensor of arbitrary rank (batch dimension first by convention)
pub type Tensor = ArrayD<f32>;

/// Unit step with `Θ(0) = 1`
#[inline(always)]
pub fn heaviside(x: f32) -> f32 {
    if x >= 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Fail with `ShapeMismatch` unless `actual` has exactly the `expected` shape.
///
/// No broadcasting: a `[1, 4]` input against `[8, 4]` state is an error.
pub fn check_shape(expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected != actual {
        return Err(NeuralError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}
