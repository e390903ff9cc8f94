// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Surrogate Gradient Functions
//!
//! The spike decision `Θ(H - V_threshold)` has zero derivative almost
//! everywhere. A surrogate keeps the forward pass a hard step and swaps in
//! the derivative of a smooth curve `σ` for the backward pass.
//!
//! ## Adding a New Surrogate
//!
//! 1. Create `src/surrogate/your_surrogate.rs`
//! 2. Implement `SurrogateFunction` (`primitive` and `derivative` are enough)
//! 3. Add a `SurrogateKind` variant so it can be selected from configuration
//! 4. Add tests

pub mod atan;
pub mod sigmoid;
pub mod traits;
pub mod triangle;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::Result;

pub use atan::ATan;
pub use sigmoid::Sigmoid;
pub use traits::SurrogateFunction;
pub use triangle::Triangle;

/// Serializable selector for a surrogate family and its sharpness.
///
/// The family is resolved once, at neuron construction, into a shared
/// `Arc<dyn SurrogateFunction>` that every `step` reuses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurrogateKind {
    Sigmoid { alpha: f32 },
    #[serde(rename = "atan")]
    ATan { alpha: f32 },
    Triangle { alpha: f32 },
}

impl SurrogateKind {
    /// Validate the parameter set and build the shared function object
    pub fn build(&self) -> Result<Arc<dyn SurrogateFunction>> {
        Ok(match *self {
            SurrogateKind::Sigmoid { alpha } => Arc::new(Sigmoid::new(alpha)?),
            SurrogateKind::ATan { alpha } => Arc::new(ATan::new(alpha)?),
            SurrogateKind::Triangle { alpha } => Arc::new(Triangle::new(alpha)?),
        })
    }

    pub fn alpha(&self) -> f32 {
        match *self {
            SurrogateKind::Sigmoid { alpha }
            | SurrogateKind::ATan { alpha }
            | SurrogateKind::Triangle { alpha } => alpha,
        }
    }

    /// Family name used in configuration files ("sigmoid", "atan", "triangle")
    pub fn family(&self) -> &'static str {
        match self {
            SurrogateKind::Sigmoid { .. } => "sigmoid",
            SurrogateKind::ATan { .. } => "atan",
            SurrogateKind::Triangle { .. } => "triangle",
        }
    }
}

impl Default for SurrogateKind {
    fn default() -> Self {
        SurrogateKind::Sigmoid {
            alpha: sigmoid::DEFAULT_ALPHA,
        }
    }
}

/// Reject sharpness values that would make the backward rule degenerate
pub(crate) fn validate_alpha(alpha: f32) -> Result<f32> {
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(crate::types::NeuralError::InvalidSurrogateAlpha(alpha));
    }
    Ok(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NeuralError;
    use ndarray::{arr1, ArrayD};

    fn all_kinds() -> Vec<SurrogateKind> {
        vec![
            SurrogateKind::Sigmoid { alpha: 4.0 },
            SurrogateKind::ATan { alpha: 2.0 },
            SurrogateKind::Triangle { alpha: 1.0 },
        ]
    }

    #[test]
    fn test_build_rejects_bad_alpha() {
        for alpha in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = SurrogateKind::ATan { alpha }.build().unwrap_err();
            assert!(matches!(err, NeuralError::InvalidSurrogateAlpha(_)));
        }
    }

    #[test]
    fn test_every_family_is_a_hard_step_forward() {
        let x: ArrayD<f32> = arr1(&[-3.0, -0.5, -1e-6, 0.0, 1e-6, 0.5, 3.0]).into_dyn();
        for kind in all_kinds() {
            let surrogate = kind.build().unwrap();
            let spikes = surrogate.spike(&x);
            assert_eq!(
                spikes.as_slice().unwrap(),
                &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
                "{} forward",
                surrogate.name()
            );
        }
    }

    #[test]
    fn test_gradient_peaks_at_zero_and_stays_finite() {
        for kind in all_kinds() {
            let surrogate = kind.build().unwrap();
            let peak = surrogate.derivative(0.0);
            assert!(peak > 0.0 && peak.is_finite());
            for x in [-1e6_f32, -10.0, -0.3, 0.3, 10.0, 1e6] {
                let g = surrogate.derivative(x);
                assert!(g.is_finite(), "{} gradient at {}", surrogate.name(), x);
                assert!(g >= 0.0);
                assert!(g <= peak);
            }
            // Symmetric around the threshold
            assert!((surrogate.derivative(0.25) - surrogate.derivative(-0.25)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_extreme_alpha_stays_finite_at_threshold() {
        for alpha in [3.0e38_f32, f32::MAX] {
            let kinds = [
                SurrogateKind::Sigmoid { alpha },
                SurrogateKind::ATan { alpha },
                SurrogateKind::Triangle { alpha },
            ];
            for kind in kinds {
                let surrogate = kind.build().unwrap();
                for x in [0.0_f32, -0.0, 1e-38, -1e-38, 0.3, -1e6, 1e6] {
                    let g = surrogate.derivative(x);
                    assert!(g.is_finite(), "{} alpha={} gradient at {}", surrogate.name(), alpha, x);
                    assert!(g >= 0.0);
                    assert!(surrogate.primitive(x).is_finite());
                }
                assert!(surrogate.derivative(0.0) > 0.0);
            }
        }
    }

    #[test]
    fn test_gradient_matches_numerical_derivative_of_primitive() {
        let h = 1e-3_f32;
        for kind in all_kinds() {
            let surrogate = kind.build().unwrap();
            for x in [-0.7_f32, -0.2, 0.1, 0.45] {
                let numeric = (surrogate.primitive(x + h) - surrogate.primitive(x - h)) / (2.0 * h);
                let analytic = surrogate.derivative(x);
                assert!(
                    (numeric - analytic).abs() < 1e-2,
                    "{} at {}: numeric {} vs analytic {}",
                    surrogate.name(),
                    x,
                    numeric,
                    analytic
                );
            }
        }
    }

    #[test]
    fn test_kind_roundtrips_through_serde() {
        let json = r#"{"kind":"atan","alpha":2.5}"#;
        let kind: SurrogateKind = serde_json::from_str(json).unwrap();
        assert_eq!(kind, SurrogateKind::ATan { alpha: 2.5 });
        assert_eq!(kind.family(), "atan");
        assert_eq!(kind.alpha(), 2.5);
    }
}
