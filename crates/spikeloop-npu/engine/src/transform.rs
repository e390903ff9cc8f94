// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Stateless Transforms
//!
//! Operators with no temporal memory. The `&self` receiver on
//! [`StatelessTransform::apply`] is what makes a transform safe to hoist into
//! a network's static prefix: its output depends on its input alone.
//!
//! These are forward-only; gradient flow through them belongs to whatever
//! array/autodiff substrate owns training.

use std::fmt;

use ndarray::{Array1, Array2, ArrayD, Ix2, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spikeloop_npu_neural::Tensor;

use crate::error::{EngineError, Result};

/// A pure tensor-to-tensor operator
pub trait StatelessTransform: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    fn apply(&self, input: &Tensor) -> Result<Tensor>;
}

/// Affine projection `[B, in] -> [B, out]`
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    /// `[out, in]`
    weights: Array2<f32>,
    bias: Option<Array1<f32>>,
}

impl Linear {
    pub fn new(weights: Array2<f32>, bias: Option<Array1<f32>>) -> Result<Self> {
        if weights.is_empty() {
            return Err(EngineError::InvalidConfig(
                "linear weights must be non-empty".to_string(),
            ));
        }
        if let Some(b) = &bias {
            if b.len() != weights.nrows() {
                return Err(EngineError::ShapeMismatch {
                    expected: vec![weights.nrows()],
                    actual: b.shape().to_vec(),
                });
            }
        }
        Ok(Self { weights, bias })
    }

    /// Uniform init in `±1/sqrt(in_features)` from an explicit seed
    ///
    /// Identical seeds give identical weights on every platform.
    pub fn seeded(in_features: usize, out_features: usize, seed: u64) -> Result<Self> {
        if in_features == 0 || out_features == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "linear dimensions must be non-zero (in={}, out={})",
                in_features, out_features
            )));
        }
        let bound = 1.0 / (in_features as f32).sqrt();
        let mut rng = StdRng::seed_from_u64(seed);
        let weights = Array2::from_shape_fn((out_features, in_features), |_| {
            rng.gen_range(-bound..bound)
        });
        let bias = Array1::from_shape_fn(out_features, |_| rng.gen_range(-bound..bound));
        Self::new(weights, Some(bias))
    }

    pub fn in_features(&self) -> usize {
        self.weights.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn bias(&self) -> Option<&Array1<f32>> {
        self.bias.as_ref()
    }
}

impl StatelessTransform for Linear {
    fn name(&self) -> &str {
        "linear"
    }

    fn apply(&self, input: &Tensor) -> Result<Tensor> {
        let rows = input.shape().first().copied().unwrap_or(0);
        let x = input
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| EngineError::ShapeMismatch {
                expected: vec![rows, self.in_features()],
                actual: input.shape().to_vec(),
            })?;
        if x.ncols() != self.in_features() {
            return Err(EngineError::ShapeMismatch {
                expected: vec![x.nrows(), self.in_features()],
                actual: input.shape().to_vec(),
            });
        }

        let mut out = x.dot(&self.weights.t());
        if let Some(bias) = &self.bias {
            out += bias;
        }
        Ok(out.into_dyn())
    }
}

/// Collapses every axis after the batch axis: `[B, ...] -> [B, N]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flatten;

impl StatelessTransform for Flatten {
    fn name(&self) -> &str {
        "flatten"
    }

    fn apply(&self, input: &Tensor) -> Result<Tensor> {
        let Some((&batch, rest)) = input.shape().split_first() else {
            return Err(EngineError::Transform {
                stage: self.name().to_string(),
                reason: "cannot flatten a 0-dimensional tensor".to_string(),
            });
        };
        let features: usize = rest.iter().product();
        ArrayD::from_shape_vec(IxDyn(&[batch, features]), input.iter().copied().collect())
            .map_err(|e| EngineError::Transform {
                stage: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}

/// Multiplies every element by a constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub factor: f32,
}

impl Scale {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }
}

impl StatelessTransform for Scale {
    fn name(&self) -> &str {
        "scale"
    }

    fn apply(&self, input: &Tensor) -> Result<Tensor> {
        let factor = self.factor;
        Ok(input.mapv(|v| v * factor))
    }
}

type TransformFn = dyn Fn(&Tensor) -> Result<Tensor> + Send + Sync;

/// Wraps a pure closure as a transform
///
/// The closure must not capture mutable state; the composer assumes it returns
/// the same output for the same input on every call.
pub struct FnTransform {
    name: String,
    f: Box<TransformFn>,
}

impl FnTransform {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Tensor) -> Result<Tensor> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }

    /// Elementwise map, e.g. a clamp or normalisation
    pub fn elementwise<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        Self::new(name, move |x: &Tensor| Ok(x.mapv(|v| f(v))))
    }
}

impl fmt::Debug for FnTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform").field("name", &self.name).finish()
    }
}

impl StatelessTransform for FnTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &Tensor) -> Result<Tensor> {
        (self.f)(input)
    }
}
