// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Spiking Neuron State Machine
//!
//! One `SpikingNeuron` owns the membrane potential of a whole layer: one value
//! per neuron instance per batch element. Every `step` runs
//!
//! 1. **Charge**: `H(t) = f(V(t-1), X(t))` (see [`crate::models`])
//! 2. **Discharge**: `S(t) = spike(H(t) - V_threshold)` (see [`crate::surrogate`])
//! 3. **Reset**: fixed (`V_reset`) or subtractive (`V_threshold`)
//!
//! ## Training Mode
//!
//! With `set_training(true)` the neuron records `H(t)` and `S(t)` for every
//! step so that [`SpikingNeuron::backward`] can run backpropagation-through-time
//! with the surrogate gradient standing in for `dS/dH`. `reset` discards the
//! recording together with the potential.
//!
//! ## Caller Obligation
//!
//! The neuron cannot see sample boundaries. Forgetting `reset` between
//! independent samples leaks the previous sample's potential into the next one.

use std::sync::Arc;

use ndarray::Zip;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{ChargeModel, NeuronModel};
use crate::surrogate::{SurrogateFunction, SurrogateKind};
use crate::types::{check_shape, NeuralError, Result, Tensor};

/// Element count above which charge and reset use rayon.
///
/// Below this the thread-pool handoff costs more than the arithmetic.
const PARALLEL_ELEMENT_THRESHOLD: usize = 32_768;

/// Construction-time configuration of a spiking neuron layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronParameters {
    /// Firing threshold
    pub v_threshold: f32,

    /// Fixed reset value; `None` selects subtractive (soft) reset
    pub v_reset: Option<f32>,

    /// Explicit initial potential; defaults to `v_reset`, or 0.0 in soft mode
    pub v_init: Option<f32>,

    /// Treat the spike inside the reset equation as a constant during backward
    pub detach_reset: bool,

    pub model: ChargeModel,

    pub surrogate: SurrogateKind,
}

impl NeuronParameters {
    /// IF neuron with default threshold 1.0 and fixed reset to 0.0
    pub fn integrate_and_fire() -> Self {
        Self::default()
    }

    /// LIF neuron with membrane time constant `tau`
    pub fn leaky(tau: f32) -> Self {
        Self {
            model: ChargeModel::LeakyIntegrateAndFire { tau },
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, v_threshold: f32) -> Self {
        self.v_threshold = v_threshold;
        self
    }

    /// Fixed reset to `v_reset`
    pub fn with_reset(mut self, v_reset: f32) -> Self {
        self.v_reset = Some(v_reset);
        self
    }

    /// Subtractive reset: `V(t) = H(t) - S(t)·V_threshold`
    pub fn with_soft_reset(mut self) -> Self {
        self.v_reset = None;
        self
    }

    pub fn with_initial_potential(mut self, v_init: f32) -> Self {
        self.v_init = Some(v_init);
        self
    }

    pub fn with_detach_reset(mut self, detach_reset: bool) -> Self {
        self.detach_reset = detach_reset;
        self
    }

    pub fn with_surrogate(mut self, surrogate: SurrogateKind) -> Self {
        self.surrogate = surrogate;
        self
    }

    /// Potential a fresh or freshly reset neuron starts from
    pub fn initial_potential(&self) -> f32 {
        self.v_init.or(self.v_reset).unwrap_or(0.0)
    }

    /// Potential the leak pulls toward (LIF only)
    pub fn rest_potential(&self) -> f32 {
        self.v_reset.unwrap_or(0.0)
    }

    pub fn is_soft_reset(&self) -> bool {
        self.v_reset.is_none()
    }

    /// Check every construction-time constraint
    ///
    /// # Errors
    ///
    /// - `InvalidThreshold` when a fixed `v_reset` is not strictly below `v_threshold`
    /// - `InvalidTimeConstant` for a non-finite or non-positive LIF τ
    /// - `InvalidSurrogateAlpha` for a non-finite or non-positive sharpness
    /// - `InvalidParameter` for non-finite threshold, reset or initial values
    pub fn validate(&self) -> Result<()> {
        if !self.v_threshold.is_finite() {
            return Err(NeuralError::InvalidParameter {
                name: "v_threshold",
                reason: format!("must be finite, got {}", self.v_threshold),
            });
        }
        if let Some(v_reset) = self.v_reset {
            if !v_reset.is_finite() {
                return Err(NeuralError::InvalidParameter {
                    name: "v_reset",
                    reason: format!("must be finite, got {}", v_reset),
                });
            }
            if self.v_threshold <= v_reset {
                return Err(NeuralError::InvalidThreshold {
                    v_threshold: self.v_threshold,
                    v_reset,
                });
            }
        }
        if let Some(v_init) = self.v_init {
            if !v_init.is_finite() {
                return Err(NeuralError::InvalidParameter {
                    name: "v_init",
                    reason: format!("must be finite, got {}", v_init),
                });
            }
        }
        self.model.validate()?;
        self.surrogate.build()?;
        Ok(())
    }
}

impl Default for NeuronParameters {
    fn default() -> Self {
        Self {
            v_threshold: 1.0,
            v_reset: Some(0.0),
            v_init: None,
            detach_reset: false,
            model: ChargeModel::IntegrateAndFire,
            surrogate: SurrogateKind::default(),
        }
    }
}

/// `H(t)` and `S(t)` of one recorded timestep
#[derive(Debug, Clone)]
struct StepRecord {
    charge: Tensor,
    spikes: Tensor,
}

/// A layer of spiking neurons sharing one parameter set
#[derive(Debug, Clone)]
pub struct SpikingNeuron {
    params: NeuronParameters,
    surrogate: Arc<dyn SurrogateFunction>,
    /// `None` until the first step fixes the state shape
    potential: Option<Tensor>,
    training: bool,
    trace: Vec<StepRecord>,
}

impl SpikingNeuron {
    /// Validate `params` and bind the configured surrogate
    pub fn new(params: NeuronParameters) -> Result<Self> {
        params.validate()?;
        let surrogate = params.surrogate.build()?;
        Ok(Self::assemble(params, surrogate))
    }

    /// Bind a caller-supplied surrogate instead of `params.surrogate`
    pub fn with_surrogate_fn(
        params: NeuronParameters,
        surrogate: Arc<dyn SurrogateFunction>,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self::assemble(params, surrogate))
    }

    fn assemble(params: NeuronParameters, surrogate: Arc<dyn SurrogateFunction>) -> Self {
        debug!(
            "[NEURON] {} threshold={} reset={:?} surrogate={}(alpha={}) detach_reset={}",
            params.model.model_name(),
            params.v_threshold,
            params.v_reset,
            surrogate.name(),
            surrogate.alpha(),
            params.detach_reset
        );
        Self {
            params,
            surrogate,
            potential: None,
            training: false,
            trace: Vec::new(),
        }
    }

    pub fn parameters(&self) -> &NeuronParameters {
        &self.params
    }

    pub fn surrogate(&self) -> &Arc<dyn SurrogateFunction> {
        &self.surrogate
    }

    /// Current potential, or `None` before the first step after construction/reset
    pub fn membrane_potential(&self) -> Option<&Tensor> {
        self.potential.as_ref()
    }

    pub fn initial_potential(&self) -> f32 {
        self.params.initial_potential()
    }

    /// Shape fixed by the first step, if any
    pub fn state_shape(&self) -> Option<&[usize]> {
        self.potential.as_ref().map(|v| v.shape())
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Enable or disable recording for `backward`
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    /// Number of timesteps recorded since the last reset
    pub fn recorded_steps(&self) -> usize {
        self.trace.len()
    }

    /// Advance one timestep: charge, discharge, reset. Returns `S(t)`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `input` differs in shape from the established state.
    /// The neuron is left untouched in that case.
    pub fn step(&mut self, input: &Tensor) -> Result<Tensor> {
        if let Some(v) = &self.potential {
            check_shape(v.shape(), input.shape())?;
        }
        if input.is_empty() {
            warn!("[NEURON] stepping with an empty input tensor {:?}", input.shape());
        }

        let previous = match self.potential.take() {
            Some(v) => v,
            None => Tensor::from_elem(input.raw_dim(), self.params.initial_potential()),
        };

        let charge = self.charge(&previous, input);
        let v_threshold = self.params.v_threshold;
        let spikes = self.surrogate.spike(&charge.mapv(|h| h - v_threshold));
        let next = self.apply_reset(&charge, &spikes);

        self.potential = Some(next);
        if self.training {
            self.trace.push(StepRecord {
                charge,
                spikes: spikes.clone(),
            });
        }
        Ok(spikes)
    }

    /// Restore the configured initial potential and drop any recorded trace.
    ///
    /// The state tensor is released: [`membrane_potential`](Self::membrane_potential)
    /// reads `None` until the next `step`, which charges from
    /// [`initial_potential`](Self::initial_potential) at whatever shape it is
    /// given (e.g. a smaller final batch).
    pub fn reset(&mut self) {
        self.potential = None;
        self.trace.clear();
    }

    fn charge(&self, previous: &Tensor, input: &Tensor) -> Tensor {
        let model = self.params.model;
        let v_rest = self.params.rest_potential();
        let zip = Zip::from(previous).and(input);
        if input.len() >= PARALLEL_ELEMENT_THRESHOLD {
            zip.par_map_collect(|&v, &x| model.charge(v, x, v_rest))
        } else {
            zip.map_collect(|&v, &x| model.charge(v, x, v_rest))
        }
    }

    fn apply_reset(&self, charge: &Tensor, spikes: &Tensor) -> Tensor {
        let v_threshold = self.params.v_threshold;
        let v_reset = self.params.v_reset;
        let reset = move |&h: &f32, &s: &f32| match v_reset {
            Some(v_reset) => h * (1.0 - s) + v_reset * s,
            None => h - s * v_threshold,
        };
        let zip = Zip::from(charge).and(spikes);
        if charge.len() >= PARALLEL_ELEMENT_THRESHOLD {
            zip.par_map_collect(reset)
        } else {
            zip.map_collect(reset)
        }
    }

    /// Backpropagation-through-time over the recorded steps.
    ///
    /// `grad_spikes[t]` is `dL/dS(t)`; the result holds `dL/dX(t)` for each
    /// recorded step, in order. The surrogate's `gradient` replaces `dS/dH`;
    /// with `detach_reset` the spike inside the reset equation is a constant.
    ///
    /// # Errors
    ///
    /// `GradientUnavailable` if nothing was recorded or the gradient count
    /// differs from the recorded step count; `ShapeMismatch` for a gradient
    /// whose shape differs from the recorded spikes.
    pub fn backward(&self, grad_spikes: &[Tensor]) -> Result<Vec<Tensor>> {
        if self.trace.is_empty() {
            return Err(NeuralError::GradientUnavailable(
                "no recorded timesteps; enable training mode before stepping".to_string(),
            ));
        }
        if grad_spikes.len() != self.trace.len() {
            return Err(NeuralError::GradientUnavailable(format!(
                "expected {} spike gradients (one per recorded step), got {}",
                self.trace.len(),
                grad_spikes.len()
            )));
        }
        for (record, grad) in self.trace.iter().zip(grad_spikes) {
            check_shape(record.spikes.shape(), grad.shape())?;
        }

        let v_threshold = self.params.v_threshold;
        let v_reset = self.params.v_reset;
        let detach = self.params.detach_reset;
        let input_gain = self.params.model.input_gain();
        let potential_gain = self.params.model.potential_gain();

        let mut grad_potential = Tensor::zeros(self.trace[0].spikes.raw_dim());
        let mut grad_inputs = Vec::with_capacity(self.trace.len());

        for (record, grad_s) in self.trace.iter().zip(grad_spikes).rev() {
            let surrogate_grad = self
                .surrogate
                .gradient(&record.charge.mapv(|h| h - v_threshold));

            let grad_charge = Zip::from(grad_s)
                .and(&surrogate_grad)
                .and(&grad_potential)
                .and(&record.charge)
                .and(&record.spikes)
                .map_collect(|&gs, &sg, &gv, &h, &s| {
                    let (dv_dh, dv_ds) = match v_reset {
                        Some(v_reset) => (1.0 - s, v_reset - h),
                        None => (1.0, -v_threshold),
                    };
                    let through_reset = if detach { dv_dh } else { dv_dh + dv_ds * sg };
                    gs * sg + gv * through_reset
                });

            grad_inputs.push(grad_charge.mapv(|g| g * input_gain));
            grad_potential = grad_charge.mapv(|g| g * potential_gain);
        }

        grad_inputs.reverse();
        Ok(grad_inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surrogate::Triangle;
    use ndarray::{arr1, arr2};

    fn scalar(x: f32) -> Tensor {
        arr1(&[x]).into_dyn()
    }

    fn spike_indices(neuron: &mut SpikingNeuron, input: f32, steps: usize) -> Vec<usize> {
        (0..steps)
            .filter(|_| neuron.step(&scalar(input)).unwrap()[0] == 1.0)
            .collect()
    }

    #[test]
    fn test_constructor_rejects_threshold_at_or_below_reset() {
        for (th, reset) in [(0.0, 0.0), (0.5, 1.0), (-1.0, -0.5)] {
            let params = NeuronParameters::default()
                .with_threshold(th)
                .with_reset(reset);
            assert_eq!(
                SpikingNeuron::new(params).unwrap_err(),
                NeuralError::InvalidThreshold {
                    v_threshold: th,
                    v_reset: reset
                }
            );
        }
        // Soft reset has no ordering constraint
        let params = NeuronParameters::default()
            .with_threshold(-1.0)
            .with_soft_reset();
        assert!(SpikingNeuron::new(params).is_ok());
    }

    #[test]
    fn test_constructor_rejects_non_finite_values() {
        let params = NeuronParameters::default().with_threshold(f32::NAN);
        assert!(matches!(
            SpikingNeuron::new(params),
            Err(NeuralError::InvalidParameter { name: "v_threshold", .. })
        ));
        let params = NeuronParameters::default().with_initial_potential(f32::INFINITY);
        assert!(matches!(
            SpikingNeuron::new(params),
            Err(NeuralError::InvalidParameter { name: "v_init", .. })
        ));
        assert_eq!(
            SpikingNeuron::new(NeuronParameters::leaky(-1.0)).unwrap_err(),
            NeuralError::InvalidTimeConstant(-1.0)
        );
    }

    #[test]
    fn test_if_fixed_reset_constant_input() {
        let mut neuron = SpikingNeuron::new(NeuronParameters::integrate_and_fire()).unwrap();
        // 0.3 four times crosses 1.0; fixed reset discards the surplus
        assert_eq!(spike_indices(&mut neuron, 0.3, 10), vec![3, 7]);
    }

    #[test]
    fn test_if_soft_reset_constant_input() {
        let params = NeuronParameters::integrate_and_fire().with_soft_reset();
        let mut neuron = SpikingNeuron::new(params).unwrap();
        // Subtractive reset keeps the surplus, so spikes track cumulative charge
        assert_eq!(spike_indices(&mut neuron, 0.3, 10), vec![3, 6, 9]);
    }

    #[test]
    fn test_fire_resets_to_configured_value() {
        let params = NeuronParameters::integrate_and_fire()
            .with_threshold(1.0)
            .with_reset(-0.25);
        let mut neuron = SpikingNeuron::new(params).unwrap();
        assert_eq!(neuron.initial_potential(), -0.25);

        let s = neuron.step(&scalar(2.0)).unwrap();
        assert_eq!(s[0], 1.0);
        assert_eq!(neuron.membrane_potential().unwrap()[0], -0.25);
    }

    #[test]
    fn test_subthreshold_step_keeps_charge() {
        let mut neuron = SpikingNeuron::new(NeuronParameters::leaky(2.0)).unwrap();
        let s = neuron.step(&scalar(0.5)).unwrap();
        assert_eq!(s[0], 0.0);
        // H = 0 + (0.5 - 0) / 2
        assert_eq!(neuron.membrane_potential().unwrap()[0], 0.25);
    }

    #[test]
    fn test_exact_threshold_fires() {
        let mut neuron = SpikingNeuron::new(NeuronParameters::integrate_and_fire()).unwrap();
        let s = neuron.step(&scalar(1.0)).unwrap();
        assert_eq!(s[0], 1.0);
        assert_eq!(neuron.membrane_potential().unwrap()[0], 0.0);
    }

    #[test]
    fn test_reset_restores_initial_value_and_releases_shape() {
        let params = NeuronParameters::integrate_and_fire().with_initial_potential(0.5);
        let mut neuron = SpikingNeuron::new(params).unwrap();
        neuron.step(&arr2(&[[0.1, 0.2], [0.3, 0.9]]).into_dyn()).unwrap();
        assert_eq!(neuron.state_shape(), Some(&[2, 2][..]));

        neuron.reset();
        assert!(neuron.membrane_potential().is_none());
        assert_eq!(neuron.initial_potential(), 0.5);
        assert_eq!(neuron.recorded_steps(), 0);

        // After reset a different batch size is accepted and starts from v_init
        neuron.step(&scalar(0.0)).unwrap();
        assert_eq!(neuron.membrane_potential().unwrap()[0], 0.5);
    }

    #[test]
    fn test_shape_mismatch_is_rejected_without_touching_state() {
        let mut neuron = SpikingNeuron::new(NeuronParameters::integrate_and_fire()).unwrap();
        neuron.step(&arr1(&[0.2, 0.4]).into_dyn()).unwrap();

        let err = neuron.step(&arr1(&[0.2, 0.4, 0.6]).into_dyn()).unwrap_err();
        assert_eq!(
            err,
            NeuralError::ShapeMismatch {
                expected: vec![2],
                actual: vec![3]
            }
        );
        let v = neuron.membrane_potential().unwrap();
        assert_eq!(v.as_slice().unwrap(), &[0.2, 0.4]);
    }

    #[test]
    fn test_large_tensor_parallel_path_matches_sequential() {
        let n = PARALLEL_ELEMENT_THRESHOLD + 17;
        let input = Tensor::from_shape_fn(ndarray::IxDyn(&[n]), |i| (i[0] % 7) as f32 * 0.2);
        let mut big = SpikingNeuron::new(NeuronParameters::leaky(3.0).with_soft_reset()).unwrap();

        let mut small = big.clone();
        for _ in 0..4 {
            let s_big = big.step(&input).unwrap();
            // Same leading elements, stepped below the threshold
            let chunk = input.slice(ndarray::s![..64]).to_owned().into_dyn();
            let s_small = small.step(&chunk).unwrap();
            assert_eq!(
                s_big.slice(ndarray::s![..64]).to_owned().into_dyn(),
                s_small
            );
        }
        assert_eq!(
            big.membrane_potential()
                .unwrap()
                .slice(ndarray::s![..64])
                .to_owned()
                .into_dyn(),
            *small.membrane_potential().unwrap()
        );
    }

    #[test]
    fn test_training_mode_records_and_reset_clears() {
        let mut neuron = SpikingNeuron::new(NeuronParameters::integrate_and_fire()).unwrap();
        neuron.step(&scalar(0.3)).unwrap();
        assert_eq!(neuron.recorded_steps(), 0);

        neuron.set_training(true);
        neuron.step(&scalar(0.3)).unwrap();
        neuron.step(&scalar(0.3)).unwrap();
        assert_eq!(neuron.recorded_steps(), 2);

        neuron.reset();
        assert_eq!(neuron.recorded_steps(), 0);
        assert!(neuron.is_training());
    }

    fn triangle_neuron(params: NeuronParameters) -> SpikingNeuron {
        let mut neuron =
            SpikingNeuron::with_surrogate_fn(params, Arc::new(Triangle::new(1.0).unwrap()))
                .unwrap();
        neuron.set_training(true);
        neuron
    }

    #[test]
    fn test_backward_soft_reset_through_time() {
        // H0 = 0.6 (silent), H1 = 1.2 (fires); dL/dS = [0, 1]
        let params = NeuronParameters::integrate_and_fire().with_soft_reset();
        let mut neuron = triangle_neuron(params);
        neuron.step(&scalar(0.6)).unwrap();
        neuron.step(&scalar(0.6)).unwrap();

        let grads = neuron.backward(&[scalar(0.0), scalar(1.0)]).unwrap();
        // t=1: σ'(0.2) = 0.8
        assert!((grads[1][0] - 0.8).abs() < 1e-6);
        // t=0: 0.8 · (1 - V_th·σ'(-0.4)) = 0.8 · 0.4
        assert!((grads[0][0] - 0.32).abs() < 1e-6);

        let mut detached = triangle_neuron(params.with_detach_reset(true));
        detached.step(&scalar(0.6)).unwrap();
        detached.step(&scalar(0.6)).unwrap();
        let grads = detached.backward(&[scalar(0.0), scalar(1.0)]).unwrap();
        assert!((grads[0][0] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_backward_fixed_reset_through_time() {
        let mut neuron = triangle_neuron(NeuronParameters::integrate_and_fire());
        neuron.step(&scalar(0.6)).unwrap();
        neuron.step(&scalar(0.6)).unwrap();

        let grads = neuron.backward(&[scalar(0.0), scalar(1.0)]).unwrap();
        assert!((grads[1][0] - 0.8).abs() < 1e-6);
        // t=0: 0.8 · ((1 - S0) + (V_reset - H0)·σ'(-0.4)) = 0.8 · (1 - 0.36)
        assert!((grads[0][0] - 0.512).abs() < 1e-6);
    }

    #[test]
    fn test_backward_fired_step_blocks_history_when_detached() {
        // A fixed reset with a detached spike severs V(t) from H(t) when S(t) = 1
        let params = NeuronParameters::integrate_and_fire().with_detach_reset(true);
        let mut neuron = triangle_neuron(params);
        neuron.step(&scalar(1.5)).unwrap(); // fires
        neuron.step(&scalar(0.5)).unwrap();

        let grads = neuron.backward(&[scalar(0.0), scalar(1.0)]).unwrap();
        assert!((grads[1][0] - 0.5).abs() < 1e-6);
        assert_eq!(grads[0][0], 0.0);
    }

    #[test]
    fn test_backward_lif_scales_by_time_constant() {
        let mut neuron = triangle_neuron(NeuronParameters::leaky(2.0));
        neuron.step(&scalar(1.6)).unwrap(); // H = 0.8, silent
        let grads = neuron.backward(&[scalar(1.0)]).unwrap();
        // σ'(-0.2) · 1/τ
        assert!((grads[0][0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_backward_usage_errors() {
        let mut neuron = SpikingNeuron::new(NeuronParameters::integrate_and_fire()).unwrap();
        assert!(matches!(
            neuron.backward(&[]),
            Err(NeuralError::GradientUnavailable(_))
        ));

        neuron.set_training(true);
        neuron.step(&arr1(&[0.1, 0.2]).into_dyn()).unwrap();
        assert!(matches!(
            neuron.backward(&[scalar(1.0), scalar(1.0)]),
            Err(NeuralError::GradientUnavailable(_))
        ));
        assert!(matches!(
            neuron.backward(&[scalar(1.0)]),
            Err(NeuralError::ShapeMismatch { .. })
        ));
    }
}
