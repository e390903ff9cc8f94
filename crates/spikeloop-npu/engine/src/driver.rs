// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Temporal Driver
//!
//! Unrolls a [`SpikingNetwork`] over `T` timesteps:
//!
//! 1. `intermediate = run_static(raw)` once
//! 2. `S(t) = run_dynamic(intermediate)` for `t in 0..T`, summed into a local
//!    accumulator
//! 3. `rate = Σ S(t) / T`
//!
//! Timesteps are strictly sequential: each neuron's charge reads the potential
//! left by the previous timestep. Batch elements inside one timestep are
//! independent and may be updated in parallel by the neurons themselves.
//!
//! Every `S(t)` must be a 0/1 spike tensor, so the network has to end in a
//! spiking stage; anything else fails with `NonBinaryOutput`.
//!
//! The driver never resets the network on its own. Callers reset between
//! independent samples, or use [`TemporalDriver::simulate_sample`].

use ndarray::Axis;
use spikeloop_npu_neural::Tensor;
use tracing::{debug, trace};

use crate::encoder::InputEncoder;
use crate::error::{EngineError, Result};
use crate::network::SpikingNetwork;

/// Result of unrolling one sample or batch
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    /// Firing frequency per output unit, in `[0, 1]`
    pub rate: Tensor,
    /// Spike totals over all timesteps
    pub spike_count: Tensor,
    pub timesteps: usize,
    /// Every `S(t)` in order, when recording was enabled
    pub spike_train: Option<Vec<Tensor>>,
}

impl SimulationOutput {
    /// Index of the highest rate along the last axis, one per batch row
    ///
    /// Ties resolve to the lowest index.
    pub fn predictions(&self) -> Vec<usize> {
        let ndim = self.rate.ndim();
        if ndim == 0 {
            return Vec::new();
        }
        self.rate
            .lanes(Axis(ndim - 1))
            .into_iter()
            .map(|lane| {
                lane.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |best, (i, &r)| {
                        if r > best.1 {
                            (i, r)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect()
    }

    /// Fraction of rows whose prediction equals the label
    pub fn accuracy(&self, labels: &[usize]) -> Result<f32> {
        let predictions = self.predictions();
        if predictions.len() != labels.len() {
            return Err(EngineError::ShapeMismatch {
                expected: vec![predictions.len()],
                actual: vec![labels.len()],
            });
        }
        if labels.is_empty() {
            return Ok(0.0);
        }
        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|(p, l)| p == l)
            .count();
        Ok(correct as f32 / labels.len() as f32)
    }
}

/// Fixed-length timestep loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalDriver {
    timesteps: usize,
    record_spikes: bool,
}

impl TemporalDriver {
    /// Fails with `InvalidTimesteps` when `timesteps < 1`
    pub fn new(timesteps: usize) -> Result<Self> {
        if timesteps < 1 {
            return Err(EngineError::InvalidTimesteps(timesteps));
        }
        Ok(Self {
            timesteps,
            record_spikes: false,
        })
    }

    /// Keep every per-timestep spike tensor in the output
    pub fn record_spikes(mut self, record: bool) -> Self {
        self.record_spikes = record;
        self
    }

    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// Direct encoding: static prefix once, dynamic suffix `T` times
    pub fn simulate(&self, network: &mut SpikingNetwork, raw: &Tensor) -> Result<SimulationOutput> {
        let intermediate = network.run_static(raw)?;
        self.unroll(|_| network.run_dynamic(&intermediate))
    }

    /// Every stage every timestep on the same input
    ///
    /// Produces exactly what [`simulate`](Self::simulate) produces, at `T`
    /// times the static-prefix cost.
    pub fn simulate_unpartitioned(
        &self,
        network: &mut SpikingNetwork,
        raw: &Tensor,
    ) -> Result<SimulationOutput> {
        self.unroll(|_| network.run_full(raw))
    }

    /// Encoded input; stochastic encoders bypass the static prefix optimisation
    pub fn simulate_encoded(
        &self,
        network: &mut SpikingNetwork,
        raw: &Tensor,
        encoder: &mut dyn InputEncoder,
    ) -> Result<SimulationOutput> {
        if encoder.is_static() {
            let encoded = encoder.encode(raw)?;
            return self.simulate(network, &encoded);
        }
        debug!(
            "[DRIVER] {} encoder is stochastic: running all {} stages per timestep",
            encoder.name(),
            network.len()
        );
        self.unroll(|_| {
            let encoded = encoder.encode(raw)?;
            network.run_full(&encoded)
        })
    }

    /// [`simulate`](Self::simulate) followed by `network.reset()`
    ///
    /// The reset happens even when the simulation fails.
    pub fn simulate_sample(
        &self,
        network: &mut SpikingNetwork,
        raw: &Tensor,
    ) -> Result<SimulationOutput> {
        let output = self.simulate(network, raw);
        network.reset();
        output
    }

    fn unroll<F>(&self, mut step: F) -> Result<SimulationOutput>
    where
        F: FnMut(usize) -> Result<Tensor>,
    {
        let mut spike_train = self.record_spikes.then(|| Vec::with_capacity(self.timesteps));
        let mut accumulated: Option<Tensor> = None;

        for t in 0..self.timesteps {
            let spikes = step(t)?;
            if let Some(&value) = spikes.iter().find(|&&s| s != 0.0 && s != 1.0) {
                return Err(EngineError::NonBinaryOutput { timestep: t, value });
            }
            accumulated = Some(match accumulated {
                None => spikes.clone(),
                Some(mut sum) => {
                    if sum.shape() != spikes.shape() {
                        return Err(EngineError::ShapeMismatch {
                            expected: sum.shape().to_vec(),
                            actual: spikes.shape().to_vec(),
                        });
                    }
                    sum += &spikes;
                    sum
                }
            });
            trace!("[DRIVER] t={} spikes={}", t, spikes.sum());
            if let Some(train) = spike_train.as_mut() {
                train.push(spikes);
            }
        }

        // timesteps >= 1, so the loop ran at least once
        let spike_count = accumulated.ok_or(EngineError::InvalidTimesteps(self.timesteps))?;
        let scale = self.timesteps as f32;
        let rate = spike_count.mapv(|c| c / scale);

        debug!(
            "[DRIVER] simulated {} timesteps: {} spikes over {} units",
            self.timesteps,
            spike_count.sum(),
            spike_count.len()
        );

        Ok(SimulationOutput {
            rate,
            spike_count,
            timesteps: self.timesteps,
            spike_train,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Stage;
    use crate::transform::Scale;
    use ndarray::{arr1, arr2};
    use spikeloop_npu_neural::{NeuronParameters, SpikingNeuron};

    fn if_network() -> SpikingNetwork {
        SpikingNetwork::new(vec![
            SpikingNeuron::new(NeuronParameters::integrate_and_fire())
                .unwrap()
                .into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_timesteps_rejected() {
        assert_eq!(TemporalDriver::new(0).unwrap_err(), EngineError::InvalidTimesteps(0));
        assert_eq!(TemporalDriver::new(1).unwrap().timesteps(), 1);
    }

    #[test]
    fn test_single_timestep_rate_equals_spikes() {
        let mut net = if_network();
        let x = arr2(&[[0.2f32, 1.0, 3.0]]).into_dyn();
        let out = TemporalDriver::new(1).unwrap().simulate(&mut net, &x).unwrap();
        assert_eq!(out.rate, arr2(&[[0.0, 1.0, 1.0]]).into_dyn());
        assert_eq!(out.rate, out.spike_count);
    }

    #[test]
    fn test_rate_is_count_over_timesteps() {
        let mut net = if_network();
        let x = arr1(&[0.3f32]).into_dyn();
        let out = TemporalDriver::new(10)
            .unwrap()
            .record_spikes(true)
            .simulate(&mut net, &x)
            .unwrap();
        assert_eq!(out.spike_count[[0]], 2.0);
        assert_eq!(out.rate[[0]], 0.2);
        let train = out.spike_train.unwrap();
        assert_eq!(train.len(), 10);
        let fired: Vec<usize> = (0..10).filter(|&t| train[t][[0]] == 1.0).collect();
        assert_eq!(fired, vec![3, 7]);
    }

    #[test]
    fn test_driver_leaves_state_and_simulate_sample_resets() {
        let driver = TemporalDriver::new(3).unwrap();
        let x = arr1(&[0.4f32]).into_dyn();

        let mut net = if_network();
        driver.simulate(&mut net, &x).unwrap();
        assert!(net.neurons().all(|n| n.membrane_potential().is_some()));

        let mut net = if_network();
        driver.simulate_sample(&mut net, &x).unwrap();
        assert!(net.neurons().all(|n| n.membrane_potential().is_none()));
    }

    #[test]
    fn test_predictions_and_accuracy() {
        let out = SimulationOutput {
            rate: arr2(&[[0.1f32, 0.7, 0.2], [0.5, 0.5, 0.0], [0.0, 0.0, 0.9]]).into_dyn(),
            spike_count: arr2(&[[1.0f32, 7.0, 2.0], [5.0, 5.0, 0.0], [0.0, 0.0, 9.0]]).into_dyn(),
            timesteps: 10,
            spike_train: None,
        };
        assert_eq!(out.predictions(), vec![1, 0, 2]);
        assert!((out.accuracy(&[1, 1, 2]).unwrap() - 2.0 / 3.0).abs() < 1e-6);
        assert!(out.accuracy(&[1]).is_err());
    }

    #[test]
    fn test_non_spike_output_rejected() {
        let build = |factor: f32| {
            SpikingNetwork::new(vec![
                SpikingNeuron::new(NeuronParameters::integrate_and_fire())
                    .unwrap()
                    .into(),
                Stage::transform(Scale::new(factor)),
            ])
            .unwrap()
        };
        let driver = TemporalDriver::new(4).unwrap();
        let x = arr1(&[1.0f32]).into_dyn();

        // A scaled spike is no longer a spike; the rate would leave [0, 1]
        let err = driver.simulate(&mut build(2.0), &x).unwrap_err();
        assert_eq!(err, EngineError::NonBinaryOutput { timestep: 0, value: 2.0 });
        assert!(driver.simulate_unpartitioned(&mut build(2.0), &x).is_err());

        // Identity after the neuron keeps the output binary
        let out = driver.simulate(&mut build(1.0), &x).unwrap();
        assert_eq!(out.spike_count[[0]], 4.0);
        assert_eq!(out.rate[[0]], 1.0);
    }
}
