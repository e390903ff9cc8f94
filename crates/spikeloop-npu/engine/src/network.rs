// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Network Composer
//!
//! A pipeline of stateless transforms and spiking neurons, split into:
//! - **Static prefix**: leading stateless transforms. Given one input their
//!   output never changes, so they run once per sample.
//! - **Dynamic suffix**: the first spiking stage and everything after it. Runs
//!   once per timestep; every neuron inside advances its own state each call.
//!
//! ```text
//! raw ─▶ [Linear ─▶ Flatten] ─▶ intermediate ─▶ [Neuron ─▶ Linear ─▶ Neuron] ─▶ S(t)
//!         static prefix (once)                  dynamic suffix (T times)
//! ```

use std::fmt;

use spikeloop_npu_neural::{NeuronModel, SpikingNeuron, Tensor};
use tracing::{debug, trace};

use crate::error::{EngineError, Result};
use crate::transform::StatelessTransform;

/// One element of the pipeline
pub enum Stage {
    Transform(Box<dyn StatelessTransform>),
    Neuron(SpikingNeuron),
}

impl Stage {
    pub fn transform<T: StatelessTransform + 'static>(transform: T) -> Self {
        Stage::Transform(Box::new(transform))
    }

    pub fn is_spiking(&self) -> bool {
        matches!(self, Stage::Neuron(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Stage::Transform(t) => t.name(),
            Stage::Neuron(n) => n.parameters().model.model_name(),
        }
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        match self {
            Stage::Transform(t) => t.apply(input),
            Stage::Neuron(n) => Ok(n.step(input)?),
        }
    }
}

impl From<SpikingNeuron> for Stage {
    fn from(neuron: SpikingNeuron) -> Self {
        Stage::Neuron(neuron)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transform(t) => f.debug_tuple("Transform").field(&t.name()).finish(),
            Stage::Neuron(n) => f.debug_tuple("Neuron").field(n).finish(),
        }
    }
}

/// A partitioned spiking pipeline
///
/// Invariant: `stages[..static_len]` holds no spiking stage and
/// `stages[static_len..]` holds at least one.
#[derive(Debug)]
pub struct SpikingNetwork {
    stages: Vec<Stage>,
    static_len: usize,
}

impl SpikingNetwork {
    /// Partition at the first spiking stage (the maximal static prefix)
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        let static_len = stages
            .iter()
            .position(Stage::is_spiking)
            .ok_or(EngineError::NoSpikingStage)?;
        Ok(Self::partitioned(stages, static_len))
    }

    /// Partition after an explicitly declared prefix length
    ///
    /// The declared prefix may be shorter than the maximal one, never longer.
    pub fn with_static_prefix(stages: Vec<Stage>, static_len: usize) -> Result<Self> {
        if static_len > stages.len() {
            return Err(EngineError::InvalidPartition {
                len: static_len,
                reason: format!("network has only {} stages", stages.len()),
            });
        }
        if let Some(i) = stages[..static_len].iter().position(Stage::is_spiking) {
            return Err(EngineError::InvalidPartition {
                len: static_len,
                reason: format!("stage {} is a spiking neuron", i),
            });
        }
        if !stages[static_len..].iter().any(Stage::is_spiking) {
            return Err(EngineError::NoSpikingStage);
        }
        Ok(Self::partitioned(stages, static_len))
    }

    fn partitioned(stages: Vec<Stage>, static_len: usize) -> Self {
        debug!(
            "[COMPOSER] {} stages: static prefix {}, dynamic suffix {}",
            stages.len(),
            static_len,
            stages.len() - static_len
        );
        Self { stages, static_len }
    }

    /// Run the static prefix; the identity when the prefix is empty
    pub fn run_static(&self, input: &Tensor) -> Result<Tensor> {
        let mut current: Option<Tensor> = None;
        for stage in &self.stages[..self.static_len] {
            let Stage::Transform(t) = stage else {
                continue;
            };
            current = Some(t.apply(current.as_ref().unwrap_or(input))?);
        }
        Ok(current.unwrap_or_else(|| input.clone()))
    }

    /// Run the dynamic suffix for one timestep
    pub fn run_dynamic(&mut self, intermediate: &Tensor) -> Result<Tensor> {
        let static_len = self.static_len;
        run_stages(&mut self.stages[static_len..], intermediate)
    }

    /// Run every stage for one timestep, ignoring the partition
    pub fn run_full(&mut self, input: &Tensor) -> Result<Tensor> {
        run_stages(&mut self.stages, input)
    }

    /// Return every neuron to its initial potential
    pub fn reset(&mut self) {
        for neuron in self.neurons_mut() {
            neuron.reset();
        }
        trace!("[COMPOSER] reset {} neurons", self.neurons().count());
    }

    pub fn set_training(&mut self, training: bool) {
        for neuron in self.neurons_mut() {
            neuron.set_training(training);
        }
    }

    pub fn neurons(&self) -> impl Iterator<Item = &SpikingNeuron> {
        self.stages.iter().filter_map(|s| match s {
            Stage::Neuron(n) => Some(n),
            Stage::Transform(_) => None,
        })
    }

    pub fn neurons_mut(&mut self) -> impl Iterator<Item = &mut SpikingNeuron> {
        self.stages.iter_mut().filter_map(|s| match s {
            Stage::Neuron(n) => Some(n),
            Stage::Transform(_) => None,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn static_len(&self) -> usize {
        self.static_len
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn run_stages(stages: &mut [Stage], input: &Tensor) -> Result<Tensor> {
    let mut current: Option<Tensor> = None;
    for stage in stages.iter_mut() {
        let next = stage.forward(current.as_ref().unwrap_or(input))?;
        current = Some(next);
    }
    Ok(current.unwrap_or_else(|| input.clone()))
}
