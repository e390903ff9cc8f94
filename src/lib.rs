// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spikeloop - Clock-Driven Spiking Networks
//!
//! Spikeloop turns an ordinary feed-forward pipeline into a temporal spiking
//! network: stateful neurons with exact charge/discharge/reset dynamics, a
//! pluggable surrogate gradient for the spike decision, and a driver that
//! unrolls the pipeline over `T` timesteps without recomputing its
//! time-invariant prefix.
//!
//! ## Quick Start
//!
//! ```rust
//! use spikeloop::prelude::*;
//! use ndarray::arr2;
//!
//! let mut network = SpikingNetwork::new(vec![
//!     Stage::transform(Linear::seeded(2, 2, 0)?),
//!     SpikingNeuron::new(NeuronParameters::leaky(2.0).with_soft_reset())?.into(),
//! ])?;
//!
//! let driver = TemporalDriver::new(16)?;
//! let output = driver.simulate_sample(&mut network, &arr2(&[[0.4f32, 0.9]]).into_dyn())?;
//! assert!(output.rate.iter().all(|&r| (0.0..=1.0).contains(&r)));
//! # Ok::<(), EngineError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: spikeloop-config, spikeloop-observability  │
//! │  (TOML config + overrides, tracing setup)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Neural: spikeloop-npu-neural                           │
//! │  (Surrogates, IF/LIF charge, neuron state machine)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Engine: spikeloop-npu-engine                           │
//! │  (Transforms, encoders, composer, temporal driver)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Hygiene
//!
//! Neuron potentials persist across timesteps and across driver calls. Reset
//! the network (or use `simulate_sample`) between independent samples.
//!
//! ## License
//!
//! Apache-2.0

pub use spikeloop_config as config;
pub use spikeloop_npu_engine as engine;
pub use spikeloop_npu_neural as neural;
pub use spikeloop_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::neural::{
        ChargeModel, NeuralError, NeuronModel, NeuronParameters, SpikingNeuron, SurrogateFunction,
        SurrogateKind, Tensor,
    };

    pub use crate::engine::{
        DirectEncoder, EngineError, Flatten, FnTransform, InputEncoder, Linear, PoissonEncoder,
        Scale, SimulationOutput, SpikingNetwork, Stage, StatelessTransform, TemporalDriver,
    };

    pub use crate::config::{load_config, validate_config, SpikeloopConfig};
}
