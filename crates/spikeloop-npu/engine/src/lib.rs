// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Spikeloop Engine
//!
//! Turns a feed-forward pipeline of stateless transforms and spiking neurons
//! into a temporal spiking network.
//!
//! ## Architecture
//! - **Transform**: stateless operators (`Linear`, `Flatten`, `Scale`, closures)
//! - **Encoder**: per-timestep input (direct or seeded Poisson)
//! - **Network**: static prefix / dynamic suffix partition
//! - **Driver**: `T`-step unrolling with a local spike accumulator
//! - **Builder**: runtime objects from `spikeloop-config` sections
//!
//! ## Example
//! ```
//! use ndarray::arr2;
//! use spikeloop_npu_engine::{Linear, SpikingNetwork, Stage, TemporalDriver};
//! use spikeloop_npu_neural::{NeuronParameters, SpikingNeuron};
//!
//! let mut network = SpikingNetwork::new(vec![
//!     Stage::transform(Linear::seeded(4, 3, 7)?),
//!     SpikingNeuron::new(NeuronParameters::integrate_and_fire())?.into(),
//! ])?;
//! let driver = TemporalDriver::new(8)?;
//!
//! let batch = arr2(&[[0.1f32, 0.9, 0.4, 0.0]]).into_dyn();
//! let output = driver.simulate_sample(&mut network, &batch)?;
//! assert_eq!(output.predictions().len(), 1);
//! # Ok::<(), spikeloop_npu_engine::EngineError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builder;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod network;
pub mod transform;

pub use builder::{
    driver_from_config, encoder_from_config, neuron_from_config, neuron_params_from_config,
    surrogate_from_config,
};
pub use driver::{SimulationOutput, TemporalDriver};
pub use encoder::{DirectEncoder, InputEncoder, PoissonEncoder};
pub use error::{EngineError, Result};
pub use network::{SpikingNetwork, Stage};
pub use transform::{FnTransform, Flatten, Linear, Scale, StatelessTransform};
