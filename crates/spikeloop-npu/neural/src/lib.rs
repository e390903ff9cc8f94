// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Spikeloop Neural Computation
//!
//! The stateful half of a clock-driven spiking network:
//! - **Types**: Tensor alias and error types
//! - **Surrogate**: Heaviside spike decision paired with a smooth backward rule
//! - **Models**: Charge equations (IF, LIF)
//! - **Neuron**: The charge → discharge → reset state machine
//!
//! ## Timestep Contract
//!
//! ```text
//! H(t) = f(V(t-1), X(t))                  charge (model specific)
//! S(t) = Θ(H(t) - V_threshold)            discharge (surrogate forward)
//! V(t) = H(t)·(1 - S(t)) + V_reset·S(t)   fixed reset
//!      | H(t) - S(t)·V_threshold          subtractive reset (v_reset = None)
//! ```
//!
//! A neuron's membrane potential persists across `step` calls. Callers must
//! invoke [`SpikingNeuron::reset`] between logically independent samples; the
//! neuron has no way to detect a sample boundary on its own.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod surrogate;

pub mod models;

pub mod neuron;

pub use types::{NeuralError, Result, Tensor};

pub use surrogate::{ATan, Sigmoid, SurrogateFunction, SurrogateKind, Triangle};

pub use models::{ChargeModel, IntegrateAndFire, LeakyIntegrateAndFire, NeuronModel};

pub use neuron::{NeuronParameters, SpikingNeuron};
