// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neuron Charge Models
//!
//! A model supplies only the charge equation `H(t) = f(V(t-1), X(t))` and its
//! two partial derivatives. Discharge and reset are shared by every model and
//! live in [`crate::neuron`].
//!
//! ## Adding a New Neuron Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement `NeuronModel` trait
//! 3. Add a `ChargeModel` variant
//! 4. Add tests

pub mod integrate;
pub mod lif;
pub mod traits;

use serde::{Deserialize, Serialize};

use crate::types::Result;

pub use integrate::IntegrateAndFire;
pub use lif::LeakyIntegrateAndFire;
pub use traits::NeuronModel;

/// Charge model selected at neuron construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChargeModel {
    #[serde(rename = "if")]
    IntegrateAndFire,
    #[serde(rename = "lif")]
    LeakyIntegrateAndFire { tau: f32 },
}

impl ChargeModel {
    /// Leaky model with membrane time constant `tau`
    pub fn lif(tau: f32) -> Result<Self> {
        LeakyIntegrateAndFire::new(tau)?;
        Ok(ChargeModel::LeakyIntegrateAndFire { tau })
    }

    pub fn validate(&self) -> Result<()> {
        if let ChargeModel::LeakyIntegrateAndFire { tau } = *self {
            LeakyIntegrateAndFire::new(tau)?;
        }
        Ok(())
    }
}

impl Default for ChargeModel {
    fn default() -> Self {
        ChargeModel::IntegrateAndFire
    }
}

impl NeuronModel for ChargeModel {
    fn model_name(&self) -> &'static str {
        match self {
            ChargeModel::IntegrateAndFire => IntegrateAndFire.model_name(),
            ChargeModel::LeakyIntegrateAndFire { .. } => "Leaky Integrate-and-Fire (LIF)",
        }
    }

    #[inline(always)]
    fn charge(&self, v: f32, x: f32, v_rest: f32) -> f32 {
        match *self {
            ChargeModel::IntegrateAndFire => IntegrateAndFire.charge(v, x, v_rest),
            ChargeModel::LeakyIntegrateAndFire { tau } => {
                LeakyIntegrateAndFire::unchecked(tau).charge(v, x, v_rest)
            }
        }
    }

    #[inline(always)]
    fn input_gain(&self) -> f32 {
        match *self {
            ChargeModel::IntegrateAndFire => IntegrateAndFire.input_gain(),
            ChargeModel::LeakyIntegrateAndFire { tau } => {
                LeakyIntegrateAndFire::unchecked(tau).input_gain()
            }
        }
    }

    #[inline(always)]
    fn potential_gain(&self) -> f32 {
        match *self {
            ChargeModel::IntegrateAndFire => IntegrateAndFire.potential_gain(),
            ChargeModel::LeakyIntegrateAndFire { tau } => {
                LeakyIntegrateAndFire::unchecked(tau).potential_gain()
            }
        }
    }
}
