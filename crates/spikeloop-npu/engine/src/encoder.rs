// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Input Encoders
//!
//! Turn one raw sample into the input seen at each timestep. A static encoder
//! yields the same tensor every timestep, so the driver may hoist the network's
//! static prefix; a stochastic encoder yields a fresh spike train every
//! timestep and forces the whole network to run per timestep.
//!
//! Randomness is always seeded by the caller. Two encoders built from the same
//! seed produce the same spike trains.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spikeloop_npu_neural::Tensor;

use crate::error::Result;

pub trait InputEncoder: Send {
    fn name(&self) -> &str;

    /// Whether `encode` returns the same tensor for the same input every call
    fn is_static(&self) -> bool;

    fn encode(&mut self, raw: &Tensor) -> Result<Tensor>;
}

/// Feeds the raw value unchanged at every timestep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectEncoder;

impl InputEncoder for DirectEncoder {
    fn name(&self) -> &str {
        "direct"
    }

    fn is_static(&self) -> bool {
        true
    }

    fn encode(&mut self, raw: &Tensor) -> Result<Tensor> {
        Ok(raw.clone())
    }
}

/// Bernoulli spike per element per timestep with probability equal to the raw
/// value
///
/// Values at or below 0 never fire, values at or above 1 always fire.
#[derive(Debug, Clone)]
pub struct PoissonEncoder {
    seed: u64,
    rng: StdRng,
}

impl PoissonEncoder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the spike stream from the original seed
    pub fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

impl InputEncoder for PoissonEncoder {
    fn name(&self) -> &str {
        "poisson"
    }

    fn is_static(&self) -> bool {
        false
    }

    fn encode(&mut self, raw: &Tensor) -> Result<Tensor> {
        let rng = &mut self.rng;
        Ok(raw.mapv(|x| {
            let u: f32 = rng.gen();
            if u < x {
                1.0
            } else {
                0.0
            }
        }))
    }
}
