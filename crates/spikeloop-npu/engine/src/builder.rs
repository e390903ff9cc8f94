// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Config sections to runtime objects
//!
//! Kind strings are matched case-insensitively. Run
//! [`spikeloop_config::validate_config`] first to get every problem reported
//! at once; these builders stop at the first.

use spikeloop_config::{NeuronConfig, SpikeloopConfig, SurrogateConfig};
use spikeloop_npu_neural::surrogate::{atan, sigmoid, triangle};
use spikeloop_npu_neural::{ChargeModel, NeuronParameters, SpikingNeuron, SurrogateKind};
use tracing::debug;

use crate::driver::TemporalDriver;
use crate::encoder::{DirectEncoder, InputEncoder, PoissonEncoder};
use crate::error::{EngineError, Result};

pub fn surrogate_from_config(config: &SurrogateConfig) -> Result<SurrogateKind> {
    let kind = match config.kind.to_ascii_lowercase().as_str() {
        "sigmoid" => SurrogateKind::Sigmoid {
            alpha: config.alpha.unwrap_or(sigmoid::DEFAULT_ALPHA),
        },
        "atan" => SurrogateKind::ATan {
            alpha: config.alpha.unwrap_or(atan::DEFAULT_ALPHA),
        },
        "triangle" => SurrogateKind::Triangle {
            alpha: config.alpha.unwrap_or(triangle::DEFAULT_ALPHA),
        },
        other => {
            return Err(EngineError::InvalidConfig(format!(
                "unknown surrogate kind '{}'",
                other
            )))
        }
    };
    // Surface a bad alpha now rather than at neuron construction
    kind.build()?;
    Ok(kind)
}

pub fn neuron_params_from_config(
    neuron: &NeuronConfig,
    surrogate: &SurrogateConfig,
) -> Result<NeuronParameters> {
    let model = match neuron.model.to_ascii_lowercase().as_str() {
        "if" => ChargeModel::IntegrateAndFire,
        "lif" => ChargeModel::lif(neuron.tau)?,
        other => {
            return Err(EngineError::InvalidConfig(format!(
                "unknown neuron model '{}'",
                other
            )))
        }
    };

    let params = NeuronParameters {
        v_threshold: neuron.v_threshold,
        v_reset: neuron.effective_reset(),
        v_init: neuron.v_init,
        detach_reset: neuron.detach_reset,
        model,
        surrogate: surrogate_from_config(surrogate)?,
    };
    params.validate()?;
    Ok(params)
}

pub fn neuron_from_config(config: &SpikeloopConfig) -> Result<SpikingNeuron> {
    let params = neuron_params_from_config(&config.neuron, &config.surrogate)?;
    Ok(SpikingNeuron::new(params)?)
}

/// Poisson encoders are seeded from `simulation.seed`
pub fn encoder_from_config(config: &SpikeloopConfig) -> Result<Box<dyn InputEncoder>> {
    let encoder: Box<dyn InputEncoder> = match config.encoder.kind.to_ascii_lowercase().as_str() {
        "direct" => Box::new(DirectEncoder),
        "poisson" => Box::new(PoissonEncoder::new(config.simulation.seed)),
        other => {
            return Err(EngineError::InvalidConfig(format!(
                "unknown encoder kind '{}'",
                other
            )))
        }
    };
    debug!(
        "[BUILDER] encoder '{}' (seed {})",
        encoder.name(),
        config.simulation.seed
    );
    Ok(encoder)
}

pub fn driver_from_config(config: &SpikeloopConfig) -> Result<TemporalDriver> {
    Ok(TemporalDriver::new(config.simulation.timesteps)?
        .record_spikes(config.simulation.record_spikes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikeloop_npu_neural::NeuralError;

    #[test]
    fn test_default_config_builds_if_neuron() {
        let config = SpikeloopConfig::default();
        let neuron = neuron_from_config(&config).unwrap();
        let params = neuron.parameters();
        assert_eq!(params.model, ChargeModel::IntegrateAndFire);
        assert_eq!(params.v_reset, Some(0.0));
        assert_eq!(params.surrogate, SurrogateKind::Sigmoid { alpha: 4.0 });
    }

    #[test]
    fn test_soft_reset_lif_from_config() {
        let mut config = SpikeloopConfig::default();
        config.neuron.model = "LIF".to_string();
        config.neuron.tau = 4.0;
        config.neuron.soft_reset = true;
        config.surrogate.kind = "atan".to_string();
        config.surrogate.alpha = Some(3.0);

        let params = neuron_params_from_config(&config.neuron, &config.surrogate).unwrap();
        assert_eq!(params.model, ChargeModel::LeakyIntegrateAndFire { tau: 4.0 });
        assert!(params.is_soft_reset());
        assert_eq!(params.surrogate, SurrogateKind::ATan { alpha: 3.0 });
    }

    #[test]
    fn test_invalid_neuron_configs() {
        let mut config = SpikeloopConfig::default();
        config.neuron.v_threshold = -1.0;
        assert!(matches!(
            neuron_from_config(&config),
            Err(EngineError::Neural(NeuralError::InvalidThreshold { .. }))
        ));

        let mut config = SpikeloopConfig::default();
        config.neuron.model = "lif".to_string();
        config.neuron.tau = 0.0;
        assert!(matches!(
            neuron_from_config(&config),
            Err(EngineError::Neural(NeuralError::InvalidTimeConstant(_)))
        ));

        let mut config = SpikeloopConfig::default();
        config.neuron.model = "izhikevich".to_string();
        assert!(matches!(neuron_from_config(&config), Err(EngineError::InvalidConfig(_))));

        let mut config = SpikeloopConfig::default();
        config.surrogate.alpha = Some(-2.0);
        assert!(matches!(
            neuron_from_config(&config),
            Err(EngineError::Neural(NeuralError::InvalidSurrogateAlpha(_)))
        ));
    }

    #[test]
    fn test_encoder_and_driver_from_config() {
        let mut config = SpikeloopConfig::default();
        assert!(encoder_from_config(&config).unwrap().is_static());

        config.encoder.kind = "Poisson".to_string();
        config.simulation.timesteps = 5;
        assert!(!encoder_from_config(&config).unwrap().is_static());
        assert_eq!(driver_from_config(&config).unwrap().timesteps(), 5);

        config.encoder.kind = "rate".to_string();
        assert!(encoder_from_config(&config).is_err());

        config.simulation.timesteps = 0;
        assert_eq!(
            driver_from_config(&config).unwrap_err(),
            EngineError::InvalidTimesteps(0)
        );
    }
}
