// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every violation before failing so that a broken file is fixed in
//! one pass. The same constraints are enforced again when neurons and drivers
//! are constructed; this layer reports them with configuration key names.

use crate::{ConfigError, ConfigResult, SpikeloopConfig};

const NEURON_MODELS: &[&str] = &["if", "lif"];
const SURROGATE_KINDS: &[&str] = &["sigmoid", "atan", "triangle"];
const ENCODER_KINDS: &[&str] = &["direct", "poisson"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    ThresholdNotAboveReset { v_threshold: f32, v_reset: f32 },
    UnknownVariant { field: String, value: String, allowed: &'static [&'static str] },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThresholdNotAboveReset { v_threshold, v_reset } => write!(
                f,
                "neuron.v_threshold ({}) must be greater than neuron.v_reset ({})",
                v_threshold, v_reset
            ),
            Self::UnknownVariant { field, value, allowed } => write!(
                f,
                "{} = '{}' is not one of: {}",
                field,
                value,
                allowed.join(", ")
            ),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Finite threshold, reset and initial potential; threshold/reset ordering (fixed-reset mode only)
/// - Positive, finite `tau` and surrogate `alpha`
/// - `timesteps >= 1` and `batch_size >= 1`
/// - Known model, surrogate, encoder, log level and log format names
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &SpikeloopConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_neuron(config, &mut errors);
    validate_surrogate(config, &mut errors);
    validate_simulation(config, &mut errors);
    validate_variants(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_neuron(config: &SpikeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    let neuron = &config.neuron;

    if !neuron.v_threshold.is_finite() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "neuron.v_threshold".to_string(),
            reason: "must be finite".to_string(),
        });
    }

    if let Some(v_reset) = neuron.effective_reset() {
        if !v_reset.is_finite() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "neuron.v_reset".to_string(),
                reason: "must be finite".to_string(),
            });
        } else if neuron.v_threshold <= v_reset {
            errors.push(ConfigValidationError::ThresholdNotAboveReset {
                v_threshold: neuron.v_threshold,
                v_reset,
            });
        }
    }

    if let Some(v_init) = neuron.v_init {
        if !v_init.is_finite() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "neuron.v_init".to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }

    if neuron.model.eq_ignore_ascii_case("lif") && !(neuron.tau.is_finite() && neuron.tau > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "neuron.tau".to_string(),
            reason: "must be finite and positive".to_string(),
        });
    }
}

fn validate_surrogate(config: &SpikeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    if let Some(alpha) = config.surrogate.alpha {
        if !(alpha.is_finite() && alpha > 0.0) {
            errors.push(ConfigValidationError::InvalidValue {
                field: "surrogate.alpha".to_string(),
                reason: "must be finite and positive".to_string(),
            });
        }
    }
}

fn validate_simulation(config: &SpikeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.simulation.timesteps < 1 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "simulation.timesteps".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.simulation.batch_size < 1 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "simulation.batch_size".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_variants(config: &SpikeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    let checks: [(&str, &str, &'static [&'static str]); 5] = [
        ("neuron.model", config.neuron.model.as_str(), NEURON_MODELS),
        ("surrogate.kind", config.surrogate.kind.as_str(), SURROGATE_KINDS),
        ("encoder.kind", config.encoder.kind.as_str(), ENCODER_KINDS),
        ("logging.level", config.logging.level.as_str(), LOG_LEVELS),
        ("logging.format", config.logging.format.as_str(), LOG_FORMATS),
    ];
    for (field, value, allowed) in checks {
        if !allowed.contains(&value.to_lowercase().as_str()) {
            errors.push(ConfigValidationError::UnknownVariant {
                field: field.to_string(),
                value: value.to_string(),
                allowed,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SpikeloopConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_threshold_must_exceed_reset() {
        let mut config = SpikeloopConfig::default();
        config.neuron.v_threshold = 0.0;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("neuron.v_threshold"));
            assert!(msg.contains("neuron.v_reset"));
        } else {
            panic!("expected validation error");
        }

        // Soft reset lifts the ordering constraint
        config.neuron.soft_reset = true;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timesteps_rejected() {
        let mut config = SpikeloopConfig::default();
        config.simulation.timesteps = 0;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("simulation.timesteps"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_tau_only_checked_for_lif() {
        let mut config = SpikeloopConfig::default();
        config.neuron.tau = -1.0;
        assert!(validate_config(&config).is_ok());

        config.neuron.model = "lif".to_string();
        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("neuron.tau"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_all_violations_reported_together() {
        let mut config = SpikeloopConfig::default();
        config.surrogate.kind = "relu".to_string();
        config.surrogate.alpha = Some(0.0);
        config.encoder.kind = "rate".to_string();
        config.logging.format = "xml".to_string();

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("surrogate.kind = 'relu'"));
            assert!(msg.contains("surrogate.alpha"));
            assert!(msg.contains("encoder.kind = 'rate'"));
            assert!(msg.contains("logging.format"));
            assert!(msg.contains("sigmoid, atan, triangle"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_non_finite_v_init_reported_with_other_neuron_errors() {
        let mut config = SpikeloopConfig::default();
        config.neuron.v_init = Some(f32::NAN);
        config.neuron.v_threshold = -0.5;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("neuron.v_init"));
            assert!(msg.contains("must be greater than neuron.v_reset"));
        } else {
            panic!("expected validation error");
        }

        config.neuron.v_threshold = 1.0;
        config.neuron.v_init = Some(0.25);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_variant_names_are_case_insensitive() {
        let mut config = SpikeloopConfig::default();
        config.neuron.model = "LIF".to_string();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
