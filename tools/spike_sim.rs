// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spiking network simulation runner.
//!
//! Builds `Linear -> neuron -> Linear -> neuron` from `spikeloop.toml`, feeds
//! a seeded random batch through the temporal driver and prints per-row
//! firing rates and predictions.
//!
//! Usage: spike_sim [--config <path>] [--set key=value]... [--debug-<crate>]

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spikeloop::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    SpikeloopConfig,
};
use spikeloop::engine::{
    driver_from_config, encoder_from_config, neuron_from_config, Linear, SpikingNetwork, Stage,
};
use spikeloop::observability::{debug_flags_help, init_logging, parse_debug_flags, LogFormat, LoggingConfig};
use tracing::{info, warn};

const INPUT_FEATURES: usize = 16;
const HIDDEN_FEATURES: usize = 32;
const CLASSES: usize = 4;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: spike_sim [--config <path>] [--set key=value]...\n\n\
         Override keys: timesteps, seed, batch_size, v_threshold, detach_reset, encoder, log_level\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> (Option<PathBuf>, HashMap<String, String>) {
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
            }
            "--set" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let Some((key, value)) = v.split_once('=') else {
                    eprintln!("Expected key=value, got: {v}");
                    usage_and_exit();
                };
                overrides.insert(key.trim().to_string(), value.trim().to_string());
            }
            "-h" | "--help" => usage_and_exit(),
            // Consumed by parse_debug_flags
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    (config_path, overrides)
}

fn resolve_config(
    config_path: Option<PathBuf>,
    overrides: &HashMap<String, String>,
) -> Result<SpikeloopConfig> {
    match load_config(config_path.as_deref(), Some(overrides)) {
        Ok(config) => Ok(config),
        // No file anywhere: run on defaults, still honouring overrides
        Err(ConfigError::FileNotFound(_)) if config_path.is_none() => {
            let mut config = SpikeloopConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, overrides);
            Ok(config)
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn build_network(config: &SpikeloopConfig) -> Result<SpikingNetwork> {
    let seed = config.simulation.seed;
    let network = SpikingNetwork::new(vec![
        Stage::transform(Linear::seeded(INPUT_FEATURES, HIDDEN_FEATURES, seed)?),
        neuron_from_config(config)?.into(),
        Stage::transform(Linear::seeded(HIDDEN_FEATURES, CLASSES, seed.wrapping_add(1))?),
        neuron_from_config(config)?.into(),
    ])?;
    Ok(network)
}

fn main() -> Result<()> {
    let (config_path, overrides) = parse_args();
    let config = resolve_config(config_path, &overrides)?;

    let logging = LoggingConfig {
        level: config.logging.level.clone(),
        format: LogFormat::from_name(&config.logging.format),
        log_dir: config.logging.log_dir.clone(),
    };
    let _guard = init_logging(&parse_debug_flags(), &logging).context("Failed to initialise logging")?;

    validate_config(&config).context("Invalid configuration")?;

    let mut network = build_network(&config).context("Failed to build network")?;
    let driver = driver_from_config(&config)?;
    let mut encoder = encoder_from_config(&config)?;
    info!(
        "Simulating {} timesteps, batch {}, encoder '{}', static prefix {} of {} stages",
        driver.timesteps(),
        config.simulation.batch_size,
        encoder.name(),
        network.static_len(),
        network.len()
    );

    let mut rng = StdRng::seed_from_u64(config.simulation.seed);
    let batch = Array2::from_shape_fn((config.simulation.batch_size, INPUT_FEATURES), |_| {
        rng.gen::<f32>()
    })
    .into_dyn();

    let output = driver
        .simulate_encoded(&mut network, &batch, encoder.as_mut())
        .context("Simulation failed")?;
    network.reset();

    let predictions = output.predictions();
    for (row, (rates, prediction)) in output.rate.outer_iter().zip(&predictions).enumerate() {
        let rates: Vec<String> = rates.iter().map(|r| format!("{:.3}", r)).collect();
        println!("sample {:>3}: rate [{}] -> class {}", row, rates.join(", "), prediction);
    }

    let silent = output.spike_count.iter().filter(|&&c| c == 0.0).count();
    if silent == output.spike_count.len() {
        warn!("No output unit fired; consider more timesteps or a lower v_threshold");
    }
    info!(
        "Total output spikes: {} over {} timesteps",
        output.spike_count.sum(),
        output.timesteps
    );

    Ok(())
}
