// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, SpikeloopConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "spikeloop.toml";

/// Find the spikeloop configuration file
///
/// Search order:
/// 1. `SPIKELOOP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./spikeloop.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SPIKELOOP_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SPIKELOOP_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SPIKELOOP_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Value validation is separate: see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SpikeloopConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SpikeloopConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPIKELOOP_TIMESTEPS` -> `simulation.timesteps`
/// - `SPIKELOOP_SEED` -> `simulation.seed`
/// - `SPIKELOOP_BATCH_SIZE` -> `simulation.batch_size`
/// - `SPIKELOOP_V_THRESHOLD` -> `neuron.v_threshold`
/// - `SPIKELOOP_DETACH_RESET` -> `neuron.detach_reset`
/// - `SPIKELOOP_ENCODER` -> `encoder.kind`
/// - `SPIKELOOP_LOG_LEVEL` -> `logging.level`
///
/// Unparseable values are ignored and the file value is kept.
pub fn apply_environment_overrides(config: &mut SpikeloopConfig) {
    apply_overrides(config, |key| {
        let var = format!("SPIKELOOP_{}", key.to_uppercase());
        env::var(var).ok()
    });
}

/// Apply CLI argument overrides to configuration
///
/// Keys use the same short names as the environment variables, lowercased:
/// `{"timesteps": "16", "encoder": "poisson"}`
pub fn apply_cli_overrides(config: &mut SpikeloopConfig, cli_args: &HashMap<String, String>) {
    apply_overrides(config, |key| cli_args.get(key).cloned());
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

fn apply_overrides<F>(config: &mut SpikeloopConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("timesteps") {
        if let Ok(timesteps) = value.parse::<usize>() {
            config.simulation.timesteps = timesteps;
        }
    }
    if let Some(value) = lookup("seed") {
        if let Ok(seed) = value.parse::<u64>() {
            config.simulation.seed = seed;
        }
    }
    if let Some(value) = lookup("batch_size") {
        if let Ok(batch_size) = value.parse::<usize>() {
            config.simulation.batch_size = batch_size;
        }
    }
    if let Some(value) = lookup("v_threshold") {
        if let Ok(v_threshold) = value.parse::<f32>() {
            config.neuron.v_threshold = v_threshold;
        }
    }
    if let Some(value) = lookup("detach_reset") {
        config.neuron.detach_reset = parse_bool(&value);
    }
    if let Some(value) = lookup("encoder") {
        config.encoder.kind = value;
    }
    if let Some(value) = lookup("log_level") {
        config.logging.level = value;
    }
}
