// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeloop-observability
//!
//! Logging setup shared by every spikeloop binary, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: Rolling JSON log files next to the console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known spikeloop crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "spikeloop",
    "spikeloop-npu-neural",
    "spikeloop-npu-engine",
    "spikeloop-config",
];
