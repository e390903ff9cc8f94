// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neural Types Module
//!
//! Core type definitions shared by surrogates, models and neurons.

pub mod error;
pub mod tensor;

pub use error::{NeuralError, Result};
pub use tensor::{check_shape, heaviside, Tensor};
