// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token economics and spend tracking for the Ferrule invocation layer.
//!
//! This crate provides:
//! - **Model registry**: static catalog of known models with per-1000-token prices and limits
//! - **Budget tracker**: shared running totals of tokens and spend with graduated budget guidance

pub mod budget;
pub mod registry;

pub use budget::{BudgetTracker, SharedBudget};
pub use registry::ModelRegistry;
