// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Ferrule integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockTransport`] - Provider transport replaying scripted outcomes
//! - [`MockPlugin`] - Completion plugin with configurable hooks and call counters

pub mod mock_plugin;
pub mod mock_transport;

pub use mock_plugin::MockPlugin;
pub use mock_transport::{
    ChatOutcome, EmbeddingOutcome, MockTransport, api_error, bad_gateway, rate_limited,
};
