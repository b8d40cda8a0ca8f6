// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered interception chain for completion plugins.
//!
//! Plugins implement [`ferrule_core::CompletionPlugin`]. Before a provider
//! call the chain may short-circuit the request; after it, response content
//! is passed through every plugin that rewrites responses.

pub mod chain;

pub use chain::{Interception, PluginChain};
