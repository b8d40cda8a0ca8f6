// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI (and Azure OpenAI) transport for Ferrule.
//!
//! [`OpenAiClient`] implements [`ferrule_core::ProviderTransport`]. It makes
//! exactly one HTTP request per call and maps the outcome onto
//! [`ferrule_core::ProviderError`]; retrying is left to the invoker.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
