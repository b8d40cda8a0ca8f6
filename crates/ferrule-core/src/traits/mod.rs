// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the invocation layer and its collaborators.
//!
//! Both traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod plugin;
pub mod transport;

pub use plugin::{Capability, CompletionPlugin};
pub use transport::ProviderTransport;
