// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilient language-model invocation for the Ferrule workspace.
//!
//! The [`ResilientInvoker`] is the central coordinator that:
//! - Lets completion plugins answer before the provider is called
//! - Retries rate limits and gateway faults with exponential backoff
//! - Normalizes raw payloads into typed responses
//! - Charges every call to the run's shared budget
//! - Passes response content through response plugins

pub mod invoker;
pub mod metrics;
pub mod normalize;

pub use invoker::ResilientInvoker;
pub use normalize::{normalize_chat, normalize_embedding};

pub use ferrule_cost::{BudgetTracker, ModelRegistry, SharedBudget};
pub use ferrule_plugin::PluginChain;
pub use ferrule_resilience::{AbortSignal, RetryPolicy};

/// Install a global `fmt` subscriber filtered to `ferrule={log_level},warn`.
///
/// Hosts pass `config.logging.level` from their loaded `FerruleConfig`.
/// `RUST_LOG` takes precedence when set. Returns `false` if a global
/// subscriber was already installed.
pub fn init_tracing(log_level: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ferrule={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init()
        .is_ok()
}
