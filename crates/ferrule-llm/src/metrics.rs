// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. Without an installed recorder every call is a
//! no-op.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all Ferrule metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("ferrule_tokens_total", "Total tokens consumed");
    describe_counter!(
        "ferrule_calls_total",
        "Completed invocations by operation and outcome"
    );
    describe_histogram!("ferrule_call_cost_usd", "Cost of a single call in USD");
    describe_gauge!("ferrule_budget_remaining_usd", "Remaining API budget in USD");
    describe_histogram!(
        "ferrule_call_latency_seconds",
        "End-to-end invocation latency in seconds, retries included"
    );
}

/// Record token consumption.
pub fn record_tokens(model: &str, prompt: u32, completion: u32) {
    metrics::counter!("ferrule_tokens_total", "model" => model.to_string(), "type" => "prompt")
        .increment(u64::from(prompt));
    metrics::counter!("ferrule_tokens_total", "model" => model.to_string(), "type" => "completion")
        .increment(u64::from(completion));
}

/// Record what a single call cost.
pub fn record_cost(model: &str, usd: f64) {
    metrics::histogram!("ferrule_call_cost_usd", "model" => model.to_string()).record(usd);
}

/// Record how an invocation ended, e.g. `ok`, `plugin`, `rate_limited`.
pub fn record_retry_outcome(operation: &'static str, outcome: &'static str) {
    metrics::counter!("ferrule_calls_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

/// Set the remaining budget in USD.
pub fn set_budget_remaining(usd: f64) {
    metrics::gauge!("ferrule_budget_remaining_usd").set(usd);
}

/// Record invocation latency.
pub fn record_latency(operation: &'static str, seconds: f64) {
    metrics::histogram!("ferrule_call_latency_seconds", "operation" => operation).record(seconds);
}
