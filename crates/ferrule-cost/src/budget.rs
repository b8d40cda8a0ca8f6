// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running token and spend totals with an optional budget ceiling.
//!
//! One tracker is created per run and shared by every invoker through a
//! [`SharedBudget`] handle; the mutex serializes `update_cost` so concurrent
//! completions never lose an update. Totals are in-memory only and start
//! from zero on every process start.

use std::sync::Arc;

use ferrule_config::model::CostConfig;
use ferrule_core::LlmResponse;
use tracing::debug;

/// Remaining budget below which the agent is told to shut down gracefully.
const GRACEFUL_SHUTDOWN_THRESHOLD: f64 = 0.005;
/// Remaining budget below which the agent is told to finish up.
const WARNING_THRESHOLD: f64 = 0.01;

/// Handle through which every invoker in a run reaches the same tracker.
pub type SharedBudget = Arc<tokio::sync::Mutex<BudgetTracker>>;

/// In-memory spend tracker.
#[derive(Debug, Clone, Default)]
pub struct BudgetTracker {
    total_prompt_tokens: u64,
    total_completion_tokens: u64,
    total_cost: f64,
    /// Spending ceiling (None = unbounded).
    total_budget: Option<f64>,
}

impl BudgetTracker {
    /// Create a tracker with zero totals and no ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with the ceiling from configuration.
    pub fn from_config(config: &CostConfig) -> Self {
        let mut tracker = Self::new();
        tracker.set_total_budget(config.total_budget_usd);
        tracker
    }

    /// Wrap this tracker in a shareable handle.
    pub fn shared(self) -> SharedBudget {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// Zero all totals and remove the ceiling.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set the spending ceiling. `None` means unbounded.
    pub fn set_total_budget(&mut self, total_budget: Option<f64>) {
        self.total_budget = total_budget;
    }

    /// Add a response's token usage to the totals and return the cost it added.
    ///
    /// Cost is `(prompt * prompt_cost + completion * completion_cost) / 1000`
    /// with per-1000-token prices from the response's model info.
    pub fn update_cost<R: LlmResponse + ?Sized>(&mut self, response: &R) -> f64 {
        let info = response.model_info();
        let prompt = response.prompt_tokens_used();
        let completion = response.completion_tokens_used();

        self.total_prompt_tokens += u64::from(prompt);
        self.total_completion_tokens += u64::from(completion);
        let cost = (f64::from(prompt) * info.prompt_token_cost
            + f64::from(completion) * info.completion_token_cost)
            / 1000.0;
        self.total_cost += cost;

        debug!(
            model = %info.name,
            prompt_tokens = prompt,
            completion_tokens = completion,
            cost_usd = cost,
            total_cost_usd = self.total_cost,
            "total running cost: ${:.3}",
            self.total_cost
        );
        cost
    }

    pub fn total_prompt_tokens(&self) -> u64 {
        self.total_prompt_tokens
    }

    pub fn total_completion_tokens(&self) -> u64 {
        self.total_completion_tokens
    }

    /// Total spend in USD.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// The ceiling, or `None` when unbounded.
    pub fn total_budget(&self) -> Option<f64> {
        self.total_budget
    }

    /// Ceiling minus spend. Negative once exceeded, infinite when unbounded.
    pub fn remaining_budget(&self) -> f64 {
        match self.total_budget {
            Some(budget) => budget - self.total_cost,
            None => f64::INFINITY,
        }
    }

    /// Budget guidance injected into agent prompts.
    ///
    /// Empty when unbounded. Tiers are checked most severe first.
    pub fn budget_status_message(&self) -> String {
        if self.total_budget.is_none() {
            return String::new();
        }

        let remaining = self.remaining_budget();
        let mut message = format!("Your remaining API budget is ${remaining:.3}");
        if remaining <= 0.0 {
            message.push_str(" BUDGET EXCEEDED! SHUT DOWN!\n\n");
        } else if remaining < GRACEFUL_SHUTDOWN_THRESHOLD {
            message.push_str(" Budget very nearly exceeded! Shut down gracefully!\n\n");
        } else if remaining < WARNING_THRESHOLD {
            message.push_str(" Budget nearly exceeded. Finish up.\n\n");
        }
        message
    }
}
