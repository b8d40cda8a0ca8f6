// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive backoff bases, sane temperatures, and non-negative budgets.

use std::collections::HashSet;

use ferrule_core::ModelKind;

use crate::diagnostic::ConfigError;
use crate::model::FerruleConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FerruleConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !(config.retry.backoff_base > 0.0 && config.retry.backoff_base.is_finite()) {
        fail(format!(
            "retry.backoff_base must be a positive number, got {}",
            config.retry.backoff_base
        ));
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        fail(format!(
            "llm.temperature must be between 0 and 2, got {}",
            config.llm.temperature
        ));
    }

    for (key, value) in [
        ("llm.fast_llm", &config.llm.fast_llm),
        ("llm.smart_llm", &config.llm.smart_llm),
        ("llm.embedding_model", &config.llm.embedding_model),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if let Some(budget) = config.cost.total_budget_usd
        && budget < 0.0
    {
        fail(format!("cost.total_budget_usd must be non-negative, got {budget}"));
    }

    if config.openai.api_base.trim().is_empty() {
        fail("openai.api_base must not be empty".to_string());
    }

    if config.openai.use_azure {
        for model in [
            &config.llm.fast_llm,
            &config.llm.smart_llm,
            &config.llm.embedding_model,
        ] {
            if config.openai.deployment_for(model).is_none() {
                fail(format!(
                    "openai.use_azure is set but openai.azure_model_map has no deployment for `{model}`"
                ));
            }
        }
    }

    for (i, model) in config.models.iter().enumerate() {
        if model.name.trim().is_empty() {
            fail(format!("models[{i}].name must not be empty"));
        }
        if model.prompt_token_cost < 0.0 || model.completion_token_cost < 0.0 {
            fail(format!("models[{i}] (`{}`) has a negative token cost", model.name));
        }
        if model.kind == ModelKind::Embedding && model.completion_token_cost != 0.0 {
            fail(format!(
                "models[{i}] (`{}`) is an embedding model and must have completion_token_cost = 0",
                model.name
            ));
        }
    }

    let denied: HashSet<&String> = config.plugins.denylist.iter().collect();
    for name in &config.plugins.allowlist {
        if denied.contains(name) {
            fail(format!(
                "plugin `{name}` appears in both plugins.allowlist and plugins.denylist"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
