// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Ferrule configuration system.

use ferrule_config::diagnostic::ConfigError;
use ferrule_config::model::FerruleConfig;
use ferrule_config::{load_and_validate_str, load_config_from_str};
use ferrule_core::ModelKind;

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_ferrule_config() {
    let toml = r#"
[llm]
fast_llm = "gpt-3.5-turbo-0301"
smart_llm = "gpt-4-0314"
temperature = 0.7

[openai]
api_key = "sk-test"
use_azure = true
azure_api_version = "2023-05-15"

[openai.azure_model_map]
"gpt-3.5-turbo-0301" = "fast-deploy"
"gpt-4-0314" = "smart-deploy"
"text-embedding-ada-002" = "embed-deploy"

[retry]
num_retries = 4
backoff_base = 1.5
warn_user = false
deadline_secs = 120

[cost]
total_budget_usd = 2.5

[plugins]
allowlist = ["echo"]

[logging]
level = "debug"

[[models]]
name = "local-llama"
kind = "chat"
prompt_token_cost = 0.0
completion_token_cost = 0.0
max_tokens = 2048
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.llm.fast_llm, "gpt-3.5-turbo-0301");
    assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    assert!(config.openai.use_azure);
    assert_eq!(config.openai.deployment_for("gpt-4-0314"), Some("smart-deploy"));
    assert_eq!(config.retry.num_retries, 4);
    assert!(!config.retry.warn_user);
    assert_eq!(config.retry.deadline_secs, Some(120));
    assert_eq!(config.cost.total_budget_usd, Some(2.5));
    assert_eq!(config.plugins.allowlist, vec!["echo"]);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.models.len(), 1);
    assert_eq!(config.models[0].kind, ModelKind::Chat);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.llm.fast_llm, "gpt-3.5-turbo");
    assert_eq!(config.llm.smart_llm, "gpt-4");
    assert_eq!(config.llm.embedding_model, "text-embedding-ada-002");
    assert_eq!(config.llm.temperature, 0.0);
    assert_eq!(config.openai.api_base, "https://api.openai.com/v1");
    assert!(!config.openai.use_azure);
    assert_eq!(config.retry.num_retries, 10);
    assert!((config.retry.backoff_base - 2.0).abs() < f64::EPSILON);
    assert!(config.retry.warn_user);
    assert!(config.retry.deadline_secs.is_none());
    assert!(config.cost.total_budget_usd.is_none());
    assert!(config.plugins.allowlist.is_empty());
    assert!(config.models.is_empty());
}

/// Unknown field in [retry] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_produces_suggestion() {
    let toml = "[retry]\nnum_retires = 3\n";

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "num_retires");
            assert_eq!(suggestion.as_deref(), Some("num_retries"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// A string where a number belongs is reported as a type error.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = "[retry]\nbackoff_base = \"fast\"\n";

    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("backoff_base")),
        "got {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_through_load() {
    let toml = "[cost]\ntotal_budget_usd = -5.0\n";
    let errors = load_and_validate_str(toml).expect_err("negative budget should fail");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Dot-notation overrides (what `FERRULE_RETRY_NUM_RETRIES` maps to) win over TOML.
#[test]
fn env_style_override_wins_over_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: FerruleConfig = Figment::new()
        .merge(Serialized::defaults(FerruleConfig::default()))
        .merge(Toml::string("[retry]\nnum_retries = 2\n"))
        .merge(("retry.num_retries", 7))
        .extract()
        .expect("should merge override");

    assert_eq!(config.retry.num_retries, 7);
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    let config = ferrule_config::load_config_from_path(std::path::Path::new(
        "/nonexistent/path/ferrule.toml",
    ))
    .expect("missing file should be silently skipped");

    assert_eq!(config.llm.fast_llm, "gpt-3.5-turbo");
}

/// Serialized defaults load back unchanged.
#[test]
fn defaults_serialize_to_loadable_toml() {
    let rendered = toml::to_string(&FerruleConfig::default()).expect("defaults should serialize");
    let config = load_config_from_str(&rendered).expect("rendered defaults should load");
    assert_eq!(config.retry.num_retries, 10);
    assert_eq!(config.openai.timeout_secs, 300);
}
