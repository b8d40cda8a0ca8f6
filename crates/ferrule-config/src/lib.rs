// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Ferrule invocation layer.
//!
//! Supplies model selection, retry tuning, the budget ceiling, and plugin
//! allow/deny lists. TOML files are merged over compiled defaults with
//! `FERRULE_*` environment overrides; unknown keys are rejected with
//! typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use ferrule_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("default model: {}", config.llm.fast_llm);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::FerruleConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors become miette diagnostics; on success the semantic
/// validation pass runs and reports every failure it finds.
pub fn load_and_validate() -> Result<FerruleConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<FerruleConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every config file that exists, for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::search_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let display = std::fs::canonicalize(&path)
                .unwrap_or(path)
                .display()
                .to_string();
            Some((display, content))
        })
        .collect()
}
