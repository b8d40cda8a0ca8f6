// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ferrule.toml` > `~/.config/ferrule/ferrule.toml` > `/etc/ferrule/ferrule.toml`
//! with environment variable overrides via `FERRULE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FerruleConfig;

const SYSTEM_CONFIG: &str = "/etc/ferrule/ferrule.toml";
const LOCAL_CONFIG: &str = "ferrule.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ferrule/ferrule.toml` (system-wide)
/// 3. `~/.config/ferrule/ferrule.toml` (user XDG config)
/// 4. `./ferrule.toml` (local directory)
/// 5. `FERRULE_*` environment variables
pub fn load_config() -> Result<FerruleConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<FerruleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FerruleConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FerruleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FerruleConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FerruleConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// `~/.config/ferrule/ferrule.toml` on Linux, platform equivalent elsewhere.
pub(crate) fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("ferrule").join(LOCAL_CONFIG))
}

/// Paths searched by [`load_config`], lowest precedence first.
pub(crate) fn search_paths() -> Vec<std::path::PathBuf> {
    let mut paths = vec![std::path::PathBuf::from(SYSTEM_CONFIG)];
    paths.extend(user_config_path());
    paths.push(std::path::PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Environment provider mapping `FERRULE_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `FERRULE_RETRY_NUM_RETRIES` must become `retry.num_retries`.
fn env_provider() -> Env {
    Env::prefixed("FERRULE_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["llm", "openai", "retry", "cost", "plugins", "logging"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
