// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog with per-model token economics.
//!
//! Built-in prices are USD per 1000 tokens:
//!
//! gpt-3.5-turbo:           prompt=$0.002,  completion=$0.002, 4096 tokens
//! gpt-4:                   prompt=$0.03,   completion=$0.06,  8192 tokens
//! text-embedding-ada-002:  prompt=$0.0004, completion=$0,     8191 tokens

use std::collections::HashMap;
use std::sync::LazyLock;

use ferrule_core::{FerruleError, ModelInfo, ModelKind};

static BUILTIN: LazyLock<ModelRegistry> = LazyLock::new(|| {
    ModelRegistry::from_models([
        ModelInfo::chat("gpt-3.5-turbo", 0.002, 0.002, 4096),
        ModelInfo::chat("gpt-3.5-turbo-0301", 0.002, 0.002, 4096),
        ModelInfo::chat("gpt-4", 0.03, 0.06, 8192),
        ModelInfo::chat("gpt-4-0314", 0.03, 0.06, 8192),
        ModelInfo::embedding("text-embedding-ada-002", 0.0004, 8191),
    ])
});

/// Read-only lookup table of known models.
///
/// Lookups are exact-name matches. Unlike price tables that fall back to a
/// default tier, an unknown name is an error so spend is never mis-attributed.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelInfo>,
}

impl ModelRegistry {
    /// The process-wide built-in catalog, created on first use.
    pub fn builtin() -> &'static ModelRegistry {
        &BUILTIN
    }

    /// Build a registry from explicit entries. Later duplicates replace earlier ones.
    pub fn from_models(models: impl IntoIterator<Item = ModelInfo>) -> Self {
        Self {
            models: models
                .into_iter()
                .map(|info| (info.name.clone(), info))
                .collect(),
        }
    }

    /// The built-in catalog extended (or overridden) by `extra` entries.
    pub fn with_models(extra: impl IntoIterator<Item = ModelInfo>) -> Self {
        let mut registry = Self::builtin().clone();
        for info in extra {
            registry.models.insert(info.name.clone(), info);
        }
        registry
    }

    /// Look up a model by exact name.
    pub fn lookup(&self, model_name: &str) -> Result<&ModelInfo, FerruleError> {
        self.models
            .get(model_name)
            .ok_or_else(|| FerruleError::UnknownModel {
                name: model_name.to_string(),
            })
    }

    /// Context window of a model, for truncation decisions by callers.
    pub fn max_tokens(&self, model_name: &str) -> Result<u32, FerruleError> {
        self.lookup(model_name).map(|info| info.max_tokens)
    }

    /// All entries, sorted by name.
    pub fn models(&self) -> Vec<&ModelInfo> {
        let mut models: Vec<&ModelInfo> = self.models.values().collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        models
    }

    /// Entries of one kind, sorted by name.
    pub fn models_of_kind(&self, kind: ModelKind) -> Vec<&ModelInfo> {
        self.models()
            .into_iter()
            .filter(|info| info.kind == kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
