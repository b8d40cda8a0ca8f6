// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered chain of completion plugins.
//!
//! The chain is built once from the host's plugin list and is read-only
//! afterwards, so it can be shared between concurrent invocations without
//! locking.

use std::sync::Arc;

use ferrule_config::model::PluginsConfig;
use ferrule_core::{ChatRequest, CompletionPlugin, FerruleError};
use tracing::{debug, info};

/// A completion produced by a plugin instead of the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interception {
    /// Name of the plugin that answered.
    pub plugin: String,
    /// The completion text.
    pub content: String,
}

/// Ordered list of plugins consulted before and after every provider call.
#[derive(Clone, Default)]
pub struct PluginChain {
    plugins: Vec<Arc<dyn CompletionPlugin>>,
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginChain")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginChain {
    /// Create a chain that consults `plugins` in the given order.
    pub fn new(plugins: Vec<Arc<dyn CompletionPlugin>>) -> Self {
        Self { plugins }
    }

    /// Create a chain keeping only the plugins `config` permits, order preserved.
    pub fn filtered(plugins: Vec<Arc<dyn CompletionPlugin>>, config: &PluginsConfig) -> Self {
        let plugins = plugins
            .into_iter()
            .filter(|plugin| {
                let permitted = config.permits(plugin.name());
                if !permitted {
                    info!(plugin = plugin.name(), "plugin skipped by allow/deny list");
                }
                permitted
            })
            .collect();
        Self { plugins }
    }

    /// Ask the plugins, in order, to answer `request` instead of the provider.
    ///
    /// The first plugin that reports it handles the request and returns a
    /// completion wins; later plugins are not consulted. A handler returning
    /// `None` gave up, so the scan moves on to the next plugin.
    //
    // First-match means that with several capable plugins only the earliest
    // registered one is ever used. Revisit if plugins need to compose.
    pub async fn intercept(
        &self,
        request: &ChatRequest,
    ) -> Result<Option<Interception>, FerruleError> {
        for plugin in &self.plugins {
            if !plugin.can_handle_chat_completion(request).handles() {
                continue;
            }
            match plugin.handle_chat_completion(request).await? {
                Some(content) => {
                    debug!(
                        plugin = plugin.name(),
                        version = %plugin.version(),
                        model = %request.model,
                        "chat completion answered by plugin"
                    );
                    return Ok(Some(Interception {
                        plugin: plugin.name().to_string(),
                        content,
                    }));
                }
                None => debug!(plugin = plugin.name(), "plugin declined after accepting request"),
            }
        }
        Ok(None)
    }

    /// Pass `content` through every plugin that rewrites responses, in order.
    pub fn transform_response(&self, content: String) -> String {
        self.plugins
            .iter()
            .filter(|plugin| plugin.can_handle_on_response().handles())
            .fold(content, |content, plugin| plugin.on_response(content))
    }

    /// Plugin names in chain order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
