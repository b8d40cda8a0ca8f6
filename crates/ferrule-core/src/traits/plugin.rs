// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interception plugin trait for third-party request/response hooks.

use async_trait::async_trait;

use crate::error::FerruleError;
use crate::types::ChatRequest;

/// A plugin's answer to a capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capability {
    /// The plugin does not implement this hook at all.
    #[default]
    NotImplemented,
    /// The plugin implements the hook but does not want this call.
    Declined,
    /// The plugin wants to handle this call.
    Handles,
}

impl Capability {
    /// Maps a yes/no answer from a plugin that implements the hook.
    pub fn from_bool(handles: bool) -> Self {
        if handles {
            Capability::Handles
        } else {
            Capability::Declined
        }
    }

    pub fn handles(self) -> bool {
        self == Capability::Handles
    }
}

/// A plugin that may intercept chat completions or rewrite their content.
///
/// Every hook has a default that reports [`Capability::NotImplemented`], so a
/// plugin only overrides the hooks it supports.
#[async_trait]
pub trait CompletionPlugin: Send + Sync + 'static {
    /// Returns the plugin's name, used by allow/deny lists and logs.
    fn name(&self) -> &str;

    /// Returns the semantic version of this plugin.
    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    /// Whether this plugin wants to answer `request` instead of the provider.
    fn can_handle_chat_completion(&self, _request: &ChatRequest) -> Capability {
        Capability::NotImplemented
    }

    /// Produces the completion text. `None` means the plugin gave up after all.
    async fn handle_chat_completion(
        &self,
        _request: &ChatRequest,
    ) -> Result<Option<String>, FerruleError> {
        Ok(None)
    }

    /// Whether this plugin rewrites response content.
    fn can_handle_on_response(&self) -> Capability {
        Capability::NotImplemented
    }

    /// Rewrites the response content.
    fn on_response(&self, content: String) -> String {
        content
    }
}
