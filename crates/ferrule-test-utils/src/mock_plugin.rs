// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configurable completion plugin that counts how it was used.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use ferrule_core::{Capability, ChatRequest, CompletionPlugin, FerruleError};

/// A plugin whose hooks are set up with builder methods.
///
/// By default every hook reports [`Capability::NotImplemented`].
#[derive(Debug, Default)]
pub struct MockPlugin {
    name: String,
    chat: Capability,
    reply: Option<String>,
    fail: bool,
    response: Capability,
    suffix: String,
    can_handle_calls: AtomicU32,
    handle_calls: AtomicU32,
    on_response_calls: AtomicU32,
}

impl MockPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Claim every chat request and answer it with `reply`.
    pub fn answering(mut self, reply: impl Into<String>) -> Self {
        self.chat = Capability::Handles;
        self.reply = Some(reply.into());
        self
    }

    /// Claim every chat request, then return no completion.
    pub fn giving_up(mut self) -> Self {
        self.chat = Capability::Handles;
        self.reply = None;
        self
    }

    /// Claim every chat request, then fail.
    pub fn failing(mut self) -> Self {
        self.chat = Capability::Handles;
        self.fail = true;
        self
    }

    /// Implement the chat hook but decline every request.
    pub fn declining(mut self) -> Self {
        self.chat = Capability::Declined;
        self
    }

    /// Rewrite responses by appending `suffix`.
    pub fn appending(mut self, suffix: impl Into<String>) -> Self {
        self.response = Capability::Handles;
        self.suffix = suffix.into();
        self
    }

    /// Implement the response hook but decline to rewrite.
    pub fn declining_responses(mut self) -> Self {
        self.response = Capability::Declined;
        self
    }

    pub fn can_handle_calls(&self) -> u32 {
        self.can_handle_calls.load(Ordering::SeqCst)
    }

    pub fn handle_calls(&self) -> u32 {
        self.handle_calls.load(Ordering::SeqCst)
    }

    pub fn on_response_calls(&self) -> u32 {
        self.on_response_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionPlugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle_chat_completion(&self, _request: &ChatRequest) -> Capability {
        self.can_handle_calls.fetch_add(1, Ordering::SeqCst);
        self.chat
    }

    async fn handle_chat_completion(
        &self,
        _request: &ChatRequest,
    ) -> Result<Option<String>, FerruleError> {
        self.handle_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FerruleError::Plugin {
                name: self.name.clone(),
                message: "mock failure".to_string(),
            });
        }
        Ok(self.reply.clone())
    }

    fn can_handle_on_response(&self) -> Capability {
        self.response
    }

    fn on_response(&self, content: String) -> String {
        self.on_response_calls.fetch_add(1, Ordering::SeqCst);
        content + &self.suffix
    }
}
