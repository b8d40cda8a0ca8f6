// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider transport for deterministic testing.
//!
//! `MockTransport` implements `ProviderTransport` with scripted outcomes,
//! enabling fast, CI-runnable tests of retry and accounting behavior without
//! external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use ferrule_core::error::BAD_GATEWAY;
use ferrule_core::{
    ChatCompletionPayload, ChatRequest, EmbeddingPayload, ProviderError, ProviderTransport,
};

/// Scripted result of one chat call.
pub type ChatOutcome = Result<Option<ChatCompletionPayload>, ProviderError>;
/// Scripted result of one embedding call.
pub type EmbeddingOutcome = Result<Option<EmbeddingPayload>, ProviderError>;

/// A rate-limit rejection.
pub fn rate_limited() -> ProviderError {
    ProviderError::RateLimited {
        message: "Rate limit reached for requests".to_string(),
    }
}

/// A 502 gateway fault.
pub fn bad_gateway() -> ProviderError {
    api_error(BAD_GATEWAY)
}

/// A non-success HTTP answer with the given status.
pub fn api_error(status: u16) -> ProviderError {
    ProviderError::Api {
        status,
        message: format!("mock status {status}"),
    }
}

/// A provider transport that replays pre-configured outcomes.
///
/// Outcomes are popped from per-operation FIFO queues. When a queue is
/// empty, a default successful payload is returned: "mock response" with
/// 10 prompt and 20 completion tokens for chat, and a three-element vector
/// with 8 prompt tokens for embeddings.
#[derive(Default)]
pub struct MockTransport {
    chat: Mutex<VecDeque<ChatOutcome>>,
    embeddings: Mutex<VecDeque<EmbeddingOutcome>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    embedding_requests: Mutex<Vec<(String, String)>>,
    chat_calls: AtomicU32,
    embedding_calls: AtomicU32,
}

impl MockTransport {
    /// Create a mock transport with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one chat outcome.
    pub fn then_chat(mut self, outcome: ChatOutcome) -> Self {
        self.chat.get_mut().push_back(outcome);
        self
    }

    /// Queue a successful single-choice chat payload.
    pub fn then_chat_text(self, content: &str, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.then_chat(Ok(Some(ChatCompletionPayload::text(
            content,
            prompt_tokens,
            completion_tokens,
        ))))
    }

    /// Queue `count` chat failures produced by `error`.
    pub fn then_chat_errors(mut self, count: usize, error: fn() -> ProviderError) -> Self {
        for _ in 0..count {
            self.chat.get_mut().push_back(Err(error()));
        }
        self
    }

    /// Queue one embedding outcome.
    pub fn then_embedding(mut self, outcome: EmbeddingOutcome) -> Self {
        self.embeddings.get_mut().push_back(outcome);
        self
    }

    /// Queue `count` embedding failures produced by `error`.
    pub fn then_embedding_errors(mut self, count: usize, error: fn() -> ProviderError) -> Self {
        for _ in 0..count {
            self.embeddings.get_mut().push_back(Err(error()));
        }
        self
    }

    /// Add a chat outcome to the end of the queue while the mock is shared.
    pub async fn push_chat(&self, outcome: ChatOutcome) {
        self.chat.lock().await.push_back(outcome);
    }

    /// Number of chat calls received so far.
    pub fn chat_calls(&self) -> u32 {
        self.chat_calls.load(Ordering::SeqCst)
    }

    /// Number of embedding calls received so far.
    pub fn embedding_calls(&self) -> u32 {
        self.embedding_calls.load(Ordering::SeqCst)
    }

    /// Every chat request received, in arrival order.
    pub async fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().await.clone()
    }

    /// Every `(text, model)` embedding request received, in arrival order.
    pub async fn embedding_requests(&self) -> Vec<(String, String)> {
        self.embedding_requests.lock().await.clone()
    }
}

#[async_trait]
impl ProviderTransport for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    async fn chat_completion(
        &self,
        request: &ChatRequest,
    ) -> Result<Option<ChatCompletionPayload>, ProviderError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_requests.lock().await.push(request.clone());
        self.chat
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Some(ChatCompletionPayload::text("mock response", 10, 20))))
    }

    async fn embedding(
        &self,
        text: &str,
        model: &str,
    ) -> Result<Option<EmbeddingPayload>, ProviderError> {
        self.embedding_calls.fetch_add(1, Ordering::SeqCst);
        self.embedding_requests
            .lock()
            .await
            .push((text.to_string(), model.to_string()));
        self.embeddings
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Some(EmbeddingPayload::vector(vec![0.1, 0.2, 0.3], 8))))
    }
}
