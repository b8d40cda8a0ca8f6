// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider transport trait for LLM HTTP integrations (OpenAI, Azure, etc.).

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{ChatCompletionPayload, ChatRequest, EmbeddingPayload};

/// A single round trip to a language-model provider.
///
/// Transports perform exactly one request per call and never retry on their
/// own; retry policy is applied by the caller. `Ok(None)` means the provider
/// answered successfully but without a usable body.
#[async_trait]
pub trait ProviderTransport: Send + Sync + 'static {
    /// Returns a short identifier for logs (e.g. "openai", "azure").
    fn name(&self) -> &str;

    /// Sends a chat completion request and returns the raw payload.
    async fn chat_completion(
        &self,
        request: &ChatRequest,
    ) -> Result<Option<ChatCompletionPayload>, ProviderError>;

    /// Embeds a single text with the given model and returns the raw payload.
    async fn embedding(
        &self,
        text: &str,
        model: &str,
    ) -> Result<Option<EmbeddingPayload>, ProviderError>;
}
