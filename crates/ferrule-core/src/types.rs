// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, normalizer, budget, and invoker.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Speaker of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message. An ordered `Vec<Message>` forms a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// What a model produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelKind {
    Chat,
    Embedding,
}

/// Token economics and limits of a known model.
///
/// Costs are in USD per 1000 tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelInfo {
    pub name: String,
    pub kind: ModelKind,
    pub prompt_token_cost: f64,
    /// Always 0 for embedding models.
    #[serde(default)]
    pub completion_token_cost: f64,
    pub max_tokens: u32,
}

impl ModelInfo {
    /// A chat model entry.
    pub fn chat(
        name: impl Into<String>,
        prompt_token_cost: f64,
        completion_token_cost: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ModelKind::Chat,
            prompt_token_cost,
            completion_token_cost,
            max_tokens,
        }
    }

    /// An embedding model entry. Completion tokens are free by definition.
    pub fn embedding(name: impl Into<String>, prompt_token_cost: f64, max_tokens: u32) -> Self {
        Self {
            name: name.into(),
            kind: ModelKind::Embedding,
            prompt_token_cost,
            completion_token_cost: 0.0,
            max_tokens,
        }
    }
}

/// Usage-bearing response from a language model call.
pub trait LlmResponse {
    fn model_info(&self) -> &ModelInfo;
    fn prompt_tokens_used(&self) -> u32;
    fn completion_tokens_used(&self) -> u32;
}

/// A normalized chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionResponse {
    pub model_info: ModelInfo,
    pub prompt_tokens_used: u32,
    pub completion_tokens_used: u32,
    pub content: String,
}

impl LlmResponse for ChatCompletionResponse {
    fn model_info(&self) -> &ModelInfo {
        &self.model_info
    }

    fn prompt_tokens_used(&self) -> u32 {
        self.prompt_tokens_used
    }

    fn completion_tokens_used(&self) -> u32 {
        self.completion_tokens_used
    }
}

/// A normalized embedding. Embeddings never consume completion tokens, so
/// there is no field that could hold a nonzero count.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    pub model_info: ModelInfo,
    pub prompt_tokens_used: u32,
    pub embedding: Vec<f32>,
}

impl LlmResponse for EmbeddingResponse {
    fn model_info(&self) -> &ModelInfo {
        &self.model_info
    }

    fn prompt_tokens_used(&self) -> u32 {
        self.prompt_tokens_used
    }

    fn completion_tokens_used(&self) -> u32 {
        0
    }
}

/// An outbound chat completion request, as seen by plugins and transports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

// --- Raw provider payloads ---

/// Token counters as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsagePayload {
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Absent for embedding calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
}

/// The message inside a chat choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessagePayload {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
}

/// One completion alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicePayload {
    pub message: ChoiceMessagePayload,
}

/// Raw chat completion body: `{choices[].message.content, usage}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionPayload {
    #[serde(default)]
    pub choices: Vec<ChoicePayload>,
    #[serde(default)]
    pub usage: UsagePayload,
}

impl ChatCompletionPayload {
    /// A single-choice assistant payload.
    pub fn text(content: impl Into<String>, prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            choices: vec![ChoicePayload {
                message: ChoiceMessagePayload {
                    role: Role::Assistant,
                    content: Some(content.into()),
                },
            }],
            usage: UsagePayload {
                prompt_tokens,
                completion_tokens: Some(completion_tokens),
            },
        }
    }
}

/// One embedding vector in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingDataPayload {
    pub embedding: Vec<f32>,
}

/// Raw embedding body: `{data[].embedding, usage}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPayload {
    #[serde(default)]
    pub data: Vec<EmbeddingDataPayload>,
    #[serde(default)]
    pub usage: UsagePayload,
}

impl EmbeddingPayload {
    /// A single-vector payload with no completion counter.
    pub fn vector(embedding: Vec<f32>, prompt_tokens: u32) -> Self {
        Self {
            data: vec![EmbeddingDataPayload { embedding }],
            usage: UsagePayload {
                prompt_tokens,
                completion_tokens: None,
            },
        }
    }
}
