// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of raw provider payloads into typed responses.

use ferrule_core::{
    ChatCompletionPayload, ChatCompletionResponse, EmbeddingPayload, EmbeddingResponse,
    FerruleError, ModelInfo,
};

fn malformed(message: impl Into<String>) -> FerruleError {
    FerruleError::MalformedResponse {
        message: message.into(),
    }
}

/// Take the first choice's content and the usage counters of a chat payload.
pub fn normalize_chat(
    raw: ChatCompletionPayload,
    model_info: &ModelInfo,
) -> Result<ChatCompletionResponse, FerruleError> {
    let completion_tokens_used = raw
        .usage
        .completion_tokens
        .ok_or_else(|| malformed("chat completion usage lacks completion_tokens"))?;
    let choice = raw
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| malformed("chat completion has no choices"))?;
    let content = choice
        .message
        .content
        .ok_or_else(|| malformed("chat completion content is null"))?;

    Ok(ChatCompletionResponse {
        model_info: model_info.clone(),
        prompt_tokens_used: raw.usage.prompt_tokens,
        completion_tokens_used,
        content,
    })
}

/// Take the first vector and the prompt token count of an embedding payload.
pub fn normalize_embedding(
    raw: EmbeddingPayload,
    model_info: &ModelInfo,
) -> Result<EmbeddingResponse, FerruleError> {
    if let Some(completion) = raw.usage.completion_tokens.filter(|&n| n != 0) {
        return Err(malformed(format!(
            "embedding response reports {completion} completion tokens"
        )));
    }
    let data = raw
        .data
        .into_iter()
        .next()
        .ok_or_else(|| malformed("embedding response has no data"))?;

    Ok(EmbeddingResponse {
        model_info: model_info.clone(),
        prompt_tokens_used: raw.usage.prompt_tokens,
        embedding: data.embedding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_core::types::{ChoiceMessagePayload, ChoicePayload, UsagePayload};
    use ferrule_core::{LlmResponse, Role};

    fn gpt35() -> ModelInfo {
        ModelInfo::chat("gpt-3.5-turbo", 0.002, 0.002, 4096)
    }

    fn ada() -> ModelInfo {
        ModelInfo::embedding("text-embedding-ada-002", 0.0004, 8191)
    }

    #[test]
    fn chat_takes_first_choice_and_usage() {
        let mut raw = ChatCompletionPayload::text("first", 12, 7);
        raw.choices.push(ChoicePayload {
            message: ChoiceMessagePayload {
                role: Role::Assistant,
                content: Some("second".into()),
            },
        });

        let response = normalize_chat(raw, &gpt35()).unwrap();
        assert_eq!(response.content, "first");
        assert_eq!(response.prompt_tokens_used(), 12);
        assert_eq!(response.completion_tokens_used(), 7);
        assert_eq!(response.model_info().name, "gpt-3.5-turbo");
    }

    #[test]
    fn chat_with_empty_string_content_is_valid() {
        let response = normalize_chat(ChatCompletionPayload::text("", 1, 0), &gpt35()).unwrap();
        assert_eq!(response.content, "");
    }

    #[test]
    fn chat_without_choices_is_malformed() {
        let raw = ChatCompletionPayload {
            choices: vec![],
            usage: UsagePayload {
                prompt_tokens: 1,
                completion_tokens: Some(1),
            },
        };
        let err = normalize_chat(raw, &gpt35()).unwrap_err();
        assert!(matches!(err, FerruleError::MalformedResponse { .. }));
    }

    #[test]
    fn chat_with_null_content_is_malformed() {
        let mut raw = ChatCompletionPayload::text("x", 1, 1);
        raw.choices[0].message.content = None;
        let err = normalize_chat(raw, &gpt35()).unwrap_err();
        assert!(err.to_string().contains("null"), "{err}");
    }

    #[test]
    fn chat_without_completion_counter_is_malformed() {
        let mut raw = ChatCompletionPayload::text("x", 1, 1);
        raw.usage.completion_tokens = None;
        assert!(normalize_chat(raw, &gpt35()).is_err());
    }

    #[test]
    fn embedding_takes_first_vector() {
        let response =
            normalize_embedding(EmbeddingPayload::vector(vec![0.25, 0.5], 4), &ada()).unwrap();
        assert_eq!(response.embedding, vec![0.25, 0.5]);
        assert_eq!(response.prompt_tokens_used(), 4);
        assert_eq!(response.completion_tokens_used(), 0);
    }

    #[test]
    fn embedding_with_explicit_zero_completion_is_accepted() {
        let mut raw = EmbeddingPayload::vector(vec![1.0], 4);
        raw.usage.completion_tokens = Some(0);
        assert!(normalize_embedding(raw, &ada()).is_ok());
    }

    #[test]
    fn embedding_with_completion_tokens_is_malformed() {
        let mut raw = EmbeddingPayload::vector(vec![1.0], 4);
        raw.usage.completion_tokens = Some(3);
        let err = normalize_embedding(raw, &ada()).unwrap_err();
        assert!(err.to_string().contains("3 completion tokens"), "{err}");
    }

    #[test]
    fn embedding_without_data_is_malformed() {
        let raw = EmbeddingPayload {
            data: vec![],
            usage: UsagePayload::default(),
        };
        assert!(matches!(
            normalize_embedding(raw, &ada()),
            Err(FerruleError::MalformedResponse { .. })
        ));
    }
}
