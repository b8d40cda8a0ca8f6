// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ferrule invocation layer.
//!
//! This crate provides the error taxonomy, the request/response data model,
//! and the trait seams (provider transport, completion plugins) used
//! throughout the Ferrule workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorClass, FerruleError, ProviderError};
pub use traits::{Capability, CompletionPlugin, ProviderTransport};
pub use types::{
    ChatCompletionPayload, ChatCompletionResponse, ChatRequest, EmbeddingPayload,
    EmbeddingResponse, LlmResponse, Message, ModelInfo, ModelKind, Role, UsagePayload,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let msg = Message::system("You are a helpful assistant.");
        let json = serde_json::to_value(&msg).expect("should serialize");
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "You are a helpful assistant.");

        let parsed: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).expect("should parse");
        assert_eq!(parsed, Message::assistant("hi"));
    }

    #[test]
    fn model_kind_display_and_parse() {
        use std::str::FromStr;
        assert_eq!(ModelKind::Embedding.to_string(), "embedding");
        assert_eq!(ModelKind::from_str("chat").unwrap(), ModelKind::Chat);
    }

    #[test]
    fn embedding_response_never_reports_completion_tokens() {
        let resp = EmbeddingResponse {
            model_info: ModelInfo::embedding("text-embedding-ada-002", 0.0004, 8191),
            prompt_tokens_used: 12,
            embedding: vec![0.1, 0.2],
        };
        assert_eq!(resp.prompt_tokens_used(), 12);
        assert_eq!(resp.completion_tokens_used(), 0);
    }

    #[test]
    fn chat_request_omits_unset_options() {
        let req = ChatRequest::new("gpt-4", vec![Message::user("hello")]);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());

        let req = req.with_temperature(0.5).with_max_tokens(64);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["max_tokens"], 64);
    }

    #[test]
    fn embedding_usage_without_completion_counter_parses() {
        let body = r#"{"data":[{"embedding":[0.1,0.2,0.3]}],"usage":{"prompt_tokens":8,"total_tokens":8}}"#;
        let payload: EmbeddingPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.usage.prompt_tokens, 8);
        assert_eq!(payload.usage.completion_tokens, None);
        assert_eq!(payload.data[0].embedding.len(), 3);
    }

    #[test]
    fn capability_defaults_to_not_implemented() {
        assert_eq!(Capability::default(), Capability::NotImplemented);
        assert!(Capability::from_bool(true).handles());
        assert_eq!(Capability::from_bool(false), Capability::Declined);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_transport<T: ProviderTransport>() {}
        fn _assert_plugin<T: CompletionPlugin>() {}
    }
}
