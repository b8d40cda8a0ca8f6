// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI wire types not shared with the rest of the workspace.
//!
//! Chat requests and both success payloads live in `ferrule-core`; only the
//! embedding request body and the error envelope are OpenAI-specific.

use serde::{Deserialize, Serialize};

/// Body of `POST /embeddings`. The input is always a one-element batch.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: [&'a str; 1],
    pub model: &'a str,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}
