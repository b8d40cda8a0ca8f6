// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI chat completion and embedding endpoints.
//!
//! Provides [`OpenAiClient`] which handles request construction,
//! authentication, Azure deployment routing, and status mapping.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use ferrule_config::model::OpenAiConfig;
use ferrule_core::{
    ChatCompletionPayload, ChatRequest, EmbeddingPayload, FerruleError, ProviderError,
    ProviderTransport,
};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{ApiErrorResponse, EmbeddingRequest};

/// Azure OpenAI routes by deployment id rather than model name.
#[derive(Debug, Clone)]
struct AzureRouting {
    api_version: String,
    deployments: HashMap<String, String>,
}

/// HTTP client for OpenAI API communication.
///
/// Manages authentication headers and connection pooling. Never retries:
/// a 429 or 502 is reported to the caller on the first occurrence.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    azure: Option<AzureRouting>,
}

impl OpenAiClient {
    /// Creates a client for the public OpenAI API (or a compatible server).
    ///
    /// # Arguments
    /// * `api_key` - sent as a bearer token
    /// * `base_url` - e.g. `https://api.openai.com/v1`
    pub fn new(api_key: &str, base_url: impl Into<String>) -> Result<Self, FerruleError> {
        let headers = bearer_headers(api_key, None)?;
        Ok(Self {
            client: build_http_client(headers, Duration::from_secs(300))?,
            base_url: trim_base(base_url.into()),
            azure: None,
        })
    }

    /// Creates a client from the `[openai]` configuration section.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, FerruleError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            FerruleError::Config(
                "OpenAI API key not set (config key openai.api_key or FERRULE_OPENAI_API_KEY)"
                    .into(),
            )
        })?;

        let (headers, azure) = if config.use_azure {
            let mut headers = HeaderMap::new();
            headers.insert("api-key", header_value(api_key, "API key")?);
            let routing = AzureRouting {
                api_version: config.azure_api_version.clone(),
                deployments: config.azure_model_map.clone(),
            };
            (headers, Some(routing))
        } else {
            (bearer_headers(api_key, config.organization.as_deref())?, None)
        };

        Ok(Self {
            client: build_http_client(headers, Duration::from_secs(config.timeout_secs))?,
            base_url: trim_base(config.api_base.clone()),
            azure,
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `endpoint` (`chat/completions` or `embeddings`) and `model`.
    fn endpoint_url(&self, endpoint: &str, model: &str) -> String {
        match &self.azure {
            None => format!("{}/{endpoint}", self.base_url),
            Some(azure) => {
                let deployment = azure.deployments.get(model).map_or_else(
                    || {
                        debug!(model, "no Azure deployment mapped, using model name");
                        model
                    },
                    String::as_str,
                );
                format!(
                    "{}/openai/deployments/{deployment}/{endpoint}?api-version={}",
                    self.base_url, azure.api_version
                )
            }
        }
    }

    /// Sends one POST and maps the outcome.
    ///
    /// A successful response whose body is JSON `null` yields `Ok(None)`.
    async fn post<B, T>(&self, url: &str, body: &B) -> Result<Option<T>, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "provider response received");

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;

        if status.is_success() {
            return serde_json::from_str::<Option<T>>(&text).map_err(|e| ProviderError::Decode {
                message: format!("failed to parse API response: {e}"),
            });
        }

        let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
            Ok(api_err) => api_err.error.message,
            Err(_) => format!("API returned {status}: {text}"),
        };
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited { message });
        }
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ProviderTransport for OpenAiClient {
    fn name(&self) -> &str {
        if self.azure.is_some() {
            "azure-openai"
        } else {
            "openai"
        }
    }

    async fn chat_completion(
        &self,
        request: &ChatRequest,
    ) -> Result<Option<ChatCompletionPayload>, ProviderError> {
        let url = self.endpoint_url("chat/completions", &request.model);
        self.post(&url, request).await
    }

    async fn embedding(
        &self,
        text: &str,
        model: &str,
    ) -> Result<Option<EmbeddingPayload>, ProviderError> {
        let url = self.endpoint_url("embeddings", model);
        let body = EmbeddingRequest {
            input: [text],
            model,
        };
        self.post(&url, &body).await
    }
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue, FerruleError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|e| FerruleError::Config(format!("invalid {what} header value: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

fn bearer_headers(api_key: &str, organization: Option<&str>) -> Result<HeaderMap, FerruleError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        header_value(&format!("Bearer {api_key}"), "API key")?,
    );
    if let Some(org) = organization {
        headers.insert("openai-organization", header_value(org, "organization")?);
    }
    Ok(headers)
}

fn build_http_client(
    mut headers: HeaderMap,
    timeout: Duration,
) -> Result<reqwest::Client, FerruleError> {
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| FerruleError::Config(format!("failed to build HTTP client: {e}")))
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}
