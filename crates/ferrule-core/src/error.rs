// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ferrule invocation layer.

use thiserror::Error;

/// HTTP status the provider uses for a temporary gateway fault.
pub const BAD_GATEWAY: u16 = 502;

/// How the retry policy treats a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The provider is throttling requests.
    RateLimit,
    /// Temporary gateway fault between us and the provider.
    BadGateway,
    /// Anything else. Never retried.
    Fatal,
}

/// A failure reported by a provider transport.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the request because of rate limiting.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The response body could not be decoded.
    #[error("undecodable response: {message}")]
    Decode { message: String },
}

impl ProviderError {
    /// Classify this error for the retry policy.
    pub fn class(&self) -> ErrorClass {
        match self {
            ProviderError::RateLimited { .. } => ErrorClass::RateLimit,
            ProviderError::Api { status, .. } if *status == BAD_GATEWAY => ErrorClass::BadGateway,
            _ => ErrorClass::Fatal,
        }
    }

    /// Returns true if retrying after a delay may succeed.
    pub fn is_transient(&self) -> bool {
        self.class() != ErrorClass::Fatal
    }
}

/// The primary error type returned by every Ferrule operation.
#[derive(Debug, Error)]
pub enum FerruleError {
    /// The model name is absent from the model registry.
    #[error("unknown model: {name}")]
    UnknownModel { name: String },

    /// The provider failed. Transient failures only surface here once the
    /// retry budget is spent.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A provider payload violated a normalization invariant.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Every attempt finished without error but none yielded a usable response.
    #[error("provider unavailable: no usable response after {attempts} attempt(s)")]
    ProviderUnavailable { attempts: u32 },

    /// The caller cancelled the call between attempts.
    #[error("call cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    /// The caller's deadline passed between attempts.
    #[error("deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded { attempts: u32 },

    /// A plugin failed while handling a request.
    #[error("plugin {name} failed: {message}")]
    Plugin { name: String, message: String },

    /// Invalid configuration handed to a component.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FerruleError {
    /// Returns true for provider failures the retry policy treats as transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, FerruleError::Provider(e) if e.is_transient())
    }
}
