// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The resilient invocation pipeline.
//!
//! A chat completion flows through: plugin short-circuit, retried transport
//! call, normalization, budget accounting, and finally response plugins.
//! Embeddings skip the plugin stages.

use std::sync::Arc;
use std::time::Duration;

use ferrule_config::model::{FerruleConfig, LlmConfig};
use ferrule_core::{
    ChatCompletionResponse, ChatRequest, CompletionPlugin, ErrorClass, FerruleError, LlmResponse,
    Message, ProviderTransport,
};
use ferrule_cost::{BudgetTracker, ModelRegistry, SharedBudget};
use ferrule_plugin::PluginChain;
use ferrule_resilience::{AbortSignal, RetryPolicy};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::metrics;
use crate::normalize::{normalize_chat, normalize_embedding};

/// Invokes a provider with retries, cost accounting, and plugin hooks.
///
/// Cheap to clone: every collaborator is behind an `Arc`, so clones share
/// the transport, registry, plugin chain, and budget.
#[derive(Clone)]
pub struct ResilientInvoker {
    transport: Arc<dyn ProviderTransport>,
    policy: RetryPolicy,
    registry: Arc<ModelRegistry>,
    budget: SharedBudget,
    plugins: Arc<PluginChain>,
    defaults: LlmConfig,
    abort: AbortSignal,
    call_timeout: Option<Duration>,
}

impl std::fmt::Debug for ResilientInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientInvoker")
            .field("transport", &self.transport.name())
            .field("policy", &self.policy)
            .field("plugins", &self.plugins)
            .field("defaults", &self.defaults)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl ResilientInvoker {
    /// Create an invoker with the default retry policy, the built-in model
    /// catalog, no plugins, and default model selection.
    pub fn new(transport: Arc<dyn ProviderTransport>, budget: SharedBudget) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            registry: Arc::new(ModelRegistry::builtin().clone()),
            budget,
            plugins: Arc::new(PluginChain::default()),
            defaults: LlmConfig::default(),
            abort: AbortSignal::none(),
            call_timeout: None,
        }
    }

    /// Create an invoker from a loaded configuration.
    ///
    /// `budget` is shared with every other invoker of the run; pass `None`
    /// to start a fresh tracker with the configured ceiling. `plugins` are
    /// filtered through the configured allow/deny lists.
    pub fn from_config(
        config: &FerruleConfig,
        transport: Arc<dyn ProviderTransport>,
        budget: Option<SharedBudget>,
        plugins: Vec<Arc<dyn CompletionPlugin>>,
    ) -> Result<Self, FerruleError> {
        let budget = budget.unwrap_or_else(|| BudgetTracker::from_config(&config.cost).shared());
        let chain = PluginChain::filtered(plugins, &config.plugins);
        info!(
            transport = transport.name(),
            plugins = chain.len(),
            num_retries = config.retry.num_retries,
            "invoker configured"
        );

        let mut invoker = Self::new(transport, budget)
            .with_retry_policy(RetryPolicy::from_config(&config.retry)?)
            .with_registry(Arc::new(ModelRegistry::with_models(
                config.models.iter().cloned(),
            )))
            .with_plugins(Arc::new(chain))
            .with_defaults(config.llm.clone());
        if let Some(secs) = config.retry.deadline_secs {
            invoker = invoker.with_call_timeout(Duration::from_secs(secs));
        }
        Ok(invoker)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ModelRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_plugins(mut self, plugins: Arc<PluginChain>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Model and temperature used when a request leaves them unset.
    pub fn with_defaults(mut self, defaults: LlmConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Give every call a deadline `timeout` after it starts, unless the
    /// abort signal already carries one.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// A clone of this invoker whose subsequent calls observe `signal`.
    pub fn with_abort(&self, signal: AbortSignal) -> Self {
        Self {
            abort: signal,
            ..self.clone()
        }
    }

    /// The budget shared by every invoker of the run.
    pub fn budget(&self) -> &SharedBudget {
        &self.budget
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// A request for `messages` using the configured fast model and temperature.
    pub fn request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest::new(self.defaults.fast_llm.clone(), messages)
            .with_temperature(self.defaults.temperature)
    }

    /// Create a chat completion and return its text.
    ///
    /// Plugins get the first chance to answer; a plugin answer is returned
    /// as-is, costs nothing, and bypasses response plugins. Otherwise the
    /// provider is called with retries, the usage is charged to the budget,
    /// and the content is passed through every response plugin.
    pub async fn create_chat_completion(
        &self,
        request: ChatRequest,
    ) -> Result<String, FerruleError> {
        let request = self.resolve(request);
        debug!(
            model = %request.model,
            temperature = ?request.temperature,
            max_tokens = ?request.max_tokens,
            "creating chat completion"
        );

        if let Some(hit) = self.plugins.intercept(&request).await? {
            metrics::record_retry_outcome("chat", "plugin");
            return Ok(hit.content);
        }

        let response = self.chat_completion_response(request).await?;
        Ok(self.plugins.transform_response(response.content))
    }

    /// Create a chat completion and return the typed response.
    ///
    /// Plugins are not consulted. The model must be known to the registry;
    /// an unknown model fails before any provider call.
    pub async fn chat_completion_response(
        &self,
        request: ChatRequest,
    ) -> Result<ChatCompletionResponse, FerruleError> {
        let request = self.resolve(request);
        let model_info = self.registry.lookup(&request.model)?;
        let started = Instant::now();

        let transport = &self.transport;
        let request = &request;
        let raw = self
            .policy
            .run(&self.call_signal(), move || transport.chat_completion(request))
            .await;
        let response = finish("chat", raw, started).and_then(|raw| normalize_chat(raw, model_info));
        self.settle("chat", response).await
    }

    /// Embed `text` and return the vector.
    ///
    /// Newlines are replaced by spaces before sending. `model` defaults to
    /// the configured embedding model.
    pub async fn create_embedding(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Vec<f32>, FerruleError> {
        let model = model.unwrap_or(self.defaults.embedding_model.as_str());
        let model_info = self.registry.lookup(model)?;
        let text = text.replace('\n', " ");
        let started = Instant::now();

        let transport = &self.transport;
        let text = text.as_str();
        let raw = self
            .policy
            .run(&self.call_signal(), move || transport.embedding(text, model))
            .await;
        let response =
            finish("embedding", raw, started).and_then(|raw| normalize_embedding(raw, model_info));
        let response = self.settle("embedding", response).await?;
        Ok(response.embedding)
    }

    /// Have the model act as the Python `function` described by
    /// `description`, applied to `args`.
    ///
    /// `None` arguments are rendered as `None`. Runs at temperature 0 on
    /// `model`, defaulting to the configured smart model.
    pub async fn call_ai_function(
        &self,
        function: &str,
        args: &[Option<&str>],
        description: &str,
        model: Option<&str>,
    ) -> Result<String, FerruleError> {
        let model = model.unwrap_or(self.defaults.smart_llm.as_str());
        let args = args
            .iter()
            .map(|arg| arg.unwrap_or("None"))
            .collect::<Vec<_>>()
            .join(", ");
        let messages = vec![
            Message::system(format!(
                "You are now the following python function: ```# {description}\n{function}```\n\nOnly respond with your `return` value."
            )),
            Message::user(args),
        ];

        self.create_chat_completion(ChatRequest::new(model, messages).with_temperature(0.0))
            .await
    }

    /// Fill unset model and temperature from the configured defaults.
    fn resolve(&self, mut request: ChatRequest) -> ChatRequest {
        if request.model.is_empty() {
            request.model.clone_from(&self.defaults.fast_llm);
        }
        if request.temperature.is_none() {
            request.temperature = Some(self.defaults.temperature);
        }
        request
    }

    fn call_signal(&self) -> AbortSignal {
        match self.call_timeout {
            Some(timeout) if self.abort.deadline().is_none() => {
                self.abort.clone().with_timeout(timeout)
            }
            _ => self.abort.clone(),
        }
    }

    /// Charge a successful response to the budget and record its metrics.
    async fn settle<R: LlmResponse>(
        &self,
        operation: &'static str,
        response: Result<R, FerruleError>,
    ) -> Result<R, FerruleError> {
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                metrics::record_retry_outcome(operation, outcome_label(&err));
                return Err(err);
            }
        };

        let (cost, remaining, bounded) = {
            let mut budget = self.budget.lock().await;
            let cost = budget.update_cost(&response);
            (cost, budget.remaining_budget(), budget.total_budget().is_some())
        };

        let model = &response.model_info().name;
        metrics::record_retry_outcome(operation, "ok");
        metrics::record_tokens(
            model,
            response.prompt_tokens_used(),
            response.completion_tokens_used(),
        );
        metrics::record_cost(model, cost);
        if bounded {
            metrics::set_budget_remaining(remaining);
        }
        debug!(
            operation,
            model = %model,
            prompt_tokens = response.prompt_tokens_used(),
            completion_tokens = response.completion_tokens_used(),
            cost_usd = cost,
            "call charged to budget"
        );
        Ok(response)
    }
}

/// Record latency for a finished retry run, successful or not.
fn finish<T>(
    operation: &'static str,
    result: Result<T, FerruleError>,
    started: Instant,
) -> Result<T, FerruleError> {
    metrics::record_latency(operation, started.elapsed().as_secs_f64());
    result
}

fn outcome_label(err: &FerruleError) -> &'static str {
    match err {
        FerruleError::Provider(e) => match e.class() {
            ErrorClass::RateLimit => "rate_limited",
            ErrorClass::BadGateway => "bad_gateway",
            ErrorClass::Fatal => "provider_error",
        },
        FerruleError::UnknownModel { .. } => "unknown_model",
        FerruleError::MalformedResponse { .. } => "malformed",
        FerruleError::ProviderUnavailable { .. } => "unavailable",
        FerruleError::Cancelled { .. } => "cancelled",
        FerruleError::DeadlineExceeded { .. } => "deadline_exceeded",
        FerruleError::Plugin { .. } => "plugin_error",
        FerruleError::Config(_) => "config_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_core::ProviderError;
    use ferrule_test_utils::MockTransport;

    fn invoker() -> ResilientInvoker {
        ResilientInvoker::new(Arc::new(MockTransport::new()), BudgetTracker::new().shared())
    }

    #[test]
    fn resolve_fills_model_and_temperature() {
        let invoker = invoker().with_defaults(LlmConfig {
            temperature: 0.4,
            ..LlmConfig::default()
        });
        let request = invoker.resolve(ChatRequest::new("", vec![Message::user("hi")]));
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.temperature, Some(0.4));

        let explicit = invoker.resolve(
            ChatRequest::new("gpt-4", vec![Message::user("hi")]).with_temperature(1.0),
        );
        assert_eq!(explicit.model, "gpt-4");
        assert_eq!(explicit.temperature, Some(1.0));
    }

    #[test]
    fn outcome_labels_follow_error_class() {
        let rate = FerruleError::Provider(ProviderError::RateLimited {
            message: String::new(),
        });
        let gateway = FerruleError::Provider(ProviderError::Api {
            status: 502,
            message: String::new(),
        });
        assert_eq!(outcome_label(&rate), "rate_limited");
        assert_eq!(outcome_label(&gateway), "bad_gateway");
        assert_eq!(
            outcome_label(&FerruleError::Cancelled { attempts: 2 }),
            "cancelled"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn call_timeout_does_not_override_explicit_deadline() {
        let invoker = invoker().with_call_timeout(Duration::from_secs(60));
        let derived = invoker.call_signal().deadline().unwrap();
        assert_eq!(derived, Instant::now() + Duration::from_secs(60));

        let explicit = Instant::now() + Duration::from_secs(5);
        let scoped = invoker.with_abort(AbortSignal::none().with_deadline(explicit));
        assert_eq!(scoped.call_signal().deadline(), Some(explicit));
    }

    #[test]
    fn request_uses_configured_defaults() {
        let request = invoker().request(vec![Message::user("hello")]);
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.temperature, Some(0.0));
    }
}
