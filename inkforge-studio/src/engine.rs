//! The shared generation engine.
//!
//! Every endpoint hands the engine a [`TaskSpec`] describing one generation
//! task: prompt, settings, response format, ordered model list, and the
//! retry budget and nesting for that call site. The engine resolves the API
//! key, builds the fallback chain, and runs the retry-wrapped call.

use serde::de::DeserializeOwned;
use tracing::info;

use inkforge_core::{Generated, GenerationSettings, Prompt};
use inkforge_gemini::{
    CredentialStore, FallbackChain, GeminiModel, GenerativeModel, ModelError, RequestOptions,
    RetryingModel,
};
use inkforge_output::parse_json_from_text;
use inkforge_retries::{run_with_backoff, BackoffPolicy};

use crate::config::StudioConfig;
use crate::error::ApiError;

/// How the retry policy composes with the model fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryNesting {
    /// Retry wraps each individual model; the chain falls back only after a
    /// model's whole retry budget is spent.
    #[default]
    PerModel,
    /// Retry wraps the whole single-pass chain; each retry attempt walks
    /// every model once.
    AroundChain,
}

/// One generation task, as described by a call site.
pub struct TaskSpec {
    /// Feature name, used for credential resolution and logging.
    pub feature: &'static str,
    /// The assembled prompt.
    pub prompt: Prompt,
    /// Sampling settings.
    pub settings: GenerationSettings,
    /// Response format options.
    pub options: RequestOptions,
    /// Ordered model ids; empty means the configured default text models.
    pub models: Vec<String>,
    /// Retry budget for this call site.
    pub backoff: BackoffPolicy,
    /// Retry/fallback composition for this call site.
    pub nesting: RetryNesting,
    /// Key supplied on the request, if any.
    pub api_key: Option<String>,
}

impl TaskSpec {
    /// A task with default settings, JSON-less output, default models, and
    /// the default retry budget.
    #[must_use]
    pub fn new(feature: &'static str, prompt: Prompt) -> Self {
        Self {
            feature,
            prompt,
            settings: GenerationSettings::default(),
            options: RequestOptions::text(),
            models: Vec::new(),
            backoff: BackoffPolicy::new(),
            nesting: RetryNesting::default(),
            api_key: None,
        }
    }

    /// Set sampling settings.
    #[must_use]
    pub fn settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set response format options.
    #[must_use]
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the ordered model list.
    #[must_use]
    pub fn models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the retry/fallback composition.
    #[must_use]
    pub fn nesting(mut self, nesting: RetryNesting) -> Self {
        self.nesting = nesting;
        self
    }

    /// Attach a request-supplied API key.
    #[must_use]
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

/// Shared state behind every endpoint: one HTTP connection pool, one
/// credential store, one configuration.
pub struct Engine {
    http: reqwest::Client,
    credentials: CredentialStore,
    config: StudioConfig,
}

impl Engine {
    /// Create an engine with a fresh connection pool.
    #[must_use]
    pub fn new(config: StudioConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an engine around an existing [`reqwest::Client`].
    #[must_use]
    pub fn with_client(http: reqwest::Client, config: StudioConfig) -> Self {
        Self {
            http,
            credentials: CredentialStore::new(),
            config,
        }
    }

    /// Swap in a pre-built credential store.
    #[must_use]
    pub fn with_credential_store(mut self, credentials: CredentialStore) -> Self {
        self.credentials = credentials;
        self
    }

    /// The server configuration.
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// The credential store.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn build_model(&self, model_id: &str, api_key: &str) -> GeminiModel {
        GeminiModel::new(self.http.clone(), model_id, api_key)
            .with_base_url(self.config.api_base_url.clone())
    }

    /// Run one generation task to completion.
    pub async fn run(&self, spec: TaskSpec) -> Result<Generated, ModelError> {
        let api_key = self
            .credentials
            .resolve(spec.feature, spec.api_key.as_deref())?;
        let model_ids = if spec.models.is_empty() {
            &self.config.text_models
        } else {
            &spec.models
        };

        info!(
            feature = spec.feature,
            models = model_ids.len(),
            nesting = ?spec.nesting,
            "running generation task"
        );

        match spec.nesting {
            RetryNesting::PerModel => {
                let chain = FallbackChain::new(
                    model_ids
                        .iter()
                        .map(|id| {
                            Box::new(RetryingModel::with_policy(
                                self.build_model(id, &api_key),
                                spec.backoff.clone(),
                            )) as Box<dyn GenerativeModel>
                        })
                        .collect(),
                );
                chain
                    .generate(&spec.prompt, &spec.settings, &spec.options)
                    .await
            }
            RetryNesting::AroundChain => {
                let chain = FallbackChain::new(
                    model_ids
                        .iter()
                        .map(|id| {
                            Box::new(self.build_model(id, &api_key)) as Box<dyn GenerativeModel>
                        })
                        .collect(),
                );
                run_with_backoff(&spec.backoff, || {
                    chain.generate(&spec.prompt, &spec.settings, &spec.options)
                })
                .await
            }
        }
    }

    /// Run a task and parse its text output as JSON into `T`.
    pub async fn run_json<T: DeserializeOwned>(&self, spec: TaskSpec) -> Result<T, ApiError> {
        let generated = self.run(spec).await?;
        let text = generated.text_content();
        if text.trim().is_empty() {
            return Err(ApiError::bad_gateway("model returned no text output"));
        }
        Ok(parse_json_from_text(&text)?)
    }
}
