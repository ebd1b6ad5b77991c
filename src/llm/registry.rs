//! Model registry for the configured chat-completion endpoints

use super::openai::DEFAULT_BASE_URL;
use super::{LlmService, LoggingService, OpenAIService, OpenAISettings};
use crate::config::env_or;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4";

/// Configuration for model providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Self-hosted or proxy endpoint speaking the `OpenAI` protocol
    pub custom_base_url: Option<String>,
    pub custom_api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            custom_base_url: None,
            custom_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let model = std::env::var("CUSTOM_LLM_MODEL")
            .or_else(|_| std::env::var("LLM_MODEL"))
            .unwrap_or(defaults.model);

        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            custom_base_url: non_empty_env("CUSTOM_LLM_BASE_URL"),
            custom_api_key: non_empty_env("CUSTOM_LLM_API_KEY"),
            model,
            temperature: env_or("LLM_TEMPERATURE", defaults.temperature),
            max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()),
            timeout: Duration::from_secs(env_or("LLM_TIMEOUT_SECS", defaults.timeout.as_secs())),
        }
    }

    /// Endpoint settings, if enough is configured to reach a model.
    ///
    /// A custom base URL takes precedence over the public `OpenAI` API.
    fn settings(&self) -> Option<OpenAISettings> {
        let (base_url, api_key) = match (&self.custom_base_url, &self.openai_api_key) {
            (Some(url), _) => (
                url.clone(),
                self.custom_api_key
                    .clone()
                    .or_else(|| self.openai_api_key.clone())
                    .unwrap_or_else(|| "not-needed".to_string()),
            ),
            (None, Some(key)) => (DEFAULT_BASE_URL.to_string(), key.clone()),
            (None, None) => return None,
        };

        Some(OpenAISettings {
            api_key,
            base_url,
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Registry of available models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    /// Create an empty registry for testing purposes
    #[allow(dead_code)] // Used in tests
    pub fn new_empty() -> Self {
        Self {
            services: HashMap::new(),
            default_model: "test-model".to_string(),
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        if let Some(settings) = config.settings() {
            match OpenAIService::new(settings) {
                Ok(service) => {
                    services.insert(
                        config.model.clone(),
                        Arc::new(LoggingService::new(Arc::new(service))),
                    );
                }
                Err(e) => tracing::error!(error = %e, "Failed to create model client"),
            }
        }

        Self {
            services,
            default_model: config.model.clone(),
        }
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
