//! Service configuration for the chat-completion endpoint.
//!
//! Everything the summarizer needs to reach the model service lives in a
//! [`ServiceConfig`] value that is built once and handed to the client.

use std::time::Duration;

use clap::ValueEnum;

use crate::error::BibDigestError;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-2024-08-06";
pub const DEFAULT_AZURE_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which flavour of the chat-completions API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "azure")]
    Azure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub provider: Provider,
    /// Base URL (openai) or resource endpoint (azure)
    pub endpoint: String,
    pub api_key: String,
    /// Model name (openai) or deployment name (azure)
    pub model: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Configuration for the public OpenAI API
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenAi,
            endpoint: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build the configuration from process environment variables
    pub fn from_env(provider: Provider, model: Option<String>) -> Result<Self, BibDigestError> {
        Self::from_lookup(provider, model, |name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(
        provider: Provider,
        model: Option<String>,
        lookup: F,
    ) -> Result<Self, BibDigestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = match var("API_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(BibDigestError::InvalidConfig(format!(
                        "API_TIMEOUT_SECS must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let config = match provider {
            Provider::OpenAi => Self {
                provider,
                endpoint: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                api_key: var("OPENAI_API_KEY").ok_or(BibDigestError::MissingConfig("OPENAI_API_KEY"))?,
                model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_version: DEFAULT_AZURE_API_VERSION.to_string(),
                timeout,
            },
            Provider::Azure => Self {
                provider,
                endpoint: var("AZURE_OPENAI_ENDPOINT")
                    .ok_or(BibDigestError::MissingConfig("AZURE_OPENAI_ENDPOINT"))?,
                api_key: var("AZURE_OPENAI_API_KEY")
                    .ok_or(BibDigestError::MissingConfig("AZURE_OPENAI_API_KEY"))?,
                model: model.unwrap_or_else(|| DEFAULT_AZURE_DEPLOYMENT.to_string()),
                api_version: var("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
                timeout,
            },
        };

        if config.model.trim().is_empty() {
            return Err(BibDigestError::InvalidConfig("model name must not be empty".to_string()));
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat-completions call
    pub fn completions_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        match self.provider {
            Provider::OpenAi => format!("{}/chat/completions", base),
            Provider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base, self.model, self.api_version
            ),
        }
    }
}
