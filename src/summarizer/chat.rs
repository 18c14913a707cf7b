use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bibtex::RawRecord;
use crate::config::{Provider, ServiceConfig};
use crate::error::{BibDigestError, SummaryError};
use crate::summarizer::{StructuredSummary, Summarizer, SummaryLanguage};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat-completions endpoint.
///
/// One HTTP client is built per summarizer and shared by all workers.
pub struct ChatSummarizer {
    client: Client,
    config: ServiceConfig,
    language: SummaryLanguage,
    url: String,
}

impl ChatSummarizer {
    pub fn new(config: ServiceConfig, language: SummaryLanguage) -> Result<Self, BibDigestError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BibDigestError::HttpClient)?;
        let url = config.completions_url();
        Ok(Self {
            client,
            config,
            language,
            url,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

impl Summarizer for ChatSummarizer {
    fn language(&self) -> SummaryLanguage {
        self.language
    }

    fn request_summary(&self, record: &RawRecord) -> Result<StructuredSummary, SummaryError> {
        let prompt = self.language.user_prompt(record.title(), record.abstract_text());
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.language.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            response_format: self.language.response_format(),
        };

        debug!("Requesting summary for '{}'", record.title());
        let request = self.client.post(&self.url).json(&body);
        let request = match self.config.provider {
            Provider::OpenAi => request.bearer_auth(&self.config.api_key),
            Provider::Azure => request.header("api-key", &self.config.api_key),
        };
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummaryError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response.json()?;
        let message = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(SummaryError::EmptyResponse)?;

        if let Some(refusal) = message.refusal.filter(|r| !r.is_empty()) {
            return Err(SummaryError::Refusal(refusal));
        }
        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(SummaryError::EmptyResponse)?;

        self.language.decode(&content)
    }
}
