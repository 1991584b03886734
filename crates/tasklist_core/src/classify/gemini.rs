//! Google Gemini `generateContent` adapter.
//!
//! # Responsibility
//! - Send one prompt per call and return the first candidate's text.
//!
//! # Invariants
//! - The API key travels in a header, never in the URL or logs.
//! - Exactly one HTTP request per `generate` call; no retries.

use super::generator::{GenerationError, TextGenerator};
use crate::config::ClassifierConfig;
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Instant;

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Blocking Gemini client.
pub struct GeminiGenerator {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(
        api_key: impl Into<String>,
        model: &str,
        base_url: &str,
    ) -> Result<Self, GenerationError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: endpoint_url(base_url, model),
            api_key: api_key.into(),
        })
    }

    /// Builds a client when `config` carries an API key, `Ok(None)` otherwise.
    pub fn from_config(config: &ClassifierConfig) -> Result<Option<Self>, GenerationError> {
        match config.api_key.as_deref() {
            Some(key) => Self::new(key, &config.model, &config.base_url).map(Some),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for GeminiGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let started_at = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&build_request_body(prompt))
            .send()?;

        let status = response.status();
        debug!(
            "event=gemini_generate module=classifier status_code={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        extract_text(response.json::<GenerateContentResponse>()?)
    }
}

fn endpoint_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn build_request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }],
        }],
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    match response.prompt_feedback.and_then(|feedback| feedback.block_reason) {
        Some(reason) => Err(GenerationError::InvalidResponse(format!(
            "prompt blocked: {reason}"
        ))),
        None => Err(GenerationError::InvalidResponse(
            "no candidate text".to_string(),
        )),
    }
}
