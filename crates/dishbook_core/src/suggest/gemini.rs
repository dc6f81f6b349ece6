//! Gemini `generateContent` language model over blocking HTTP.

use crate::logging::truncate_single_line;
use crate::suggest::config::{ConfigError, SuggestionConfig};
use crate::suggest::{LanguageModel, ModelOutcome};
use log::{debug, warn};
use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_EXCERPT_CHARS: usize = 200;
const RATE_LIMIT_STATUS: &str = "RESOURCE_EXHAUSTED";
const RATE_LIMIT_PHRASES: &[&str] = &[
    "resource_exhausted",
    "rate limit exceeded",
    "quota exceeded",
    "too many requests",
];

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: Option<u16>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Blocking Gemini client. One instance per process is enough.
pub struct GeminiModel {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(config: &SuggestionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl LanguageModel for GeminiModel {
    fn generate(&self, model: &str, prompt: &str) -> ModelOutcome {
        let started_at = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = match self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
        {
            Ok(response) => response,
            Err(err) => {
                warn!("event=model_call module=suggest status=error model={model} kind=transport");
                return classify_failure(None, &err.to_string());
            }
        };

        let status = response.status();
        let outcome = match response.text() {
            Ok(body) => classify_response(status, &body),
            Err(err) => classify_failure(Some(status), &err.to_string()),
        };

        debug!(
            "event=model_call module=suggest status={} model={model} http_status={} duration_ms={}",
            outcome_label(&outcome),
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        outcome
    }
}

/// Maps an HTTP status and body to a fallback-loop outcome.
pub(crate) fn classify_response(status: StatusCode, body: &str) -> ModelOutcome {
    if !status.is_success() {
        return classify_failure(Some(status), body);
    }

    let parsed: GenerateResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => return ModelOutcome::Fatal(format!("unreadable response envelope: {err}")),
    };

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty());

    match text {
        Some(text) => ModelOutcome::Success(text),
        None => ModelOutcome::Fatal("response has no candidate text".to_string()),
    }
}

/// Rate limited on HTTP 429, or when the message reports throttling.
pub(crate) fn classify_failure(status: Option<StatusCode>, message: &str) -> ModelOutcome {
    let excerpt = truncate_single_line(message.trim(), MAX_ERROR_EXCERPT_CHARS);
    let reason = match status {
        Some(status) => format!("HTTP {}: {excerpt}", status.as_u16()),
        None => excerpt,
    };

    if status == Some(StatusCode::TOO_MANY_REQUESTS) || is_rate_limit_message(message) {
        ModelOutcome::RateLimited(reason)
    } else {
        ModelOutcome::Fatal(reason)
    }
}

/// A structured `{"error": {...}}` body is judged by its code and status only;
/// free text needs an explicit throttling phrase.
fn is_rate_limit_message(message: &str) -> bool {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(message.trim()) {
        return envelope.error.code == Some(StatusCode::TOO_MANY_REQUESTS.as_u16())
            || envelope.error.status.as_deref() == Some(RATE_LIMIT_STATUS);
    }
    let lowered = message.to_lowercase();
    RATE_LIMIT_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

fn outcome_label(outcome: &ModelOutcome) -> &'static str {
    match outcome {
        ModelOutcome::Success(_) => "ok",
        ModelOutcome::RateLimited(_) => "rate_limited",
        ModelOutcome::Fatal(_) => "error",
    }
}
