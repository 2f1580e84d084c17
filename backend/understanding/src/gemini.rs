//! Gemini `generateContent` client and wire types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// A single failed call. Every variant is treated as transient by the retry loop.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    #[error("API call failed with status: {status}{}", hint.map(|h| format!(". {h}")).unwrap_or_default())]
    Http {
        status: u16,
        body: String,
        hint: Option<&'static str>,
    },

    #[error("network error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self { role: None, parts: vec![Part::text(text)] }
    }

    pub fn user(parts: Vec<Part>) -> Self {
        Self { role: Some("user".to_string()), parts }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), inline_data: None }
    }

    pub fn inline(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type: mime_type.into(), data: base64_data.into() }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 payload without a `data:` prefix.
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    pub fn google_search() -> Self {
        Self { google_search: Some(GoogleSearch {}) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoogleSearch {}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_attributions: Vec<GroundingRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_chunks: Vec<GroundingRef>,
}

/// Attribution and chunk entries share the `{ web: { uri, title } }` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroundingRef {
    #[serde(default)]
    pub web: Option<WebRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebRef {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenerateResponse {
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Text of the first part of the first candidate, if it has any.
    pub fn first_text(&self) -> Option<&str> {
        self.first_candidate()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    /// Convenience constructor, mostly for stubs.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::text(text)),
                grounding_metadata: None,
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Anything that can answer a `generateContent` request.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send one request. No retrying happens here.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CallError>;
}

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CallError> {
        let endpoint = self.endpoint();
        info!(model = %self.model, "[Gemini] generateContent");

        let mut builder = self.client.post(&endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| CallError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let hint = (status.as_u16() == 403 && self.api_key.is_none())
                .then_some("If running locally, please set GEMINI_API_KEY");
            debug!(status = status.as_u16(), body = %body, "[Gemini] error response");
            return Err(CallError::Http { status: status.as_u16(), body, hint });
        }

        resp.json::<GenerateResponse>()
            .await
            .map_err(|e| CallError::Decode(e.without_url().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_gemini_field_names() {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![Part::text("hi"), Part::inline("image/png", "AAAA")])],
            tools: vec![Tool::google_search()],
            system_instruction: Some(Content::text("be terse")),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "hi" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } }
                    ]
                }],
                "tools": [{ "google_search": {} }],
                "systemInstruction": { "parts": [{ "text": "be terse" }] }
            })
        );
    }

    #[test]
    fn response_text_is_first_part_of_first_candidate() {
        let raw = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Invoice #123" }, { "text": "ignored" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 12 }
        });
        let resp: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.first_text(), Some("Invoice #123"));
    }

    #[test]
    fn missing_or_blank_text_reads_as_none() {
        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_text(), None);

        let blank: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] }))
                .unwrap();
        assert_eq!(blank.first_text(), None);
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::new(None).with_base_url("http://localhost:9999/v1beta/").with_model("m1");
        assert_eq!(client.endpoint(), "http://localhost:9999/v1beta/models/m1:generateContent");
    }

    #[test]
    fn http_error_message_includes_hint() {
        let err = CallError::Http { status: 403, body: String::new(), hint: Some("set a key") };
        assert_eq!(err.to_string(), "API call failed with status: 403. set a key");
        let err = CallError::Http { status: 500, body: String::new(), hint: None };
        assert_eq!(err.to_string(), "API call failed with status: 500");
    }
}
