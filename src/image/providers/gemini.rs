//! Gemini (Google) generation gateway.

use crate::error::{truncate_chars, EditorError, Result};
use crate::image::gateway::GenerationGateway;
use crate::image::types::{GeneratedImage, GenerationMetadata, GenerationRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Public Generative Language API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Host of the public API; calls to it always need a key.
const PUBLIC_API_HOST: &str = "generativelanguage.googleapis.com";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable overriding the endpoint (e.g., a trusted proxy).
pub const ENDPOINT_ENV: &str = "EDITOR_AI_ENDPOINT";

/// Maximum characters of an error body or text reply kept as diagnostics.
const DIAGNOSTIC_LIMIT: usize = 200;

/// Finish reasons that mean the safety policy stopped generation.
const SAFETY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "IMAGE_PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

/// Gemini image model variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image.
    #[default]
    FlashImage,
    /// Gemini 2.5 Flash Image preview.
    FlashImagePreview,
    /// Gemini 3 Pro Image preview.
    ProImage,
    /// Any other model identifier.
    Custom(String),
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::FlashImage => "gemini-2.5-flash-image",
            Self::FlashImagePreview => "gemini-2.5-flash-image-preview",
            Self::ProImage => "gemini-3-pro-image-preview",
            Self::Custom(id) => id,
        }
    }

    /// Maps a model identifier back to a variant.
    pub fn from_id(id: &str) -> Self {
        match id {
            "gemini-2.5-flash-image" => Self::FlashImage,
            "gemini-2.5-flash-image-preview" => Self::FlashImagePreview,
            "gemini-3-pro-image-preview" => Self::ProImage,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Builder for GeminiGateway.
#[derive(Debug, Clone, Default)]
pub struct GeminiGatewayBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    model: GeminiModel,
    timeout: Option<Duration>,
}

impl GeminiGatewayBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL. Falls back to `EDITOR_AI_ENDPOINT`, then the
    /// public endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Sets an overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the gateway, resolving the API key and endpoint.
    pub fn build(self) -> Result<GeminiGateway> {
        self.build_with_env(|name| std::env::var(name).ok())
    }

    fn build_with_env(self, env: impl Fn(&str) -> Option<String>) -> Result<GeminiGateway> {
        let api_key = self
            .api_key
            .or_else(|| env(API_KEY_ENV))
            .filter(|k| !k.is_empty());
        let endpoint = self
            .endpoint
            .or_else(|| env(ENDPOINT_ENV))
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = endpoint.trim_end_matches('/').to_string();

        // A trusted intermediary may hold the key itself; the public API may not.
        if api_key.is_none() && is_public_endpoint(&endpoint) {
            return Err(EditorError::Config(format!(
                "{API_KEY_ENV} not set and no API key provided"
            )));
        }

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(GeminiGateway {
            client: client.build()?,
            api_key,
            endpoint,
            model: self.model,
        })
    }
}

/// True when `endpoint` points at Google's API host, whatever the path.
fn is_public_endpoint(endpoint: &str) -> bool {
    match reqwest::Url::parse(endpoint) {
        Ok(url) => url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(PUBLIC_API_HOST)),
        Err(_) => endpoint.contains(PUBLIC_API_HOST),
    }
}

/// Gemini generation gateway.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: GeminiModel,
}

impl GeminiGateway {
    /// Creates a new `GeminiGatewayBuilder`.
    pub fn builder() -> GeminiGatewayBuilder {
        GeminiGatewayBuilder::new()
    }

    /// Returns the model this gateway calls.
    pub fn model(&self) -> &GeminiModel {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint,
            self.model.as_str()
        )
    }

    async fn generate_impl(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage> {
        let start = Instant::now();
        let body = GeminiRequest::from_generation_request(request);

        tracing::debug!(
            model = %self.model.as_str(),
            images = request.images.len(),
            "submitting generation request"
        );

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(model = %self.model.as_str(), "generation request cancelled");
                return Err(EditorError::Cancelled);
            }
            reply = self.send(&body) => reply?,
        };

        let mut image = interpret_reply(&reply).inspect_err(|e| {
            tracing::warn!(status = reply.status, kind = ?e.kind(), "generation failed: {e}");
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        image.metadata.model = Some(self.model.as_str().to_string());
        image.metadata.duration_ms = Some(duration_ms);

        tracing::debug!(
            mime_type = %image.mime_type,
            duration_ms,
            "generation complete"
        );
        Ok(image)
    }

    async fn send(&self, body: &GeminiRequest) -> Result<HttpReply> {
        let mut builder = self
            .client
            .post(self.url())
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(ref key) = self.api_key {
            builder = builder.header("x-goog-api-key", key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = if status.is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };

        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage> {
        self.generate_impl(request, cancel).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

/// Raw HTTP outcome of one generation call.
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

/// Turns an HTTP reply into a generated image or a classified failure.
pub(crate) fn interpret_reply(reply: &HttpReply) -> Result<GeneratedImage> {
    if !(200..300).contains(&reply.status) {
        return Err(EditorError::Api {
            status: reply.status,
            message: api_error_message(reply),
        });
    }

    match serde_json::from_str::<GeminiResponse>(&reply.body) {
        Ok(response) => interpret_response(response),
        Err(e) => {
            tracing::debug!("unparsable generation response: {e}");
            Err(EditorError::EmptyResponse)
        }
    }
}

fn interpret_response(response: GeminiResponse) -> Result<GeneratedImage> {
    // Prompt blocks come back as HTTP 200
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(EditorError::SafetyRejected { reason });
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(EditorError::EmptyResponse);
    };

    if let Some(reason) = candidate.finish_reason {
        if SAFETY_FINISH_REASONS.contains(&reason.as_str()) {
            return Err(EditorError::SafetyRejected { reason });
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let text = parts
        .iter()
        .find_map(|p| p.text.as_deref().filter(|t| !t.is_empty()));

    if let Some(inline) = parts.iter().find_map(|p| p.inline_data.as_ref()) {
        return Ok(GeneratedImage::new(
            inline.mime_type.clone(),
            inline.data.clone(),
            GenerationMetadata {
                text: text.map(str::to_string),
                ..Default::default()
            },
        ));
    }

    match text {
        Some(text) => Err(EditorError::UnexpectedTextResponse {
            text: truncate_chars(text, DIAGNOSTIC_LIMIT).to_string(),
        }),
        None => Err(EditorError::EmptyResponse),
    }
}

/// Structured error message, else raw body, else the status line.
fn api_error_message(reply: &HttpReply) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&reply.body) {
        let message = body
            .error
            .and_then(|e| e.message)
            .or(body.message)
            .filter(|m| !m.is_empty());
        if let Some(message) = message {
            return message;
        }
    }

    let raw = reply.body.trim();
    if !raw.is_empty() {
        return truncate_chars(raw, DIAGNOSTIC_LIMIT).to_string();
    }

    match reply.reason {
        Some(ref reason) => format!("HTTP {} {}", reply.status, reason),
        None => format!("HTTP {}", reply.status),
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        let mut parts = Vec::with_capacity(req.images.len() + 1);

        parts.push(GeminiRequestPart::Text {
            text: req.prompt.clone(),
        });

        // Reference images follow the prompt, in upload order
        parts.extend(req.images.iter().map(|image| GeminiRequestPart::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
        }));

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}
