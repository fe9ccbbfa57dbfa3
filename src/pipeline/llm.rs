//! Outbound call to the chat-completions endpoint.
//!
//! The request is the OpenAI-style multimodal schema that OpenRouter and most
//! compatible gateways accept: one user message whose content is a text part
//! (the task prompt) followed by an `image_url` part (the data URL).
//! Exactly one POST is made per analysis; failures are reported, not retried.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

/// Prefix of the text returned when the response lacks
/// `choices[0].message.content`.
pub const UNEXPECTED_CONTENT_PREFIX: &str = "Model did not return expected content. Raw response:";

/// Request body for `POST {endpoint_url}`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Assemble the request body for one image and prompt.
pub fn build_request(prompt: &str, data_url: String, config: &AnalyzerConfig) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ],
        }],
        max_tokens: config.max_tokens,
    }
}

/// Send `request` and return the model's text.
///
/// `api_key` is sent as the bearer token; callers resolve it from the config
/// before anything else touches the network.
///
/// A 2xx JSON body without `choices[0].message.content` is not treated as an
/// error: the raw JSON is returned behind [`UNEXPECTED_CONTENT_PREFIX`] so the
/// user can see what came back.
pub async fn call_model(
    client: &reqwest::Client,
    config: &AnalyzerConfig,
    api_key: &str,
    request: &ChatRequest,
) -> Result<String, AnalyzerError> {
    let start = Instant::now();
    debug!("POST {} (model {})", config.endpoint_url, request.model);

    let response = client
        .post(&config.endpoint_url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .header("HTTP-Referer", &config.app_url)
        .header("X-Title", &config.app_title)
        .json(request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Inference API returned {}: {}", status, body);
        return Err(AnalyzerError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }

    let raw = response.text().await?;
    debug!(
        "Inference API answered {} bytes in {}ms",
        raw.len(),
        start.elapsed().as_millis()
    );

    let data: Value = serde_json::from_str(&raw).map_err(|e| AnalyzerError::InvalidResponse {
        detail: e.to_string(),
    })?;

    Ok(match extract_content(&data) {
        Some(text) => text.to_string(),
        None => {
            warn!("Response has no choices[0].message.content");
            format!("{}\n{}", UNEXPECTED_CONTENT_PREFIX, data)
        }
    })
}

/// Pull `choices[0].message.content` out of a chat-completions response.
pub fn extract_content(data: &Value) -> Option<&str> {
    data.pointer("/choices/0/message/content")?.as_str()
}
