// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gemini `generateContent` client.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use labelvision_core::error::{LabelVisionError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::image_data::LabelImage;
use crate::parse::{LabelAnalysis, parse_label_response};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const LABEL_PROMPT: &str = "Analyze the provided image.\n\
1. Identify the distinct physical items visible in the image. List them clearly, one item per line.\n\
2. Based ONLY on the items you identified, generate a concise summary (max 5 words) suitable for a label header. Focus on the most prominent items.\n\n\
Format your response exactly like this:\n\
Identified Items:\n\
- Item 1 Name\n\
- Item 2 Name\n\
...\n\
Summary:\n\
Generated Summary Text";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
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
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for one model on one endpoint.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl VisionClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LabelVisionError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Send the image with the label prompt and parse the answer.
    #[instrument(skip(self, image), fields(model = %self.model, bytes = image.bytes().len()))]
    pub async fn analyze(&self, image: &LabelImage) -> Result<LabelAnalysis> {
        let body = build_request(image);
        info!(mime = image.mime_type(), "sending image to vision model");

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "vision request failed");
                LabelVisionError::Vision(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LabelVisionError::Vision(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            error!(%status, %message, "vision API returned an error");
            return Err(LabelVisionError::VisionApi(message));
        }

        let raw = response_text(&text)?;
        debug!(raw = %raw, "raw vision response");
        let analysis = parse_label_response(&raw);
        info!(
            items = ?analysis.identified_items,
            summary = %analysis.summary,
            "vision analysis complete"
        );
        Ok(analysis)
    }
}

fn build_request(image: &LabelImage) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text { text: LABEL_PROMPT },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type(),
                        data: BASE64.encode(image.bytes()),
                    },
                },
            ],
        }],
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LabelVisionError::Vision(
            "model returned no text (response blocked or empty)".into(),
        ));
    }
    Ok(text)
}
