use super::{ContentService, Generation, InlinePayload, OutputKind};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEXT_MODEL: &str = "gemini-2.5-flash";
const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
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
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentResponse {
    fn into_parts(self) -> Vec<Part> {
        self.candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        // 请求级超时由调用方控制，这里只兜底防止连接挂死
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: GEMINI_API_BASE.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            PipelineError::ConfigurationAbsent("GEMINI_API_KEY is not set".to_string())
        })
    }

    async fn generate_content(&self, model: &str, body: &Value) -> Result<Vec<Part>> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}:generateContent", self.base_url, model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::transport(format!(
                "Gemini API error (HTTP {}): {}",
                status, error_text
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::schema(format!("Unreadable Gemini response: {}", e)))?;
        Ok(parsed.into_parts())
    }
}

/// Strips markdown code fences some models wrap around JSON output.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn joined_text(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
}

#[async_trait]
impl ContentService for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn structured_generate(&self, text: &str, schema: &Value) -> Result<Value> {
        info!("Requesting structured analysis from Gemini...");

        let request_body = json!({
            "contents": [
                { "role": "user", "parts": [ { "text": text } ] }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        let parts = self.generate_content(TEXT_MODEL, &request_body).await?;
        let generated_text = joined_text(&parts);
        if generated_text.trim().is_empty() {
            return Err(PipelineError::schema("No text in structured response"));
        }
        debug!("Structured response: {} bytes", generated_text.len());

        serde_json::from_str(strip_code_fence(&generated_text))
            .map_err(|e| PipelineError::schema(format!("Failed to parse analysis JSON: {}", e)))
    }

    async fn generate(&self, kind: OutputKind, instruction: &str) -> Result<Generation> {
        let model = match kind {
            OutputKind::Text => TEXT_MODEL,
            OutputKind::Image => IMAGE_MODEL,
        };
        info!("Generating {:?} with {}", kind, model);

        let request_body = json!({
            "contents": [
                { "role": "user", "parts": [ { "text": instruction } ] }
            ]
        });

        let parts = self.generate_content(model, &request_body).await?;

        // 优先取内联图片数据
        if let Some(inline) = parts.iter().find_map(|p| p.inline_data.as_ref()) {
            return Ok(Generation::Image(InlinePayload {
                mime_type: inline.mime_type.clone(),
                data: inline.data.clone(),
            }));
        }

        let text = joined_text(&parts);
        if text.trim().is_empty() {
            return Err(PipelineError::schema("Empty response from Gemini"));
        }
        Ok(Generation::Text(text.trim().to_string()))
    }
}
