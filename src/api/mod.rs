pub mod gemini;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use gemini::GeminiClient;

/// What the caller expects back from [`ContentService::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Text,
    Image,
}

/// Base64 image bytes returned inline by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePayload {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    Image(InlinePayload),
}

/// Generative content service. Both calls are unreliable; callers decide
/// how to absorb failures.
#[async_trait]
pub trait ContentService: Send + Sync {
    fn name(&self) -> &str;

    /// False means the service is unconfigured and every call would fail
    /// with `ConfigurationAbsent`.
    fn has_credential(&self) -> bool;

    /// Generation constrained to `schema`; returns the parsed JSON object.
    async fn structured_generate(&self, text: &str, schema: &Value) -> Result<Value>;

    async fn generate(&self, kind: OutputKind, instruction: &str) -> Result<Generation>;
}
