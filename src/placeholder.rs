use crate::config::PipelineConfig;
use crate::image::{ImageRef, ImageSource};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;

/// Substitute image references for when the live service is absent or
/// failed.
///
/// Offline (no credential) references depend on the prompt alone so demo
/// runs are reproducible. References handed out after a live failure use a
/// fresh random seed, which keeps the two cases apart.
#[derive(Debug, Clone)]
pub struct PlaceholderResolver {
    base_url: String,
    min_delay: Duration,
}

impl PlaceholderResolver {
    pub fn new(base_url: impl Into<String>, min_delay: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            min_delay,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.placeholder_base.clone(), config.placeholder_delay)
    }

    pub async fn resolve(&self, prompt: &str, has_credential: bool) -> ImageRef {
        if has_credential {
            let seed = format!("{:016x}", rand::random::<u64>());
            debug!(seed = %seed, "Resolving failure placeholder");
            return ImageRef::new(self.url_for(&seed), ImageSource::FailurePlaceholder);
        }

        // 离线模式保留一点延迟，让调用方仍然走完整的异步流程
        if !self.min_delay.is_zero() {
            tokio::time::sleep(self.min_delay).await;
        }
        self.seeded(prompt)
    }

    /// Prompt-derived reference, no delay.
    pub fn seeded(&self, prompt: &str) -> ImageRef {
        ImageRef::new(
            self.url_for(&prompt_seed(prompt)),
            ImageSource::OfflinePlaceholder,
        )
    }

    /// Prompt-derived reference for a live call that answered with text
    /// instead of an image. Same URL as [`Self::seeded`], tagged apart from
    /// the offline case.
    pub fn text_reply(&self, prompt: &str) -> ImageRef {
        ImageRef::new(
            self.url_for(&prompt_seed(prompt)),
            ImageSource::TextOnlyPlaceholder,
        )
    }

    fn url_for(&self, seed: &str) -> String {
        format!("{}/seed/{}/1024/1024", self.base_url, seed)
    }
}

/// First 16 hex chars of SHA-256 over the prompt.
pub fn prompt_seed(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(&digest[..8])
}
