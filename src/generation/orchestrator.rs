use super::asset::{AssetRequest, VisualAsset};
use super::session::Session;
use crate::api::{ContentService, Generation, OutputKind};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::image::ImageRef;
use crate::placeholder::PlaceholderResolver;
use crate::prompt::{self, CreativeIntent};
use crate::scene::{Scene, SceneId, SceneStatus};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Appended to a prompt when refinement is unavailable.
pub const QUALITY_SUFFIX: &str = ", high quality, 8k, cinematic lighting";

/// Drives per-scene and free-standing image materialization.
///
/// Every request that starts with valid input ends with an image: live
/// failures, timeouts and missing credentials resolve to placeholders.
#[derive(Clone)]
pub struct Orchestrator {
    service: Arc<dyn ContentService>,
    resolver: PlaceholderResolver,
    image_timeout: Duration,
    text_timeout: Duration,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn ContentService>, config: &PipelineConfig) -> Self {
        Self {
            service,
            resolver: PlaceholderResolver::from_config(config),
            image_timeout: config.image_timeout,
            text_timeout: config.analysis_timeout,
        }
    }

    pub fn with_resolver(mut self, resolver: PlaceholderResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Flips the scene to generating immediately, then spawns the task that
    /// materializes its image and completes the record.
    ///
    /// The task runs whether or not the handle is awaited; dropping or
    /// abandoning the handle never strands the scene in generating.
    /// Concurrent requests for the same scene race; the last to complete
    /// wins. Must be called from within a Tokio runtime.
    pub fn materialize_scene(
        &self,
        session: &Session,
        scene_id: &SceneId,
    ) -> Result<JoinHandle<Result<Arc<Scene>>>> {
        let registry = session
            .registry()
            .ok_or_else(|| PipelineError::UnknownScene(scene_id.to_string()))?;
        let scene = registry.begin_generation(scene_id)?;

        let this = self.clone();
        let scene_id = scene_id.clone();
        Ok(tokio::spawn(async move {
            let image = this.materialize(&scene.visual_prompt).await;
            let completed = registry.complete(&scene_id, image)?;
            info!(scene = %scene_id, "Scene {} materialized", completed.scene_number);
            Ok(completed)
        }))
    }

    /// Materializes every pending scene concurrently; results apply in
    /// completion order.
    pub async fn materialize_all(&self, session: &Session) -> Result<Vec<Arc<Scene>>> {
        let Some(registry) = session.registry() else {
            return Ok(Vec::new());
        };

        let mut pending = Vec::new();
        for id in registry.ids() {
            let is_pending = registry
                .get(id)
                .map(|s| s.status == SceneStatus::Pending)
                .unwrap_or(false);
            if is_pending {
                pending.push(self.materialize_scene(session, id)?);
            }
        }

        info!("Materializing {} scenes...", pending.len());
        join_all(pending)
            .await
            .into_iter()
            .map(|joined| joined.map_err(PipelineError::from).and_then(|scene| scene))
            .collect()
    }

    /// Composes, refines and materializes a free-standing asset, then puts
    /// it at the front of the session's asset history.
    pub async fn generate_asset(
        &self,
        session: &Session,
        request: AssetRequest,
    ) -> Result<VisualAsset> {
        let composed = prompt::compose(&request.params, &request.prompt)?;
        let refined = self.refine_prompt(request.intent(), &composed).await;
        let image = self.materialize(&refined).await;

        let asset = VisualAsset::from_request(request, image);
        session.prepend_asset(asset.clone());
        info!(intent = %asset.intent, "Generated asset {}", asset.id);
        Ok(asset)
    }

    /// Optional enrichment step. Falls back to the prompt plus
    /// [`QUALITY_SUFFIX`].
    pub async fn refine_prompt(&self, intent: CreativeIntent, composed: &str) -> String {
        if !self.service.has_credential() {
            info!(reason = "configuration_absent", "Skipping prompt refinement");
            return format!("{}{}", composed, QUALITY_SUFFIX);
        }

        let instruction = prompt::refinement_instruction(intent, composed);
        let outcome = tokio::time::timeout(
            self.text_timeout,
            self.service.generate(OutputKind::Text, &instruction),
        )
        .await;

        match outcome {
            Ok(Ok(Generation::Text(text))) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => {
                warn!(reason = "schema_violation", "Refinement returned no text");
                format!("{}{}", composed, QUALITY_SUFFIX)
            }
            Ok(Err(e)) => {
                warn!(reason = e.kind(), "Prompt refinement failed: {}", e);
                format!("{}{}", composed, QUALITY_SUFFIX)
            }
            Err(_) => {
                warn!(reason = "transport", "Prompt refinement timed out");
                format!("{}{}", composed, QUALITY_SUFFIX)
            }
        }
    }

    /// Turns a prompt into an image reference. Never fails.
    pub async fn materialize(&self, prompt: &str) -> ImageRef {
        if !self.service.has_credential() {
            info!(reason = "configuration_absent", "Using offline placeholder image");
            return self.resolver.resolve(prompt, false).await;
        }

        let outcome = tokio::time::timeout(
            self.image_timeout,
            self.service.generate(OutputKind::Image, prompt),
        )
        .await;

        match outcome {
            Ok(Ok(Generation::Image(payload))) => {
                ImageRef::from_inline(&payload.mime_type, &payload.data)
            }
            Ok(Ok(Generation::Text(_))) => {
                // 模型只回了文字：用提示词派生的占位图，保证同一场景结果稳定
                warn!(reason = "schema_violation", "Image model returned text only");
                self.resolver.text_reply(prompt)
            }
            Ok(Err(e)) => {
                warn!(reason = e.kind(), "Image generation failed, using placeholder: {}", e);
                self.resolver.resolve(prompt, true).await
            }
            Err(_) => {
                warn!(
                    reason = "transport",
                    "Image generation timed out after {}s, using placeholder",
                    self.image_timeout.as_secs()
                );
                self.resolver.resolve(prompt, true).await
            }
        }
    }
}
