use super::{Scene, SceneId, SceneStatus};
use crate::error::{PipelineError, Result};
use crate::image::ImageRef;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-scene lifecycle store for one analysis.
///
/// The set of scenes is fixed when the registry is built; each scene lives
/// in its own slot. Readers get `Arc<Scene>` snapshots and writers swap a
/// new record into a single slot, so updating one scene never touches or
/// blocks another.
#[derive(Debug)]
pub struct SceneRegistry {
    order: Vec<SceneId>,
    slots: HashMap<SceneId, RwLock<Arc<Scene>>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub generating: usize,
    pub completed: usize,
}

impl SceneRegistry {
    pub fn from_scenes(scenes: Vec<Scene>) -> Self {
        let mut order = Vec::with_capacity(scenes.len());
        let mut slots = HashMap::with_capacity(scenes.len());
        for scene in scenes {
            order.push(scene.id.clone());
            slots.insert(scene.id.clone(), RwLock::new(Arc::new(scene)));
        }
        Self { order, slots }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[SceneId] {
        &self.order
    }

    pub fn get(&self, id: &SceneId) -> Option<Arc<Scene>> {
        self.slots.get(id).map(|slot| Arc::clone(&*slot.read()))
    }

    /// Current records in ingestion order.
    pub fn snapshot(&self) -> Vec<Scene> {
        self.order
            .iter()
            .filter_map(|id| self.get(id))
            .map(|scene| (*scene).clone())
            .collect()
    }

    /// Marks a scene as requested and returns the record the request should
    /// work from.
    ///
    /// A pending scene becomes generating. A scene already generating or
    /// completed keeps its status; the new request races the previous one
    /// and whichever completes last wins.
    pub fn begin_generation(&self, id: &SceneId) -> Result<Arc<Scene>> {
        let slot = self
            .slots
            .get(id)
            .ok_or_else(|| PipelineError::UnknownScene(id.to_string()))?;

        let mut guard = slot.write();
        if guard.status == SceneStatus::Pending {
            let mut next = (**guard).clone();
            next.status = SceneStatus::Generating;
            *guard = Arc::new(next);
            debug!(scene = %id, "Scene status: pending -> generating");
        } else {
            debug!(scene = %id, status = %guard.status, "Scene re-requested");
        }
        Ok(Arc::clone(&*guard))
    }

    /// Attaches the image and marks the scene completed.
    pub fn complete(&self, id: &SceneId, image: ImageRef) -> Result<Arc<Scene>> {
        let slot = self
            .slots
            .get(id)
            .ok_or_else(|| PipelineError::UnknownScene(id.to_string()))?;

        let mut guard = slot.write();
        let from = guard.status;
        if !from.can_advance_to(SceneStatus::Completed) {
            return Err(PipelineError::IllegalTransition {
                scene: id.to_string(),
                from: from.as_str(),
                to: SceneStatus::Completed.as_str(),
            });
        }

        let mut next = (**guard).clone();
        next.status = SceneStatus::Completed;
        next.image = Some(image);
        *guard = Arc::new(next);
        debug!(scene = %id, "Scene status: {} -> completed", from);
        Ok(Arc::clone(&*guard))
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for slot in self.slots.values() {
            match slot.read().status {
                SceneStatus::Pending => counts.pending += 1,
                SceneStatus::Generating => counts.generating += 1,
                SceneStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }
}
