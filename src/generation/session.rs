use super::asset::VisualAsset;
use crate::scene::{SceneRegistry, ScriptAnalysis};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

struct CurrentAnalysis {
    analysis: ScriptAnalysis,
    registry: Arc<SceneRegistry>,
}

/// Caller-owned context for one working session: the current analysis with
/// its scene registry, and the most-recent-first asset history.
///
/// Both are swapped as immutable snapshots, so readers never see a torn
/// update. Dropping the session (or calling [`Session::close`]) discards
/// everything; nothing is persisted.
pub struct Session {
    id: uuid::Uuid,
    current: RwLock<Option<Arc<CurrentAnalysis>>>,
    assets: RwLock<Arc<Vec<Arc<VisualAsset>>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4();
        debug!(session = %id, "Session opened");
        Self {
            id,
            current: RwLock::new(None),
            assets: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// Replaces the current analysis wholesale. Requests still in flight
    /// against the previous registry finish there and are not carried over.
    pub fn install_analysis(&self, analysis: ScriptAnalysis) -> Arc<SceneRegistry> {
        let registry = Arc::new(SceneRegistry::from_scenes(analysis.scenes.clone()));
        info!(
            session = %self.id,
            "Installed analysis \"{}\" ({} scenes)",
            analysis.title,
            registry.len()
        );
        *self.current.write() = Some(Arc::new(CurrentAnalysis {
            analysis,
            registry: Arc::clone(&registry),
        }));
        registry
    }

    pub fn registry(&self) -> Option<Arc<SceneRegistry>> {
        self.current
            .read()
            .as_ref()
            .map(|current| Arc::clone(&current.registry))
    }

    /// The current analysis with each scene's latest lifecycle state.
    pub fn analysis(&self) -> Option<ScriptAnalysis> {
        let current = self.current.read().clone()?;
        let mut analysis = current.analysis.clone();
        analysis.scenes = current.registry.snapshot();
        Some(analysis)
    }

    /// Most recent first.
    pub fn assets(&self) -> Arc<Vec<Arc<VisualAsset>>> {
        Arc::clone(&*self.assets.read())
    }

    pub(crate) fn prepend_asset(&self, asset: VisualAsset) -> Arc<VisualAsset> {
        let asset = Arc::new(asset);
        let mut guard = self.assets.write();
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(Arc::clone(&asset));
        next.extend(guard.iter().cloned());
        *guard = Arc::new(next);
        asset
    }

    /// Ends the session and hands back the asset history for an external
    /// store, if the caller has one.
    pub fn close(self) -> Vec<Arc<VisualAsset>> {
        info!(session = %self.id, "Session closed");
        let assets = self.assets.into_inner();
        Arc::try_unwrap(assets).unwrap_or_else(|shared| (*shared).clone())
    }
}
