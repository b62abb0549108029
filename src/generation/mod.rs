pub mod asset;
pub mod orchestrator;
pub mod session;

pub use asset::{AssetRequest, VisualAsset};
pub use orchestrator::{Orchestrator, QUALITY_SUFFIX};
pub use session::Session;
