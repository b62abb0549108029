//! Screenplay breakdown and asynchronous pre-visualization asset generation.
//!
//! Raw script text goes through [`analysis::AnalysisClient`] to become a
//! [`scene::ScriptAnalysis`]; [`generation::Orchestrator`] then materializes
//! scene images and free-standing creative assets inside a caller-owned
//! [`generation::Session`]. Service failures never surface mid-workflow:
//! they degrade to example data or placeholder images.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod generation;
pub mod image;
pub mod placeholder;
pub mod prompt;
pub mod scene;

pub use error::{PipelineError, Result};
