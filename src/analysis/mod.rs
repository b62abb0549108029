pub mod client;
pub mod fallback;
pub mod schema;

pub use client::{AnalysisClient, Analyzed, Provenance};
pub use fallback::synthesize;
pub use schema::analysis_schema;
