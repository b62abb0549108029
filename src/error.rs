use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Empty script or prompt. Rejected before any service call.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Configuration absent: {0}")]
    ConfigurationAbsent(String),

    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    #[error("Illegal status transition for scene {scene}: {from} -> {to}")]
    IllegalTransition {
        scene: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    /// Errors the pipeline absorbs into a substitute result instead of
    /// surfacing: transport, schema and missing-credential failures.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::SchemaViolation(_)
                | Self::ConfigurationAbsent(_)
                | Self::HttpError(_)
                | Self::JsonError(_)
        )
    }

    /// Short stable label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::Transport(_) | Self::HttpError(_) | Self::IoError(_) => "transport",
            Self::SchemaViolation(_) | Self::JsonError(_) => "schema_violation",
            Self::ConfigurationAbsent(_) => "configuration_absent",
            Self::UnknownScene(_) => "unknown_scene",
            Self::IllegalTransition { .. } => "illegal_transition",
            Self::JoinError(_) => "task_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorbed_kinds_are_recoverable() {
        assert!(PipelineError::transport("down").is_recoverable());
        assert!(PipelineError::schema("missing title").is_recoverable());
        assert!(PipelineError::ConfigurationAbsent("no key".into()).is_recoverable());
        assert!(!PipelineError::malformed("empty").is_recoverable());
        assert!(!PipelineError::UnknownScene("scene-x".into()).is_recoverable());
    }

    #[test]
    fn json_errors_classify_as_schema_violations() {
        let err: PipelineError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "schema_violation");
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn panicked_tasks_surface_as_join_errors() {
        let joined = tokio::spawn(async { panic!("boom") }).await;
        let err: PipelineError = joined.unwrap_err().into();
        assert_eq!(err.kind(), "task_failed");
        assert!(!err.is_recoverable());
    }
}
