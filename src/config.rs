use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_PLACEHOLDER_DELAY: Duration = Duration::from_millis(2500);
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://picsum.photos";

/// Pipeline settings. Built from the environment, then overridden by CLI
/// flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 内容服务的 API key；为空表示离线模式
    pub api_key: Option<String>,
    /// 剧本分析最长等待时间，超时后走兜底数据
    pub analysis_timeout: Duration,
    /// 单张图片生成最长等待时间，超时后用占位图
    pub image_timeout: Duration,
    /// 离线占位图的最小人为延迟
    pub placeholder_delay: Duration,
    pub placeholder_base: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
            placeholder_delay: DEFAULT_PLACEHOLDER_DELAY,
            placeholder_base: DEFAULT_PLACEHOLDER_BASE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Reads `GEMINI_API_KEY` (or `API_KEY`) and the `SCRIPT_PREVIZ_*`
    /// tuning variables. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.api_key = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| is_valid_key(key));

        if let Some(secs) = env_u64("SCRIPT_PREVIZ_ANALYSIS_TIMEOUT_SECS") {
            config.analysis_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("SCRIPT_PREVIZ_IMAGE_TIMEOUT_SECS") {
            config.image_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = env_u64("SCRIPT_PREVIZ_PLACEHOLDER_DELAY_MS") {
            config.placeholder_delay = Duration::from_millis(ms);
        }
        if let Ok(base) = std::env::var("SCRIPT_PREVIZ_PLACEHOLDER_BASE") {
            if !base.trim().is_empty() {
                config.placeholder_base = base.trim().trim_end_matches('/').to_string();
            }
        }

        if config.api_key.is_some() {
            info!("Content service API key loaded from environment");
        } else {
            info!("No content service API key configured, running in offline mode");
        }
        config
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| is_valid_key(k));
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Non-empty, non-whitespace.
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", name, raw, e);
            None
        }
    }
}
