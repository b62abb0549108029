use serde::{Deserialize, Serialize};

/// 图片引用的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// 内容服务实际返回的图片
    Live,
    /// 未配置凭据时的确定性占位图（同一提示词总是同一张）
    OfflinePlaceholder,
    /// 在线调用失败后的随机占位图
    FailurePlaceholder,
    /// 图片模型只返回了文字时，按提示词派生的占位图
    TextOnlyPlaceholder,
}

impl ImageSource {
    pub fn is_placeholder(self) -> bool {
        !matches!(self, Self::Live)
    }
}

/// 已物化的图片引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub source: ImageSource,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, source: ImageSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }

    /// Wraps an inline base64 payload from the content service as a data URL.
    pub fn from_inline(mime_type: &str, base64_data: &str) -> Self {
        Self::new(
            format!("data:{};base64,{}", mime_type, base64_data),
            ImageSource::Live,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_payload_becomes_data_url() {
        let image = ImageRef::from_inline("image/png", "iVBORw0KGgo=");
        assert_eq!(image.url, "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(image.source, ImageSource::Live);
        assert!(!image.source.is_placeholder());
    }
}
