use crate::image::ImageRef;
use crate::prompt::{CreativeIntent, IntentParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A free-standing asset request: intent parameters plus the user's own text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRequest {
    pub params: IntentParams,
    pub prompt: String,
}

impl AssetRequest {
    pub fn new(params: IntentParams, prompt: impl Into<String>) -> Self {
        Self {
            params,
            prompt: prompt.into(),
        }
    }

    pub fn intent(&self) -> CreativeIntent {
        self.params.intent()
    }
}

/// 生成的视觉资产，创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualAsset {
    pub id: uuid::Uuid,
    #[serde(rename = "type")]
    pub intent: CreativeIntent,
    /// 用户原始输入，用于展示
    pub prompt: String,
    pub image: ImageRef,
    pub created_at: DateTime<Utc>,
    /// 按意图区分的参数（画幅、视图类型等）
    pub metadata: IntentParams,
}

impl VisualAsset {
    pub(crate) fn from_request(request: AssetRequest, image: ImageRef) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            intent: request.params.intent(),
            prompt: request.prompt,
            image,
            created_at: Utc::now(),
            metadata: request.params,
        }
    }
}
