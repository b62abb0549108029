pub mod registry;

use crate::image::ImageRef;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use registry::{SceneRegistry, StatusCounts};

/// 场景唯一标识，入库时分配一次，之后不再变更
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    pub fn fresh() -> Self {
        Self(format!("scene-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 场景生成状态：pending → generating → completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    Pending,
    Generating,
    Completed,
}

impl SceneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Completed => "completed",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Generating => 1,
            Self::Completed => 2,
        }
    }

    /// Status never moves backwards, and a scene cannot complete without
    /// having been requested.
    pub fn can_advance_to(self, next: SceneStatus) -> bool {
        if self == Self::Pending && next == Self::Completed {
            return false;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 镜头语言相关的可选信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cinematics {
    /// 景别，例如 Wide / Close-up / POV
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<String>,
    /// 运镜，例如 Static / Pan / Dolly In
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_move: Option<String>,
    /// 本场核心冲突
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
    /// 情绪氛围
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

/// 表示一个场景/分镜
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    /// 场号
    pub scene_number: String,
    pub location: String,
    /// 日/夜/内/外
    pub time: String,
    /// 场景描述文本
    pub description: String,
    /// 出场人物
    pub characters: Vec<String>,
    /// 用于生成画面的提示词
    pub visual_prompt: String,
    #[serde(flatten)]
    pub cinematics: Cinematics,
    pub status: SceneStatus,
    /// 生成完成后的图片
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

impl Scene {
    pub fn new(
        scene_number: String,
        location: String,
        time: String,
        description: String,
        characters: Vec<String>,
        visual_prompt: String,
    ) -> Self {
        Self {
            id: SceneId::fresh(),
            scene_number,
            location,
            time,
            description,
            characters,
            visual_prompt,
            cinematics: Cinematics::default(),
            status: SceneStatus::Pending,
            image: None,
        }
    }

    pub fn with_cinematics(mut self, cinematics: Cinematics) -> Self {
        self.cinematics = cinematics;
        self
    }
}

/// 人物小传
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub name: String,
    pub age: String,
    pub tags: Vec<String>,
    /// 主角 / 反派 等
    pub role: String,
    pub goal: String,
    /// 心理动机
    pub motivation: String,
    pub key_event: String,
}

/// 人物关系，按名字弱引用，名字对不上时允许悬空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub relation: String,
    /// 1-10
    pub strength: u8,
}

/// 情绪张力曲线上的一个点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalPoint {
    /// 场景序号（1 起），按位置弱引用
    pub scene_index: usize,
    /// 1-10
    pub intensity: u8,
    pub label: String,
}

/// 一次剧本分析的完整结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptAnalysis {
    pub title: String,
    #[serde(default)]
    pub genre: String,
    /// 一句话梗概
    #[serde(default)]
    pub logline: String,
    pub scenes: Vec<Scene>,
    pub character_profiles: Vec<CharacterProfile>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    pub emotional_curve: Vec<EmotionalPoint>,
}

/// Dashboard figures derived from an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub scene_count: usize,
    pub character_count: usize,
    pub conflict_count: usize,
    pub estimated_minutes: u32,
}

impl ScriptAnalysis {
    pub fn summary(&self) -> AnalysisSummary {
        let scene_count = self.scenes.len();
        AnalysisSummary {
            scene_count,
            character_count: self.character_profiles.len(),
            conflict_count: self
                .scenes
                .iter()
                .filter(|s| s.cinematics.conflict.is_some())
                .count(),
            // 每场约 1.5 分钟
            estimated_minutes: ((scene_count * 3 + 1) / 2) as u32,
        }
    }

    /// Relationships whose source or target does not name a profile.
    pub fn dangling_relationships(&self) -> Vec<&Relationship> {
        let known = |name: &str| self.character_profiles.iter().any(|p| p.name == name);
        self.relationships
            .iter()
            .filter(|r| !known(&r.source) || !known(&r.target))
            .collect()
    }

    /// Curve points whose scene index falls outside `1..=scenes.len()`.
    pub fn out_of_range_points(&self) -> Vec<&EmotionalPoint> {
        let len = self.scenes.len();
        self.emotional_curve
            .iter()
            .filter(|p| p.scene_index == 0 || p.scene_index > len)
            .collect()
    }

    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(n: &str, conflict: Option<&str>) -> Scene {
        Scene::new(
            n.to_string(),
            "Dock".to_string(),
            "Night".to_string(),
            "Rain on the pier.".to_string(),
            vec!["Mei".to_string()],
            "pier at night, rain".to_string(),
        )
        .with_cinematics(Cinematics {
            conflict: conflict.map(str::to_string),
            ..Cinematics::default()
        })
    }

    fn analysis(scenes: Vec<Scene>) -> ScriptAnalysis {
        ScriptAnalysis {
            title: "Harbor".to_string(),
            genre: "Drama".to_string(),
            logline: String::new(),
            scenes,
            character_profiles: vec![CharacterProfile {
                name: "Mei".to_string(),
                age: "28".to_string(),
                tags: vec!["Quiet".to_string()],
                role: "Protagonist".to_string(),
                goal: "Leave town".to_string(),
                motivation: "Debt".to_string(),
                key_event: "The storm".to_string(),
            }],
            relationships: vec![Relationship {
                source: "Mei".to_string(),
                target: "Ghost".to_string(),
                relation: "Sister".to_string(),
                strength: 7,
            }],
            emotional_curve: vec![
                EmotionalPoint {
                    scene_index: 1,
                    intensity: 3,
                    label: "Arrival".to_string(),
                },
                EmotionalPoint {
                    scene_index: 5,
                    intensity: 9,
                    label: "Storm".to_string(),
                },
            ],
        }
    }

    #[test]
    fn new_scenes_start_pending_with_distinct_ids() {
        let a = scene("1", None);
        let b = scene("2", None);
        assert_eq!(a.status, SceneStatus::Pending);
        assert!(a.image.is_none());
        assert_ne!(a.id, b.id);
        assert!(a.id.as_str().starts_with("scene-"));
    }

    #[test]
    fn status_only_moves_forward() {
        use SceneStatus::*;
        assert!(Pending.can_advance_to(Generating));
        assert!(Generating.can_advance_to(Completed));
        assert!(Generating.can_advance_to(Generating));
        assert!(Completed.can_advance_to(Completed));
        assert!(!Pending.can_advance_to(Completed));
        assert!(!Generating.can_advance_to(Pending));
        assert!(!Completed.can_advance_to(Generating));
    }

    #[test]
    fn summary_counts_conflicts_and_rounds_duration_up() {
        let a = analysis(vec![
            scene("1", Some("Man vs sea")),
            scene("2", None),
            scene("3", Some("Betrayal")),
        ]);
        let summary = a.summary();
        assert_eq!(summary.scene_count, 3);
        assert_eq!(summary.character_count, 1);
        assert_eq!(summary.conflict_count, 2);
        assert_eq!(summary.estimated_minutes, 5);
    }

    #[test]
    fn integrity_helpers_report_weak_references() {
        let a = analysis(vec![scene("1", None), scene("2", None)]);
        assert_eq!(a.dangling_relationships().len(), 1);
        let out = a.out_of_range_points();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "Storm");
    }

    #[test]
    fn scene_serializes_with_camel_case_and_flattened_cinematics() {
        let s = scene("1", Some("Man vs sea"));
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["sceneNumber"], "1");
        assert_eq!(value["visualPrompt"], "pier at night, rain");
        assert_eq!(value["conflict"], "Man vs sea");
        assert_eq!(value["status"], "pending");
        assert!(value.get("shotType").is_none());
        assert!(value.get("image").is_none());
    }
}
