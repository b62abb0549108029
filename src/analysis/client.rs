use super::fallback;
use super::schema::{analysis_schema, REQUIRED_KEYS};
use crate::api::ContentService;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::scene::{
    CharacterProfile, Cinematics, EmotionalPoint, Relationship, Scene, ScriptAnalysis,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Where an analysis came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Live,
    /// Live analysis was unusable; `reason` is the absorbed error kind.
    Fallback { reason: &'static str },
}

#[derive(Debug, Clone)]
pub struct Analyzed {
    pub analysis: ScriptAnalysis,
    pub provenance: Provenance,
}

/// Turns screenplay text into a [`ScriptAnalysis`] via schema-constrained
/// generation, falling back to example data when the service is unusable.
#[derive(Clone)]
pub struct AnalysisClient {
    service: Arc<dyn ContentService>,
    timeout: Duration,
}

impl AnalysisClient {
    pub fn new(service: Arc<dyn ContentService>, config: &PipelineConfig) -> Self {
        Self {
            service,
            timeout: config.analysis_timeout,
        }
    }

    /// Only fails for empty input. Once the text is accepted a usable
    /// analysis is always returned.
    pub async fn analyze(&self, script_text: &str) -> Result<ScriptAnalysis> {
        Ok(self.analyze_detailed(script_text).await?.analysis)
    }

    pub async fn analyze_detailed(&self, script_text: &str) -> Result<Analyzed> {
        if script_text.trim().is_empty() {
            return Err(PipelineError::malformed("script text is empty"));
        }

        info!("Analyzing script ({} characters)...", script_text.len());
        match self.request_live(script_text).await {
            Ok(analysis) => {
                info!(
                    "Live analysis: \"{}\" with {} scenes",
                    analysis.title,
                    analysis.scenes.len()
                );
                Ok(Analyzed {
                    analysis,
                    provenance: Provenance::Live,
                })
            }
            Err(e) => {
                warn!(
                    reason = e.kind(),
                    service = self.service.name(),
                    "Script analysis fell back to example data: {}",
                    e
                );
                Ok(Analyzed {
                    analysis: fallback::synthesize(),
                    provenance: Provenance::Fallback { reason: e.kind() },
                })
            }
        }
    }

    async fn request_live(&self, script_text: &str) -> Result<ScriptAnalysis> {
        if !self.service.has_credential() {
            return Err(PipelineError::ConfigurationAbsent(format!(
                "{} has no API key",
                self.service.name()
            )));
        }

        let prompt = analysis_prompt(script_text);
        let schema = analysis_schema();
        let value = tokio::time::timeout(
            self.timeout,
            self.service.structured_generate(&prompt, &schema),
        )
        .await
        .map_err(|_| {
            PipelineError::transport(format!(
                "analysis timed out after {}s",
                self.timeout.as_secs()
            ))
        })??;

        parse_analysis(value)
    }
}

fn analysis_prompt(script_text: &str) -> String {
    format!(
        r#"You are an expert Film Dramaturg and Assistant Director. Analyze the following script segment deeply.

Perform the following tasks:
1. Scene Breakdown: Split into executable scenes with camera direction.
2. Character Profiling: Infer age, personality tags, goals, and motivations from the subtext.
3. Relationship Mapping: Identify relationships between characters.
4. Emotional/Tension Curve: Rate the dramatic tension (1-10) for each key beat/scene.

Script:
{}"#,
        script_text
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveAnalysis {
    title: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    logline: String,
    scenes: Vec<LiveScene>,
    character_profiles: Vec<CharacterProfile>,
    #[serde(default)]
    relationships: Vec<LiveRelationship>,
    emotional_curve: Vec<LivePoint>,
}

// 服务端返回的 id/status 一律忽略，入库时重新分配
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveScene {
    scene_number: String,
    location: String,
    time: String,
    description: String,
    characters: Vec<String>,
    visual_prompt: String,
    #[serde(flatten)]
    cinematics: Cinematics,
}

#[derive(Deserialize)]
struct LiveRelationship {
    source: String,
    target: String,
    relation: String,
    strength: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LivePoint {
    scene_index: f64,
    intensity: f64,
    label: String,
}

fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 1;
    }
    value.round().clamp(1.0, 10.0) as u8
}

/// Validates a structured response and ingests it: every scene gets a fresh
/// id and starts pending.
pub(crate) fn parse_analysis(value: Value) -> Result<ScriptAnalysis> {
    let object = value
        .as_object()
        .ok_or_else(|| PipelineError::schema("analysis is not a JSON object"))?;
    if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
        return Err(PipelineError::schema(format!("missing required key `{}`", missing)));
    }

    let live: LiveAnalysis = serde_json::from_value(value)
        .map_err(|e| PipelineError::schema(format!("analysis shape mismatch: {}", e)))?;
    if live.scenes.is_empty() {
        return Err(PipelineError::schema("analysis contains no scenes"));
    }

    let scenes = live
        .scenes
        .into_iter()
        .map(|s| {
            Scene::new(
                s.scene_number,
                s.location,
                s.time,
                s.description,
                s.characters,
                s.visual_prompt,
            )
            .with_cinematics(s.cinematics)
        })
        .collect();

    let relationships = live
        .relationships
        .into_iter()
        .map(|r| Relationship {
            source: r.source,
            target: r.target,
            relation: r.relation,
            strength: clamp_score(r.strength),
        })
        .collect();

    let emotional_curve = live
        .emotional_curve
        .into_iter()
        .map(|p| EmotionalPoint {
            scene_index: if p.scene_index.is_finite() && p.scene_index > 0.0 {
                p.scene_index.round() as usize
            } else {
                0
            },
            intensity: clamp_score(p.intensity),
            label: p.label,
        })
        .collect();

    Ok(ScriptAnalysis {
        title: live.title,
        genre: live.genre,
        logline: live.logline,
        scenes,
        character_profiles: live.character_profiles,
        relationships,
        emotional_curve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneStatus;
    use serde_json::json;

    fn live_value() -> Value {
        json!({
            "title": "Harbor Lights",
            "genre": "Drama",
            "scenes": [
                {
                    "id": "1", "status": "completed",
                    "sceneNumber": "1", "location": "Pier", "time": "Night",
                    "description": "Mei waits.", "characters": ["Mei"],
                    "visualPrompt": "pier, fog", "mood": "Lonely"
                },
                {
                    "id": "1",
                    "sceneNumber": "2", "location": "Boat", "time": "Dawn",
                    "description": "The boat leaves.", "characters": ["Mei", "Jun"],
                    "visualPrompt": "boat at dawn"
                }
            ],
            "characterProfiles": [{
                "name": "Mei", "age": "28", "tags": ["Quiet"], "role": "Protagonist",
                "goal": "Leave", "motivation": "Debt", "keyEvent": "Departure"
            }],
            "relationships": [
                { "source": "Mei", "target": "Jun", "relation": "Siblings", "strength": 14.0 }
            ],
            "emotionalCurve": [
                { "sceneIndex": 1, "intensity": 0.2, "label": "Wait" },
                { "sceneIndex": 2.0, "intensity": 7, "label": "Leave" }
            ]
        })
    }

    #[test]
    fn live_result_is_ingested_with_fresh_ids() {
        let analysis = parse_analysis(live_value()).unwrap();
        assert_eq!(analysis.scenes.len(), 2);
        assert_ne!(analysis.scenes[0].id, analysis.scenes[1].id);
        assert_ne!(analysis.scenes[0].id.as_str(), "1");
        assert!(analysis
            .scenes
            .iter()
            .all(|s| s.status == SceneStatus::Pending));
        assert_eq!(analysis.scenes[0].cinematics.mood.as_deref(), Some("Lonely"));
        assert_eq!(analysis.logline, "");
    }

    #[test]
    fn scores_are_clamped_into_range() {
        let analysis = parse_analysis(live_value()).unwrap();
        assert_eq!(analysis.relationships[0].strength, 10);
        assert_eq!(analysis.emotional_curve[0].intensity, 1);
        assert_eq!(analysis.emotional_curve[1].scene_index, 2);
    }

    #[test]
    fn missing_required_key_is_a_schema_violation() {
        let mut value = live_value();
        value.as_object_mut().unwrap().remove("emotionalCurve");
        let err = parse_analysis(value).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaViolation(ref m) if m.contains("emotionalCurve")));
    }

    #[test]
    fn wrong_types_and_empty_scenes_are_schema_violations() {
        let mut value = live_value();
        value["scenes"] = json!("not a list");
        assert!(matches!(
            parse_analysis(value),
            Err(PipelineError::SchemaViolation(_))
        ));

        let mut value = live_value();
        value["scenes"] = json!([]);
        assert!(matches!(
            parse_analysis(value),
            Err(PipelineError::SchemaViolation(_))
        ));

        assert!(matches!(
            parse_analysis(json!([1, 2, 3])),
            Err(PipelineError::SchemaViolation(_))
        ));
    }
}
