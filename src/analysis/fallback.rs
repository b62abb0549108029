use crate::scene::{
    CharacterProfile, Cinematics, EmotionalPoint, Relationship, Scene, ScriptAnalysis,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fixed example analysis used whenever live analysis is unusable.
///
/// Two scenes, two profiles, one relationship between them and a curve point
/// per scene. Scene ids are fresh on every call.
pub fn synthesize() -> ScriptAnalysis {
    let scenes = vec![
        Scene::new(
            "1".to_string(),
            "Abandoned Warehouse".to_string(),
            "Night".to_string(),
            "Detective Chen enters the dusty warehouse. Shadows cling to the corners.".to_string(),
            strings(&["Detective Chen"]),
            "Cinematic shot, abandoned warehouse, volumetric lighting, silhouette, noir style."
                .to_string(),
        )
        .with_cinematics(Cinematics {
            shot_type: Some("Wide Shot".to_string()),
            camera_move: Some("Dolly In".to_string()),
            conflict: Some("Man vs Environment".to_string()),
            mood: Some("Tense".to_string()),
        }),
        Scene::new(
            "2".to_string(),
            "Interrogation Room".to_string(),
            "Interior".to_string(),
            "Chen slams the file on the table. The suspect, Viper, simply smiles.".to_string(),
            strings(&["Detective Chen", "Viper"]),
            "Close up, metal table, harsh overhead light, sweat on brow.".to_string(),
        )
        .with_cinematics(Cinematics {
            shot_type: Some("Close Up".to_string()),
            camera_move: Some("Static".to_string()),
            conflict: Some("Interrogation struggle".to_string()),
            mood: Some("Hostile".to_string()),
        }),
    ];

    ScriptAnalysis {
        title: "示例剧本：迷雾深处 (API Fallback)".to_string(),
        genre: "Suspense/Mystery".to_string(),
        logline:
            "A veteran detective confronts his past while interrogating a suspect who knows too much."
                .to_string(),
        scenes,
        character_profiles: vec![
            CharacterProfile {
                name: "Detective Chen".to_string(),
                age: "45".to_string(),
                tags: strings(&["Rugged", "Obsessive", "Cynical"]),
                role: "Protagonist".to_string(),
                goal: "Find the truth about the 1999 case".to_string(),
                motivation: "Guilt over partner's death".to_string(),
                key_event: "Entering the warehouse".to_string(),
            },
            CharacterProfile {
                name: "Viper".to_string(),
                age: "30".to_string(),
                tags: strings(&["Calm", "Manipulative", "Mysterious"]),
                role: "Antagonist".to_string(),
                goal: "Hide the boss's location".to_string(),
                motivation: "Loyalty to the syndicate".to_string(),
                key_event: "The interrogation smile".to_string(),
            },
        ],
        relationships: vec![Relationship {
            source: "Detective Chen".to_string(),
            target: "Viper".to_string(),
            relation: "Enemies".to_string(),
            strength: 9,
        }],
        emotional_curve: vec![
            EmotionalPoint {
                scene_index: 1,
                intensity: 4,
                label: "Entry".to_string(),
            },
            EmotionalPoint {
                scene_index: 2,
                intensity: 8,
                label: "Confrontation".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneStatus;
    use std::collections::HashSet;

    #[test]
    fn fallback_has_the_designated_shape() {
        let analysis = synthesize();
        assert_eq!(analysis.scenes.len(), 2);
        assert_eq!(analysis.character_profiles.len(), 2);
        assert_eq!(analysis.relationships.len(), 1);
    }

    #[test]
    fn fallback_is_internally_consistent() {
        let analysis = synthesize();
        assert!(analysis.dangling_relationships().is_empty());
        assert!(analysis.out_of_range_points().is_empty());
        assert!(analysis
            .scenes
            .iter()
            .all(|s| s.status == SceneStatus::Pending && s.image.is_none()));

        let names: HashSet<_> = analysis.character_profiles.iter().map(|p| &p.name).collect();
        for scene in &analysis.scenes {
            for character in &scene.characters {
                assert!(names.contains(character), "{} has no profile", character);
            }
        }
    }

    #[test]
    fn every_call_mints_fresh_ids() {
        let first = synthesize();
        let second = synthesize();
        let ids: HashSet<_> = first
            .scenes
            .iter()
            .chain(second.scenes.iter())
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(ids.len(), 4);
    }
}
