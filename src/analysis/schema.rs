use serde_json::{json, Value};

/// Top-level keys a live analysis must carry.
pub const REQUIRED_KEYS: [&str; 4] = ["title", "scenes", "characterProfiles", "emotionalCurve"];

/// Output shape declared to the content service for script analysis.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "genre": { "type": "STRING" },
            "logline": { "type": "STRING", "description": "One sentence summary" },
            "scenes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "sceneNumber": { "type": "STRING" },
                        "location": { "type": "STRING" },
                        "time": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "characters": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "visualPrompt": { "type": "STRING" },
                        "shotType": { "type": "STRING", "description": "e.g. Wide, Close-up, POV" },
                        "cameraMove": { "type": "STRING", "description": "e.g. Static, Pan, Dolly In" },
                        "conflict": { "type": "STRING", "description": "The central conflict of this scene" },
                        "mood": { "type": "STRING", "description": "Emotional atmosphere word" }
                    },
                    "required": ["sceneNumber", "location", "time", "description", "characters", "visualPrompt"]
                }
            },
            "characterProfiles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "age": { "type": "STRING" },
                        "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "role": { "type": "STRING" },
                        "goal": { "type": "STRING", "description": "Immediate or life goal" },
                        "motivation": { "type": "STRING", "description": "Psychological driver" },
                        "keyEvent": { "type": "STRING" }
                    },
                    "required": ["name", "age", "tags", "role", "goal", "motivation", "keyEvent"]
                }
            },
            "relationships": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "source": { "type": "STRING" },
                        "target": { "type": "STRING" },
                        "relation": { "type": "STRING" },
                        "strength": { "type": "NUMBER", "description": "1 to 10" }
                    },
                    "required": ["source", "target", "relation", "strength"]
                }
            },
            "emotionalCurve": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "sceneIndex": { "type": "NUMBER" },
                        "intensity": { "type": "NUMBER", "description": "1 to 10" },
                        "label": { "type": "STRING" }
                    },
                    "required": ["sceneIndex", "intensity", "label"]
                }
            }
        },
        "required": REQUIRED_KEYS
    })
}
