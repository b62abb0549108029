#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use script_previz::api::{ContentService, Generation, InlinePayload, OutputKind};
use script_previz::config::PipelineConfig;
use script_previz::error::{PipelineError, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub enum StructuredReply {
    Value(Value),
    Transport,
    Hang,
}

pub enum TextReply {
    Refined(String),
    Fail,
}

pub enum ImageReply {
    /// Echoes the prompt back as the payload, after a per-prompt delay.
    Echo,
    TextOnly,
    Fail,
    Hang,
}

/// In-memory content service with scripted answers.
pub struct ScriptedService {
    credential: bool,
    structured: StructuredReply,
    text: TextReply,
    image: ImageReply,
    delays: HashMap<String, Duration>,
    pub structured_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub image_prompts: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            credential: true,
            structured: StructuredReply::Value(live_analysis()),
            text: TextReply::Refined("refined prompt".to_string()),
            image: ImageReply::Echo,
            delays: HashMap::new(),
            structured_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            image_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn without_credential(mut self) -> Self {
        self.credential = false;
        self
    }

    pub fn structured(mut self, reply: StructuredReply) -> Self {
        self.structured = reply;
        self
    }

    pub fn text(mut self, reply: TextReply) -> Self {
        self.text = reply;
        self
    }

    pub fn image(mut self, reply: ImageReply) -> Self {
        self.image = reply;
        self
    }

    pub fn delay(mut self, prompt: &str, delay: Duration) -> Self {
        self.delays.insert(prompt.to_string(), delay);
        self
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn structured_generate(&self, _text: &str, _schema: &Value) -> Result<Value> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        if !self.credential {
            return Err(PipelineError::ConfigurationAbsent("no key".into()));
        }
        match &self.structured {
            StructuredReply::Value(v) => Ok(v.clone()),
            StructuredReply::Transport => Err(PipelineError::transport("connection refused")),
            StructuredReply::Hang => std::future::pending().await,
        }
    }

    async fn generate(&self, kind: OutputKind, instruction: &str) -> Result<Generation> {
        if !self.credential {
            return Err(PipelineError::ConfigurationAbsent("no key".into()));
        }
        match kind {
            OutputKind::Text => match &self.text {
                TextReply::Refined(t) => Ok(Generation::Text(t.clone())),
                TextReply::Fail => Err(PipelineError::transport("refinement unavailable")),
            },
            OutputKind::Image => {
                self.image_calls.fetch_add(1, Ordering::SeqCst);
                self.image_prompts.lock().push(instruction.to_string());
                if let Some(delay) = self.delays.get(instruction) {
                    tokio::time::sleep(*delay).await;
                }
                match &self.image {
                    ImageReply::Echo => Ok(Generation::Image(InlinePayload {
                        mime_type: "image/png".to_string(),
                        data: instruction.to_string(),
                    })),
                    ImageReply::TextOnly => Ok(Generation::Text("I cannot draw".to_string())),
                    ImageReply::Fail => Err(PipelineError::transport("image backend down")),
                    ImageReply::Hang => std::future::pending().await,
                }
            }
        }
    }
}

pub fn config() -> PipelineConfig {
    PipelineConfig::default()
}

/// Data URL the echo image reply produces for `prompt`.
pub fn echoed(prompt: &str) -> String {
    format!("data:image/png;base64,{}", prompt)
}

pub fn live_analysis() -> Value {
    json!({
        "title": "Night Ferry",
        "genre": "Thriller",
        "logline": "A courier realizes her package is alive.",
        "scenes": [
            {
                "id": "dup", "sceneNumber": "1", "location": "Ferry deck", "time": "Night",
                "description": "Lin guards a crate.", "characters": ["Lin"],
                "visualPrompt": "ferry deck at night, crate, fog", "shotType": "Wide"
            },
            {
                "id": "dup", "sceneNumber": "2", "location": "Cargo hold", "time": "Night",
                "description": "The crate knocks back.", "characters": ["Lin", "Officer Hu"],
                "visualPrompt": "cargo hold, single bulb, crate trembling", "conflict": "Trust"
            },
            {
                "sceneNumber": "3", "location": "Harbor", "time": "Dawn",
                "description": "Hu waits on the pier.", "characters": ["Officer Hu"],
                "visualPrompt": "harbor at dawn, police silhouette"
            }
        ],
        "characterProfiles": [
            { "name": "Lin", "age": "26", "tags": ["Stubborn"], "role": "Protagonist",
              "goal": "Deliver", "motivation": "Debt", "keyEvent": "The knock" },
            { "name": "Officer Hu", "age": "50", "tags": ["Patient"], "role": "Antagonist",
              "goal": "Seize the crate", "motivation": "Promotion", "keyEvent": "The pier" }
        ],
        "relationships": [
            { "source": "Lin", "target": "Officer Hu", "relation": "Pursuer", "strength": 7 }
        ],
        "emotionalCurve": [
            { "sceneIndex": 1, "intensity": 3, "label": "Calm" },
            { "sceneIndex": 2, "intensity": 8, "label": "Knock" },
            { "sceneIndex": 3, "intensity": 6, "label": "Standoff" }
        ]
    })
}
