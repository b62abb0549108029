//! Prompt composition for free-standing creative assets.
//!
//! Pure functions: no I/O, same input always yields the same instruction.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 创作意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeIntent {
    Poster,
    Character,
    Scene,
    Merchandise,
}

impl CreativeIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poster => "poster",
            Self::Character => "character",
            Self::Scene => "scene",
            Self::Merchandise => "merchandise",
        }
    }
}

impl fmt::Display for CreativeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 海报画幅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "2:3")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "2:3",
            Self::Landscape => "16:9",
        }
    }
}

/// 角色设定图的视图类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterView {
    Portrait,
    #[serde(rename = "3view")]
    ThreeView,
}

/// 衍生品品类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchProduct {
    Blindbox,
    Plush,
    Poster,
    AppSplash,
}

impl MerchProduct {
    /// Material and finish language for the product photo.
    pub fn material(self) -> &'static str {
        match self {
            Self::Blindbox => "3D PVC Material, Studio Lighting",
            Self::Plush => "Soft Fabric, Stitching Details",
            Self::Poster => "High Contrast, Typography Space",
            Self::AppSplash => "Vertical 9:16, Brand Colors",
        }
    }
}

/// Structured parameters for each creative intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "lowercase")]
pub enum IntentParams {
    Poster {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        aspect_ratio: AspectRatio,
    },
    Character {
        gender: String,
        view: CharacterView,
    },
    Scene {
        time_of_day: String,
        weather: String,
    },
    Merchandise {
        product: MerchProduct,
    },
}

impl IntentParams {
    pub fn intent(&self) -> CreativeIntent {
        match self {
            Self::Poster { .. } => CreativeIntent::Poster,
            Self::Character { .. } => CreativeIntent::Character,
            Self::Scene { .. } => CreativeIntent::Scene,
            Self::Merchandise { .. } => CreativeIntent::Merchandise,
        }
    }
}

/// Builds the generation instruction for an intent and the user's free text.
pub fn compose(params: &IntentParams, free_text: &str) -> Result<String> {
    let text = free_text.trim();
    if text.is_empty() {
        return Err(PipelineError::malformed("prompt text is empty"));
    }

    let instruction = match params {
        IntentParams::Poster {
            title,
            aspect_ratio,
        } => {
            let title_overlay = match title.as_deref().map(str::trim) {
                Some(t) if !t.is_empty() => format!("Title \"{}\" in center, ", t),
                _ => String::new(),
            };
            let framing = match aspect_ratio {
                AspectRatio::Portrait => "Portrait",
                AspectRatio::Landscape => "Landscape",
            };
            format!(
                "Movie Poster, {}{} composition. {}. Professional typography, cinematic lighting, blockbuster style.",
                title_overlay, framing, text
            )
        }
        IntentParams::Character { gender, view } => {
            let sheet = match view {
                CharacterView::ThreeView => "Three-view sheet (Front, Side, Back)",
                CharacterView::Portrait => "Cinematic Portrait",
            };
            format!(
                "Character Design, {}, {}. {}. Consistent facial features, costume design details, neutral background for concept art.",
                gender.trim(),
                sheet,
                text
            )
        }
        IntentParams::Scene {
            time_of_day,
            weather,
        } => format!(
            "Cinematic Environment Design. {}. Time: {}, Weather: {}. Wide angle shot, atmospheric depth, detailed textures, concept art style.",
            text,
            time_of_day.trim(),
            weather.trim()
        ),
        IntentParams::Merchandise { product } => format!(
            "A high quality product photography of a {} based on {}. Professional studio lighting, 4k, commercial advertisement style.",
            product.material(),
            text
        ),
    };

    Ok(instruction)
}

/// Instruction asking the text model to rewrite a composed prompt for an
/// image generator.
pub fn refinement_instruction(intent: CreativeIntent, prompt: &str) -> String {
    let emphasis = match intent {
        CreativeIntent::Character => "Focus on facial features and clothing consistency.",
        CreativeIntent::Merchandise => "Focus on material (PVC, Plush) and studio lighting.",
        CreativeIntent::Poster => "Leave clear space for title typography.",
        CreativeIntent::Scene => "Focus on environment depth, weather and time of day.",
    };

    format!(
        r#"You are an expert AI Art prompt engineer. Optimize the following description for a high-end image generator.
Target Type: {}
Original Description: "{}"

Requirements:
- Add lighting, texture, and camera details.
- {}
- Output ONLY the prompt text, no explanations."#,
        intent, prompt, emphasis
    )
}
