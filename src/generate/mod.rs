// src/generate/mod.rs
//! Content generation providers: text for a topic and tone, an image reference
//! for a topic. Real providers plug in behind the same traits as the mocks.

pub mod image;
pub mod text;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

pub use image::MockImageGenerator;
pub use text::{MockTextGenerator, OpenAiTextGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Funny,
    Informative,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Professional, Tone::Funny, Tone::Informative];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Funny => "funny",
            Tone::Informative => "informative",
        }
    }

    /// Unknown names map to `Professional`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "funny" => Tone::Funny,
            "informative" => Tone::Informative,
            _ => Tone::Professional,
        }
    }

    pub fn random() -> Self {
        *Self::ALL
            .choose(&mut rand::rng())
            .unwrap_or(&Tone::Professional)
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, topic: &str, tone: Tone) -> Result<String>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns a URL for an image illustrating `topic`.
    async fn generate_image(&self, topic: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

pub type DynTextGenerator = Arc<dyn TextGenerator>;
pub type DynImageGenerator = Arc<dyn ImageGenerator>;

/// Factory: `"openai"` builds the remote provider, anything else the mock.
pub fn build_text_generator(cfg: &GenerationConfig) -> Result<DynTextGenerator> {
    match cfg.text_provider.as_str() {
        "openai" => {
            let provider = OpenAiTextGenerator::new(cfg.api_key.clone(), cfg.model.as_deref())?;
            Ok(Arc::new(provider))
        }
        "mock" => Ok(Arc::new(MockTextGenerator)),
        other => {
            tracing::warn!(provider = other, "unknown text provider, using mock");
            Ok(Arc::new(MockTextGenerator))
        }
    }
}

pub fn build_image_generator(_cfg: &GenerationConfig) -> DynImageGenerator {
    Arc::new(MockImageGenerator)
}
