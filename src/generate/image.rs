// src/generate/image.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::seq::IndexedRandom;

use super::ImageGenerator;

pub const MOCK_IMAGES: [&str; 3] = [
    "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=800",
    "https://images.unsplash.com/photo-1620712943543-bcc4688e7485?w=800",
    "https://images.unsplash.com/photo-1655635949384-f737c5133dfe?w=800",
];

/// Picks one stock image at random, ignoring the topic.
pub struct MockImageGenerator;

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_image(&self, _topic: &str) -> Result<String> {
        MOCK_IMAGES
            .choose(&mut rand::rng())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("no stock images"))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
