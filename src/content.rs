// src/content.rs
//! Generated posts waiting to be scheduled.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::generate::Tone;

/// Platforms a generated post may target, in preference order.
pub const PLATFORMS: [&str; 6] = [
    "facebook",
    "instagram",
    "twitter",
    "youtube",
    "pinterest",
    "threads",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub trend_id: String,
    pub trend_title: String,
    pub text: String,
    pub image_url: String,
    pub platforms: Vec<String>,
    pub tone: Tone,
    pub language: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything a content item needs except its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub trend_id: String,
    pub trend_title: String,
    pub text: String,
    pub image_url: String,
    pub platforms: Vec<String>,
    pub tone: Tone,
    pub language: String,
}

/// The first 3 to 5 entries of `PLATFORMS`.
pub fn pick_platforms<R: Rng>(rng: &mut R) -> Vec<String> {
    let n = rng.random_range(3..=5);
    PLATFORMS.iter().take(n).map(|p| p.to_string()).collect()
}

#[derive(Debug, Default)]
pub struct ContentStore {
    items: Vec<ContentItem>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, c: NewContent) -> ContentItem {
        let item = ContentItem {
            id: format!("content_{}", uuid::Uuid::new_v4().simple()),
            trend_id: c.trend_id,
            trend_title: c.trend_title,
            text: c.text,
            image_url: c.image_url,
            platforms: c.platforms,
            tone: c.tone,
            language: c.language,
            timestamp: Utc::now(),
        };
        self.items.push(item.clone());
        item
    }

    /// Newest first.
    pub fn list(&self) -> Vec<ContentItem> {
        let mut out = self.items.clone();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }

    pub fn get(&self, id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|c| c.id == id)
    }

    /// Returns the removed item, or `None` for an unknown id.
    pub fn remove(&mut self, id: &str) -> Option<ContentItem> {
        let idx = self.items.iter().position(|c| c.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
