// src/trends/sources.rs
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::store::ALL;

/// Language that every feed always supplies, whatever was requested.
pub const DEFAULT_FEED_LANGUAGE: &str = "en";

/// Raw trend tuple as a supplier returns it; the store assigns id, timestamp
/// and approval state on ingest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendCandidate {
    pub title: String,
    pub source: String,
    pub score: f64,
    pub category: String,
    pub language: String,
}

#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn fetch(&self, language: &str) -> Result<Vec<TrendCandidate>>;
    fn name(&self) -> &'static str;
}

/// (title, score, category, language)
type Row = (&'static str, f64, &'static str, &'static str);

/// Feed backed by a fixed table of rows.
pub struct FixtureSource {
    name: &'static str,
    rows: &'static [Row],
}

impl FixtureSource {
    pub const fn new(name: &'static str, rows: &'static [Row]) -> Self {
        Self { name, rows }
    }

    pub fn google_trends() -> Self {
        Self::new("Google Trends", GOOGLE_TRENDS)
    }

    pub fn twitter() -> Self {
        Self::new("Twitter", TWITTER)
    }

    pub fn reddit() -> Self {
        Self::new("Reddit", REDDIT)
    }
}

#[async_trait]
impl TrendSource for FixtureSource {
    async fn fetch(&self, language: &str) -> Result<Vec<TrendCandidate>> {
        let out = self
            .rows
            .iter()
            .filter(|(_, _, _, lang)| {
                *lang == DEFAULT_FEED_LANGUAGE || language == ALL || language == *lang
            })
            .map(|&(title, score, category, lang)| TrendCandidate {
                title: title.to_string(),
                source: self.name.to_string(),
                score,
                category: category.to_string(),
                language: lang.to_string(),
            })
            .collect();
        Ok(out)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// The three built-in feeds.
pub fn default_sources() -> Vec<Box<dyn TrendSource>> {
    vec![
        Box::new(FixtureSource::google_trends()),
        Box::new(FixtureSource::twitter()),
        Box::new(FixtureSource::reddit()),
    ]
}

const GOOGLE_TRENDS: &[Row] = &[
    ("پاکستان میں ٹیکنالوجی کی ترقی", 86.0, "technology", "ur"),
    ("Artificial Intelligence Breakthrough", 95.0, "technology", "en"),
    ("Climate Summit 2025", 88.0, "environment", "en"),
    ("New Space Mission Launch", 92.0, "technology", "en"),
    ("Olympic Games Highlights", 87.0, "sports", "en"),
];

const TWITTER: &[Row] = &[
    ("کرکٹ میچ کی تازہ ترین خبریں", 91.0, "sports", "ur"),
    ("Breaking Tech News", 90.0, "technology", "en"),
    ("Viral Entertainment Moment", 85.0, "entertainment", "en"),
    ("Sports Championship Final", 82.0, "sports", "en"),
];

const REDDIT: &[Row] = &[
    ("Gaming Industry Update", 78.0, "entertainment", "en"),
    ("Health & Wellness Tips", 75.0, "health", "en"),
    ("Business Innovation", 80.0, "business", "en"),
];
