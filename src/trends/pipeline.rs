// src/trends/pipeline.rs
use std::sync::Mutex;

use anyhow::{Context, Result};
use metrics::{counter, gauge};

use super::sources::{TrendCandidate, TrendSource};
use super::store::{rank, TrendRecord, TrendStore, ALL};

/// Query parameters of one fetch-and-merge cycle. Empty values fall back to
/// the defaults, same as absent ones.
#[derive(Debug, Clone, Default)]
pub struct TrendQuery {
    pub language: Option<String>,
    /// Accepted and logged; never used for filtering.
    pub region: Option<String>,
    pub category: Option<String>,
}

impl TrendQuery {
    pub fn new(language: &str, category: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            region: None,
            category: Some(category.to_string()),
        }
    }

    /// Build from raw query pairs. The first occurrence of a key wins and
    /// unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut q = Self::default();
        for (k, v) in pairs {
            let slot = match k.as_str() {
                "language" => &mut q.language,
                "region" => &mut q.region,
                "category" => &mut q.category,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(v);
            }
        }
        q
    }

    pub fn language(&self) -> &str {
        non_empty_or(&self.language, ALL)
    }

    pub fn region(&self) -> &str {
        non_empty_or(&self.region, "global")
    }

    pub fn category(&self) -> &str {
        non_empty_or(&self.category, ALL)
    }
}

fn non_empty_or<'a>(v: &'a Option<String>, default: &'a str) -> &'a str {
    match v.as_deref() {
        Some(s) if !s.trim().is_empty() => s,
        _ => default,
    }
}

/// Candidate sources plus the page size applied to every result.
pub struct TrendPipeline {
    sources: Vec<Box<dyn TrendSource>>,
    page_size: usize,
}

impl TrendPipeline {
    pub fn new(sources: Vec<Box<dyn TrendSource>>, page_size: usize) -> Self {
        Self { sources, page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Collect candidates from every source. Any failure fails the whole batch.
    pub async fn fetch_candidates(&self, language: &str) -> Result<Vec<TrendCandidate>> {
        let mut out = Vec::new();
        for src in &self.sources {
            let mut batch = src
                .fetch(language)
                .await
                .with_context(|| format!("fetching trends from {}", src.name()))?;
            out.append(&mut batch);
        }
        Ok(out)
    }

    /// Fetch, merge, filter and rank in one cycle.
    ///
    /// The store is locked only once every source has answered, so a failed
    /// fetch leaves it untouched.
    pub async fn refresh(
        &self,
        store: &Mutex<TrendStore>,
        query: &TrendQuery,
    ) -> Result<Vec<TrendRecord>> {
        super::ensure_metrics_described();
        counter!("trends_refresh_total").increment(1);

        let language = query.language();
        let category = query.category();

        let candidates = match self.fetch_candidates(language).await {
            Ok(c) => c,
            Err(e) => {
                counter!("trends_refresh_errors_total").increment(1);
                tracing::warn!(target: "trends", error = ?e, "trend fetch failed");
                return Err(e);
            }
        };
        let fetched = candidates.len();

        let (report, matching, size) = {
            let mut guard = store
                .lock()
                .map_err(|_| anyhow::anyhow!("trend store lock poisoned"))?;
            let report = guard.merge(candidates);
            let matching = guard.query(language, category);
            (report, matching, guard.len())
        };

        counter!("trends_inserted_total").increment(report.inserted as u64);
        counter!("trends_duplicates_total").increment(report.duplicates as u64);
        gauge!("trends_store_size").set(size as f64);

        let ranked = rank(matching, self.page_size);
        tracing::info!(
            target: "trends",
            language,
            region = query.region(),
            category,
            fetched,
            inserted = report.inserted,
            duplicates = report.duplicates,
            returned = ranked.len(),
            "trend refresh"
        );
        Ok(ranked)
    }
}
