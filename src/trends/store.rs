// src/trends/store.rs
//! In-memory trend store: dedup-by-title merge, approval, filtering and ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sources::TrendCandidate;

/// Hard upper bound on a ranked page.
pub const MAX_PAGE_SIZE: usize = 50;

/// Filter sentinel meaning "do not filter on this field".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub id: String,
    pub title: String,
    pub source: String,
    pub score: f64,
    pub category: String,
    pub language: String,
    pub timestamp: DateTime<Utc>,
    /// `None` while pending review.
    pub approved: Option<bool>,
}

impl TrendRecord {
    fn from_candidate(c: TrendCandidate, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("trend_{}", uuid::Uuid::new_v4().simple()),
            title: c.title,
            source: c.source,
            score: c.score,
            category: c.category,
            language: c.language,
            timestamp: now,
            approved: None,
        }
    }
}

/// Counts from a single `merge` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub inserted: usize,
    pub duplicates: usize,
}

/// What `approve` did. Callers report success regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Applied,
    /// Already approved or rejected; left unchanged.
    AlreadyDecided,
    Unknown,
}

/// Accumulates every trend ever seen. Insertion order is preserved and
/// records are never removed.
#[derive(Debug, Default)]
pub struct TrendStore {
    records: Vec<TrendRecord>,
}

impl TrendStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append candidates whose title is not yet present. First-seen title wins;
    /// later duplicates never overwrite any field.
    pub fn merge<I>(&mut self, candidates: I) -> MergeReport
    where
        I: IntoIterator<Item = TrendCandidate>,
    {
        let now = Utc::now();
        let mut report = MergeReport::default();
        for c in candidates {
            if self.records.iter().any(|r| r.title == c.title) {
                report.duplicates += 1;
                continue;
            }
            self.records.push(TrendRecord::from_candidate(c, now));
            report.inserted += 1;
        }
        report
    }

    /// Record a human decision. Unknown ids are a silent no-op.
    pub fn approve(&mut self, id: &str, decision: bool) -> Approval {
        match self.records.iter_mut().find(|r| r.id == id) {
            None => Approval::Unknown,
            Some(r) if r.approved.is_some() => Approval::AlreadyDecided,
            Some(r) => {
                r.approved = Some(decision);
                Approval::Applied
            }
        }
    }

    /// Records matching both filters, in insertion order. `"all"` disables a filter.
    pub fn query(&self, language: &str, category: &str) -> Vec<TrendRecord> {
        self.records
            .iter()
            .filter(|r| language == ALL || r.language == language)
            .filter(|r| category == ALL || r.category == category)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&TrendRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sort by score descending (stable, so ties keep insertion order) and keep
/// at most `page_size` records, itself capped at `MAX_PAGE_SIZE`.
pub fn rank(mut records: Vec<TrendRecord>, page_size: usize) -> Vec<TrendRecord> {
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
    records.truncate(clamp_page_size(page_size));
    records
}

pub fn clamp_page_size(n: usize) -> usize {
    n.clamp(1, MAX_PAGE_SIZE)
}
