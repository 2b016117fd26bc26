// src/scheduler.rs
//! Scheduled posts. `scheduled_time` is informational only: nothing fires on
//! it, posts go out when `/api/scheduler/{id}/post` is called.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Scheduled,
    Posted,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub id: String,
    pub content_id: String,
    pub text: String,
    pub image_url: String,
    pub platforms: Vec<String>,
    pub scheduled_time: DateTime<Utc>,
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
}

/// Pushes a post out to its platforms.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, post: &ScheduledPost) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Accepts every post without contacting anything.
pub struct MockPublisher;

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, post: &ScheduledPost) -> Result<()> {
        tracing::debug!(
            target: "scheduler",
            id = %post.id,
            platforms = ?post.platforms,
            "mock publish"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<ScheduledPost>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `content` to go out `delay_minutes` after `now`.
    pub fn schedule(
        &mut self,
        content: &ContentItem,
        now: DateTime<Utc>,
        delay_minutes: u32,
    ) -> ScheduledPost {
        let post = ScheduledPost {
            id: format!("post_{}", uuid::Uuid::new_v4().simple()),
            content_id: content.id.clone(),
            text: content.text.clone(),
            image_url: content.image_url.clone(),
            platforms: content.platforms.clone(),
            scheduled_time: now + ChronoDuration::minutes(i64::from(delay_minutes)),
            status: PostStatus::Scheduled,
            posted_at: None,
        };
        self.posts.push(post.clone());
        post
    }

    /// Earliest `scheduled_time` first.
    pub fn list(&self) -> Vec<ScheduledPost> {
        let mut out = self.posts.clone();
        out.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
        out
    }

    pub fn get(&self, id: &str) -> Option<&ScheduledPost> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn mark_posted(&mut self, id: &str, at: DateTime<Utc>) -> Option<ScheduledPost> {
        let p = self.posts.iter_mut().find(|p| p.id == id)?;
        p.status = PostStatus::Posted;
        p.posted_at = Some(at);
        Some(p.clone())
    }

    pub fn mark_failed(&mut self, id: &str) -> Option<ScheduledPost> {
        let p = self.posts.iter_mut().find(|p| p.id == id)?;
        p.status = PostStatus::Failed;
        Some(p.clone())
    }

    pub fn remove(&mut self, id: &str) -> Option<ScheduledPost> {
        let idx = self.posts.iter().position(|p| p.id == id)?;
        Some(self.posts.remove(idx))
    }

    pub fn count_with_status(&self, status: PostStatus) -> usize {
        self.posts.iter().filter(|p| p.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Tone;
    use chrono::TimeZone;

    fn content(id: &str) -> ContentItem {
        ContentItem {
            id: id.into(),
            trend_id: "trend_x".into(),
            trend_title: "X".into(),
            text: "body".into(),
            image_url: "https://example.invalid/i.png".into(),
            platforms: vec!["facebook".into(), "threads".into()],
            tone: Tone::Professional,
            language: "en".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn schedule_copies_content_and_adds_delay() {
        let mut s = PostStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        let p = s.schedule(&content("content_1"), t0, 120);
        assert_eq!(p.content_id, "content_1");
        assert_eq!(p.platforms, vec!["facebook", "threads"]);
        assert_eq!(p.status, PostStatus::Scheduled);
        assert_eq!(p.scheduled_time, t0 + ChronoDuration::hours(2));
        assert!(p.posted_at.is_none());
    }

    #[test]
    fn list_orders_by_scheduled_time() {
        let mut s = PostStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        let late = s.schedule(&content("c1"), t0, 300);
        let early = s.schedule(&content("c2"), t0, 10);
        let ids: Vec<_> = s.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[test]
    fn status_transitions_and_counts() {
        let mut s = PostStore::new();
        let now = Utc::now();
        let a = s.schedule(&content("c1"), now, 1);
        let b = s.schedule(&content("c2"), now, 1);
        s.schedule(&content("c3"), now, 1);

        let posted = s.mark_posted(&a.id, now).unwrap();
        assert_eq!(posted.status, PostStatus::Posted);
        assert_eq!(posted.posted_at, Some(now));
        s.mark_failed(&b.id);

        assert_eq!(s.count_with_status(PostStatus::Posted), 1);
        assert_eq!(s.count_with_status(PostStatus::Failed), 1);
        assert_eq!(s.count_with_status(PostStatus::Scheduled), 1);
        assert!(s.mark_posted("post_missing", now).is_none());
    }

    #[test]
    fn posted_at_is_omitted_until_set() {
        let mut s = PostStore::new();
        let p = s.schedule(&content("c1"), Utc::now(), 1);
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("postedAt").is_none());
        assert_eq!(v["status"], "scheduled");
        assert!(v.get("scheduledTime").is_some());
    }
}
