// src/analytics.rs
//! Fabricated dashboard analytics. Only `totalPosts` is real; every other
//! number is drawn from a fixed range.

use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub stats: Stats,
    pub posts_by_platform: Vec<PlatformPosts>,
    pub weekly_activity: Vec<DayActivity>,
    pub top_trends: Vec<TrendEngagement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_posts: usize,
    pub total_impressions: u32,
    pub total_engagement: u32,
    pub avg_engagement_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformPosts {
    pub platform: &'static str,
    pub posts: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayActivity {
    pub day: &'static str,
    pub posts: u32,
    pub engagement: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendEngagement {
    pub trend: &'static str,
    pub posts: u32,
    pub engagement: u32,
}

pub trait AnalyticsProvider: Send + Sync {
    /// `posted` is the number of posts actually marked as posted.
    fn report(&self, posted: usize) -> AnalyticsReport;
    fn name(&self) -> &'static str;
}

/// (platform, base, spread, color): posts in `base..base + spread`.
const PLATFORMS: [(&str, u32, u32, &str); 6] = [
    ("Facebook", 10, 30, "#1877F2"),
    ("Instagram", 15, 40, "#E4405F"),
    ("Twitter", 20, 50, "#1DA1F2"),
    ("YouTube", 5, 20, "#FF0000"),
    ("Pinterest", 8, 25, "#E60023"),
    ("Threads", 12, 35, "#000000"),
];

/// (day, posts base, posts spread, engagement base, engagement spread)
const WEEK: [(&str, u32, u32, u32, u32); 7] = [
    ("Mon", 5, 15, 100, 300),
    ("Tue", 7, 18, 150, 350),
    ("Wed", 8, 20, 200, 400),
    ("Thu", 6, 17, 130, 320),
    ("Fri", 10, 22, 250, 450),
    ("Sat", 8, 19, 180, 370),
    ("Sun", 6, 16, 140, 310),
];

const TOP_TRENDS: [(&str, u32, u32); 5] = [
    ("AI Technology", 15, 1250),
    ("Climate Change", 12, 980),
    ("Space Exploration", 10, 875),
    ("Health & Fitness", 14, 1100),
    ("Gaming News", 11, 920),
];

pub struct MockAnalytics;

impl MockAnalytics {
    pub fn report_with<R: Rng>(rng: &mut R, posted: usize) -> AnalyticsReport {
        let avg_engagement_rate = rng.random_range(2.0..7.0);
        let mut spread = |base: u32, n: u32| base + rng.random_range(0..n);

        let stats = Stats {
            total_posts: posted,
            total_impressions: spread(10_000, 50_000),
            total_engagement: spread(1_000, 5_000),
            avg_engagement_rate,
        };

        let posts_by_platform = PLATFORMS
            .iter()
            .map(|&(platform, base, n, color)| PlatformPosts {
                platform,
                posts: spread(base, n),
                color,
            })
            .collect();

        let weekly_activity = WEEK
            .iter()
            .map(|&(day, pb, pn, eb, en)| DayActivity {
                day,
                posts: spread(pb, pn),
                engagement: spread(eb, en),
            })
            .collect();

        let top_trends = TOP_TRENDS
            .iter()
            .map(|&(trend, posts, engagement)| TrendEngagement {
                trend,
                posts,
                engagement,
            })
            .collect();

        AnalyticsReport {
            stats,
            posts_by_platform,
            weekly_activity,
            top_trends,
        }
    }
}

impl AnalyticsProvider for MockAnalytics {
    fn report(&self, posted: usize) -> AnalyticsReport {
        Self::report_with(&mut rand::rng(), posted)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_stay_in_their_ranges() {
        for _ in 0..20 {
            let r = MockAnalytics.report(3);
            assert_eq!(r.stats.total_posts, 3);
            assert!((10_000..60_000).contains(&r.stats.total_impressions));
            assert!((1_000..6_000).contains(&r.stats.total_engagement));
            assert!((2.0..7.0).contains(&r.stats.avg_engagement_rate));

            assert_eq!(r.posts_by_platform.len(), 6);
            let yt = &r.posts_by_platform[3];
            assert_eq!(yt.platform, "YouTube");
            assert!((5..25).contains(&yt.posts));

            assert_eq!(r.weekly_activity.len(), 7);
            let fri = &r.weekly_activity[4];
            assert!((10..32).contains(&fri.posts));
            assert!((250..700).contains(&fri.engagement));
        }
    }

    #[test]
    fn top_trends_are_fixed() {
        let r = MockAnalytics.report(0);
        assert_eq!(r.top_trends[0].trend, "AI Technology");
        assert_eq!(r.top_trends[0].engagement, 1250);
    }

    #[test]
    fn mock_provider_reports_its_name() {
        let provider: &dyn AnalyticsProvider = &MockAnalytics;
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn serializes_camel_case() {
        let v = serde_json::to_value(MockAnalytics.report(1)).unwrap();
        assert!(v["stats"].get("avgEngagementRate").is_some());
        assert!(v.get("postsByPlatform").is_some());
        assert!(v.get("weeklyActivity").is_some());
    }
}
