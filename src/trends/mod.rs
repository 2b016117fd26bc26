// src/trends/mod.rs
pub mod pipeline;
pub mod sources;
pub mod store;

pub use pipeline::{TrendPipeline, TrendQuery};
pub use sources::{TrendCandidate, TrendSource};
pub use store::{Approval, TrendRecord, TrendStore};

use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("trends_refresh_total", "Fetch-and-merge cycles started.");
        describe_counter!(
            "trends_refresh_errors_total",
            "Cycles aborted because a source failed."
        );
        describe_counter!("trends_inserted_total", "New trends merged into the store.");
        describe_counter!(
            "trends_duplicates_total",
            "Candidates dropped because their title was already stored."
        );
        describe_counter!("trend_approvals_total", "Approval decisions received.");
        describe_gauge!("trends_store_size", "Records currently held by the trend store.");
    });
}
