// src/config/mod.rs
pub mod studio;

pub use studio::{GenerationConfig, MetricsConfig, StudioConfig, TrendsConfig};
