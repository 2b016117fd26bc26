// src/settings.rs
//! Dashboard settings with shallow-merge updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub auto_post: bool,
    /// Minutes between now and a newly scheduled post.
    pub posting_interval: u32,
    pub default_language: String,
    pub default_tone: String,
    pub platforms: BTreeMap<String, bool>,
    pub email_notifications: bool,
    pub trend_alerts: bool,
    pub posting_errors: bool,
    /// Keys the dashboard sent that have no typed field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let platforms = [
            ("facebook", true),
            ("instagram", true),
            ("twitter", true),
            ("youtube", false),
            ("pinterest", true),
            ("threads", true),
            ("linkedin", false),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            auto_post: true,
            posting_interval: 120,
            default_language: "en".to_string(),
            default_tone: "professional".to_string(),
            platforms,
            email_notifications: true,
            trend_alerts: true,
            posting_errors: true,
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Overwrite every top-level key present in `patch`; nested objects are
    /// replaced whole, not merged. The result must still be well-typed.
    pub fn merged_with(&self, patch: Value) -> Result<Self, ApiError> {
        let Value::Object(patch) = patch else {
            return Err(ApiError::BadRequest(
                "settings must be a JSON object".to_string(),
            ));
        };

        let mut current = match serde_json::to_value(self) {
            Ok(Value::Object(m)) => m,
            _ => return Err(ApiError::Internal("Failed to save settings".to_string())),
        };
        for (k, v) in patch {
            current.insert(k, v);
        }

        serde_json::from_value(Value::Object(current))
            .map_err(|e| ApiError::BadRequest(format!("invalid settings: {e}")))
    }
}
