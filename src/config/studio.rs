// src/config/studio.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::trends::store::{clamp_page_size, MAX_PAGE_SIZE};

pub const ENV_CONFIG_PATH: &str = "STUDIO_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/studio.toml";
pub const ENV_TEXT_PROVIDER: &str = "STUDIO_TEXT_PROVIDER";
pub const ENV_PAGE_SIZE: &str = "STUDIO_PAGE_SIZE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub trends: TrendsConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// "mock" | "openai" (case-insensitive)
    #[serde(default = "default_text_provider")]
    pub text_provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default)]
    pub api_key: String,
}

fn default_text_provider() -> String {
    "mock".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            text_provider: default_text_provider(),
            model: None,
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl StudioConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: StudioConfig = toml::from_str(s).context("parsing studio config")?;
        cfg.normalized()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading studio config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $STUDIO_CONFIG_PATH
    /// 2) config/studio.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default().normalized()?
            }
        };
        base.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(p) = env::var(ENV_TEXT_PROVIDER) {
            if !p.trim().is_empty() {
                self.generation.text_provider = p;
            }
        }
        if let Ok(n) = env::var(ENV_PAGE_SIZE) {
            self.trends.page_size = n
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PAGE_SIZE} must be a number"))?;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        self.trends.page_size = clamp_page_size(self.trends.page_size);
        self.generation.text_provider = self.generation.text_provider.trim().to_lowercase();

        // Resolve api key if "ENV"
        if self.generation.api_key.trim().eq_ignore_ascii_case("env") {
            self.generation.api_key = match self.generation.text_provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow!("Missing OPENAI_API_KEY env var"))?,
                _ => String::new(),
            };
        }
        Ok(self)
    }
}
