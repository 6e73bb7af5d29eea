// src/config/site.rs
use serde::{Deserialize, Serialize};

pub const ENV_SITE_URL: &str = "SITE_URL";
pub const ENV_SITE_TITLE: &str = "SITE_TITLE";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";

/// Public-facing site identity, used for absolute links in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    pub base_url: String,
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "ParaSport News".to_string(),
            base_url: "http://localhost:8000".to_string(),
            description: "News, results and features from the world of disability sport."
                .to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(url) = env_non_blank(ENV_SITE_URL) {
            cfg.base_url = url;
        }
        if let Some(title) = env_non_blank(ENV_SITE_TITLE) {
            cfg.title = title;
        }
        cfg.base_url = cfg.base_url.trim_end_matches('/').to_string();
        cfg
    }

    pub fn article_url(&self, slug: &str) -> String {
        format!("{}/news/{}", self.base_url.trim_end_matches('/'), slug)
    }
}

/// `1` / `true` style switches.
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_non_blank(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
