// src/config/cms.rs
//! CMS connection settings.
//!
//! Built once at startup and shared read-only by the query executor, the
//! image resolver and the HTTP layer. Sources, lowest priority first:
//! 1) `$CMS_CONFIG_PATH` or `config/cms.toml` (optional)
//! 2) `CMS_*` environment variables

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

pub const DEFAULT_CMS_CONFIG_PATH: &str = "config/cms.toml";
pub const ENV_CMS_CONFIG_PATH: &str = "CMS_CONFIG_PATH";

pub const ENV_PROJECT_ID: &str = "CMS_PROJECT_ID";
pub const ENV_DATASET: &str = "CMS_DATASET";
pub const ENV_API_VERSION: &str = "CMS_API_VERSION";
pub const ENV_TOKEN: &str = "CMS_TOKEN";
pub const ENV_USE_CDN: &str = "CMS_USE_CDN";
pub const ENV_IMAGE_CDN_HOST: &str = "CMS_IMAGE_CDN_HOST";
pub const ENV_REVALIDATE_SECS: &str = "CMS_REVALIDATE_SECS";

fn default_api_version() -> String {
    "2024-01-01".to_string()
}
fn default_use_cdn() -> bool {
    true
}
fn default_image_cdn_host() -> String {
    "cdn.sanity.io".to_string()
}
fn default_revalidate_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsConfig {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Read token. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Query the edge API host. Ignored when a token is set.
    #[serde(default = "default_use_cdn")]
    pub use_cdn: bool,
    #[serde(default = "default_image_cdn_host")]
    pub image_cdn_host: String,
    /// Revalidation interval attached to every query's cache hints.
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: None,
            api_version: default_api_version(),
            token: None,
            use_cdn: default_use_cdn(),
            image_cdn_host: default_image_cdn_host(),
            revalidate_secs: default_revalidate_secs(),
        }
    }
}

impl CmsConfig {
    /// Convenience constructor for a configured project.
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            dataset: Some(dataset.into()),
            ..Self::default()
        }
    }

    /// An explicitly unconfigured instance; every CMS path short-circuits.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn with_image_cdn_host(mut self, host: impl Into<String>) -> Self {
        self.image_cdn_host = host.into();
        self
    }

    /// Non-empty project id AND non-empty dataset.
    pub fn is_configured(&self) -> bool {
        self.project_id().is_some() && self.dataset().is_some()
    }

    pub fn project_id(&self) -> Option<&str> {
        non_blank(self.project_id.as_deref())
    }

    pub fn dataset(&self) -> Option<&str> {
        non_blank(self.dataset.as_deref())
    }

    pub fn token(&self) -> Option<&str> {
        non_blank(self.token.as_deref())
    }

    /// Parse a TOML file into a config (missing keys take defaults).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading cms config from {}", path.display()))?;
        let cfg: CmsConfig = toml::from_str(&data)
            .with_context(|| format!("parsing cms config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// File (if any) + environment overrides.
    pub fn load() -> Result<Self> {
        let base = match env::var(ENV_CMS_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!("{ENV_CMS_CONFIG_PATH} points to non-existent path"));
                }
                Self::load_from_file(&pb)?
            }
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CMS_CONFIG_PATH);
                if default_path.exists() {
                    Self::load_from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(base.apply_env())
    }

    /// Environment only; never fails. Used by tests and tooling.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    fn apply_env(mut self) -> Self {
        if let Some(v) = env_non_blank(ENV_PROJECT_ID) {
            self.project_id = Some(v);
        }
        if let Some(v) = env_non_blank(ENV_DATASET) {
            self.dataset = Some(v);
        }
        if let Some(v) = env_non_blank(ENV_API_VERSION) {
            self.api_version = v;
        }
        if let Some(v) = env_non_blank(ENV_TOKEN) {
            self.token = Some(v);
        }
        if let Some(v) = env_non_blank(ENV_USE_CDN) {
            self.use_cdn = parse_flag(&v).unwrap_or(self.use_cdn);
        }
        if let Some(v) = env_non_blank(ENV_IMAGE_CDN_HOST) {
            self.image_cdn_host = v;
        }
        if let Some(v) = env_non_blank(ENV_REVALIDATE_SECS) {
            if let Ok(secs) = v.parse::<u64>() {
                self.revalidate_secs = secs;
            }
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        self.api_version = self.api_version.trim().trim_start_matches('v').to_string();
        if self.api_version.is_empty() {
            self.api_version = default_api_version();
        }
        self.image_cdn_host = self
            .image_cdn_host
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();
        if self.image_cdn_host.is_empty() {
            self.image_cdn_host = default_image_cdn_host();
        }
        self
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn env_non_blank(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
