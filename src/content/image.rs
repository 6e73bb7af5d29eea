// src/content/image.rs
//! Image reference -> display URL.
//!
//! Total over its input: every path ends in a usable URL or `PLACEHOLDER_IMAGE`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::CmsConfig;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

// image-<id>-<width>x<height>-<format>
static RE_ASSET_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^image-(?P<id>[A-Za-z0-9]+)-(?P<dims>\d+x\d+)-(?P<format>[A-Za-z0-9]+)$")
        .expect("asset ref regex")
});

/// The shapes an image field arrives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Asset already dereferenced to an absolute URL.
    Resolved(String),
    /// Opaque `image-<id>-<w>x<h>-<fmt>` reference.
    Reference(String),
    /// Plain URL string.
    Url(String),
    Missing,
}

impl ImageRef {
    pub fn from_value(v: Option<&Value>) -> Self {
        match v {
            None | Some(Value::Null) => ImageRef::Missing,
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    ImageRef::Missing
                } else if RE_ASSET_REF.is_match(s) {
                    ImageRef::Reference(s.to_string())
                } else {
                    ImageRef::Url(s.to_string())
                }
            }
            Some(obj @ Value::Object(_)) => {
                let asset = obj.get("asset");
                let url = obj
                    .get("url")
                    .or_else(|| asset.and_then(|a| a.get("url")))
                    .and_then(Value::as_str)
                    .filter(|u| !u.trim().is_empty());
                if let Some(u) = url {
                    return ImageRef::Resolved(u.trim().to_string());
                }
                let reference = asset
                    .and_then(|a| a.get("_ref").or_else(|| a.get("_id")))
                    .or_else(|| obj.get("_ref"))
                    .and_then(Value::as_str)
                    .filter(|r| !r.trim().is_empty());
                match reference {
                    Some(r) => ImageRef::Reference(r.trim().to_string()),
                    None => ImageRef::Missing,
                }
            }
            Some(_) => ImageRef::Missing,
        }
    }
}

/// Optional CDN transforms, rendered as `w`, `h`, `fit=crop`, `q`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: bool,
    pub quality: Option<u8>,
}

impl ImageParams {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && !self.crop && self.quality.is_none()
    }

    fn query_string(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some(w) = self.width {
            parts.push(format!("w={w}"));
        }
        if let Some(h) = self.height {
            parts.push(format!("h={h}"));
        }
        if self.crop {
            parts.push("fit=crop".to_string());
        }
        if let Some(q) = self.quality {
            parts.push(format!("q={}", q.min(100)));
        }
        parts.join("&")
    }
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    project_id: Option<String>,
    dataset: Option<String>,
    cdn_host: String,
}

impl ImageResolver {
    pub fn new(cfg: &CmsConfig) -> Self {
        Self {
            project_id: cfg.project_id().map(str::to_string),
            dataset: cfg.dataset().map(str::to_string),
            cdn_host: cfg.image_cdn_host.clone(),
        }
    }

    pub fn resolve(&self, image: &ImageRef) -> String {
        self.resolve_with(image, &ImageParams::default())
    }

    pub fn resolve_value(&self, v: Option<&Value>) -> String {
        self.resolve(&ImageRef::from_value(v))
    }

    pub fn resolve_with(&self, image: &ImageRef, params: &ImageParams) -> String {
        match image {
            ImageRef::Resolved(url) if self.is_cdn_url(url) => with_params(url, params),
            ImageRef::Resolved(url) | ImageRef::Url(url) => url.clone(),
            ImageRef::Reference(r) => match self.cdn_url(r) {
                Some(url) => with_params(&url, params),
                None => {
                    tracing::debug!(target: "content", asset_ref = %r, "unresolvable image reference");
                    PLACEHOLDER_IMAGE.to_string()
                }
            },
            ImageRef::Missing => PLACEHOLDER_IMAGE.to_string(),
        }
    }

    /// `https://<host>/images/<project>/<dataset>/<id>-<dims>.<format>`
    fn cdn_url(&self, asset_ref: &str) -> Option<String> {
        let caps = RE_ASSET_REF.captures(asset_ref)?;
        let project = self.project_id.as_deref()?;
        let dataset = self.dataset.as_deref()?;
        Some(format!(
            "https://{}/images/{}/{}/{}-{}.{}",
            self.cdn_host, project, dataset, &caps["id"], &caps["dims"], &caps["format"]
        ))
    }

    fn is_cdn_url(&self, url: &str) -> bool {
        url.strip_prefix("https://")
            .is_some_and(|rest| rest.starts_with(&format!("{}/", self.cdn_host)))
    }
}

fn with_params(url: &str, params: &ImageParams) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{}", params.query_string())
}
