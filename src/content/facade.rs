// src/content/facade.rs
//! Content access facade.
//!
//! Every operation tries the CMS first (posts, then articles) and falls back
//! to the built-in set when the CMS is unconfigured, empty, unreachable or
//! only returns unusable documents. Only a slug that matches nothing at all
//! reaches the caller as an error.

use std::collections::HashSet;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde_json::Value;

use crate::config::CmsConfig;
use crate::content::fallback::{fallback_by_slug, list_fallback};
use crate::content::image::ImageResolver;
use crate::content::model::ArticleViewModel;
use crate::content::normalize::{normalize_value, SourceShape};
use crate::content::query::{
    CacheHints, CmsQuery, ListSpec, QueryExecutor, TAG_ARTICLES, TAG_FEATURED, TAG_LATEST,
};
use crate::error::{ContentError, ValidationError};

pub const FEATURED_LIMIT: usize = 2;
pub const LATEST_LIMIT: usize = 6;

/// Post is the historical type; article is tried only when posts yield nothing.
const SHAPE_PRECEDENCE: [SourceShape; 2] = [SourceShape::Post, SourceShape::Article];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Cms,
    Fallback,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Cms => "cms",
            Origin::Fallback => "fallback",
        }
    }
}

/// A result plus where it came from and how long it may be cached.
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: Origin,
    pub hints: CacheHints,
}

impl<T> Sourced<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            origin: self.origin,
            hints: self.hints,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListOp {
    All,
    Featured,
    Latest,
}

impl ListOp {
    fn name(self) -> &'static str {
        match self {
            ListOp::All => "list_all",
            ListOp::Featured => "list_featured",
            ListOp::Latest => "list_latest",
        }
    }

    fn spec(self) -> ListSpec {
        match self {
            ListOp::All => ListSpec::default(),
            ListOp::Featured => ListSpec {
                limit: Some(FEATURED_LIMIT),
                featured_only: true,
            },
            ListOp::Latest => ListSpec {
                limit: Some(LATEST_LIMIT),
                featured_only: false,
            },
        }
    }

    fn hints(self, revalidate: Duration) -> CacheHints {
        match self {
            ListOp::All => CacheHints::new([TAG_ARTICLES], revalidate),
            ListOp::Featured => CacheHints::new([TAG_ARTICLES, TAG_FEATURED], revalidate),
            ListOp::Latest => CacheHints::new([TAG_ARTICLES, TAG_LATEST], revalidate),
        }
    }

    fn fallback(self) -> Vec<ArticleViewModel> {
        let all = list_fallback();
        let n = match self.spec().limit {
            Some(limit) => limit.min(all.len()),
            None => all.len(),
        };
        all[..n].to_vec()
    }
}

fn reason_of(err: &ContentError) -> &'static str {
    match err {
        ContentError::Retrieval(_) => "retrieval",
        ContentError::Validation(_) => "validation",
        ContentError::NotFound { .. } => "empty",
    }
}

#[derive(Clone)]
pub struct ContentService {
    executor: QueryExecutor,
    images: ImageResolver,
    revalidate: Duration,
}

impl ContentService {
    pub fn new(cfg: &CmsConfig, executor: QueryExecutor) -> Self {
        Self {
            executor,
            images: ImageResolver::new(cfg),
            revalidate: Duration::from_secs(cfg.revalidate_secs),
        }
    }

    /// HTTP-backed service built from settings.
    pub fn from_config(cfg: &CmsConfig) -> anyhow::Result<Self> {
        Ok(Self::new(cfg, QueryExecutor::from_config(cfg)?))
    }

    pub fn is_configured(&self) -> bool {
        self.executor.is_configured()
    }

    pub async fn cms_reachable(&self) -> bool {
        self.executor.ping().await
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    pub async fn list_all(&self) -> Sourced<Vec<ArticleViewModel>> {
        self.list(ListOp::All).await
    }

    pub async fn list_featured(&self) -> Sourced<Vec<ArticleViewModel>> {
        self.list(ListOp::Featured).await
    }

    pub async fn list_latest(&self) -> Sourced<Vec<ArticleViewModel>> {
        self.list(ListOp::Latest).await
    }

    /// `list_all` narrowed to one sport tag slug.
    pub async fn list_by_sport(&self, sport: &str) -> Sourced<Vec<ArticleViewModel>> {
        let sport = sport.trim().to_ascii_lowercase();
        self.list_all()
            .await
            .map(|all| all.into_iter().filter(|a| a.has_sport(&sport)).collect())
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Sourced<ArticleViewModel>, ContentError> {
        let hints = CacheHints::new(
            [TAG_ARTICLES.to_string(), format!("article:{slug}")],
            self.revalidate,
        );

        if self.executor.is_configured() {
            match self.cms_by_slug(slug, &hints).await {
                Ok(Some(article)) => {
                    counter!("content_requests_total", "op" => "get_by_slug", "origin" => "cms")
                        .increment(1);
                    return Ok(Sourced {
                        value: article,
                        origin: Origin::Cms,
                        hints,
                    });
                }
                Ok(None) => self.note_fallback("get_by_slug", "empty"),
                Err(e) => {
                    tracing::warn!(target: "content", op = "get_by_slug", %slug, error = %e, "cms lookup failed");
                    self.note_fallback("get_by_slug", reason_of(&e));
                }
            }
        } else {
            self.note_fallback("get_by_slug", "not_configured");
        }

        counter!("content_requests_total", "op" => "get_by_slug", "origin" => "fallback")
            .increment(1);
        fallback_by_slug(slug)
            .cloned()
            .map(|value| Sourced {
                value,
                origin: Origin::Fallback,
                hints,
            })
            .ok_or_else(|| ContentError::NotFound {
                slug: slug.to_string(),
            })
    }

    async fn list(&self, op: ListOp) -> Sourced<Vec<ArticleViewModel>> {
        let hints = op.hints(self.revalidate);

        if self.executor.is_configured() {
            match self.cms_list(op.spec(), &hints).await {
                Ok(articles) if !articles.is_empty() => {
                    counter!("content_requests_total", "op" => op.name(), "origin" => "cms")
                        .increment(1);
                    return Sourced {
                        value: articles,
                        origin: Origin::Cms,
                        hints,
                    };
                }
                Ok(_) => self.note_fallback(op.name(), "empty"),
                Err(e) => {
                    tracing::warn!(target: "content", op = op.name(), error = %e, "cms listing failed");
                    self.note_fallback(op.name(), reason_of(&e));
                }
            }
        } else {
            self.note_fallback(op.name(), "not_configured");
        }

        counter!("content_requests_total", "op" => op.name(), "origin" => "fallback").increment(1);
        Sourced {
            value: op.fallback(),
            origin: Origin::Fallback,
            hints,
        }
    }

    /// Ok(empty) = nothing stored; Err(Validation) = only unusable documents.
    async fn cms_list(
        &self,
        spec: ListSpec,
        hints: &CacheHints,
    ) -> Result<Vec<ArticleViewModel>, ContentError> {
        let mut rejected: Option<ValidationError> = None;
        for shape in SHAPE_PRECEDENCE {
            let query = CmsQuery::list(shape, spec, hints.clone());
            let docs = self.executor.execute(&query).await?;
            let (articles, invalid) = self.normalize_batch(docs, shape);
            if !articles.is_empty() {
                return Ok(dedup_by_slug(articles));
            }
            rejected = invalid.or(rejected);
        }
        match rejected {
            Some(e) => Err(e.into()),
            None => Ok(Vec::new()),
        }
    }

    async fn cms_by_slug(
        &self,
        slug: &str,
        hints: &CacheHints,
    ) -> Result<Option<ArticleViewModel>, ContentError> {
        let mut rejected: Option<ValidationError> = None;
        for shape in SHAPE_PRECEDENCE {
            let query = CmsQuery::by_slug(shape, slug, hints.clone());
            let docs = self.executor.execute(&query).await?;
            let (mut articles, invalid) = self.normalize_batch(docs, shape);
            if !articles.is_empty() {
                return Ok(Some(articles.swap_remove(0)));
            }
            rejected = invalid.or(rejected);
        }
        match rejected {
            Some(e) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// Invalid documents are logged and skipped; the last error is kept.
    fn normalize_batch(
        &self,
        docs: Vec<Value>,
        shape: SourceShape,
    ) -> (Vec<ArticleViewModel>, Option<ValidationError>) {
        let mut out = Vec::with_capacity(docs.len());
        let mut last_err = None;
        for doc in docs {
            let id = doc
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>")
                .to_string();
            match normalize_value(doc, shape, &self.images) {
                Ok(a) => out.push(a),
                Err(e) => {
                    tracing::warn!(target: "content", doc_type = shape.doc_type(), %id, error = %e, "skipping document");
                    counter!("content_invalid_documents_total", "doc_type" => shape.doc_type())
                        .increment(1);
                    last_err = Some(e);
                }
            }
        }
        (out, last_err)
    }

    fn note_fallback(&self, op: &'static str, reason: &'static str) {
        tracing::info!(target: "content", op, reason, "serving fallback content");
        counter!("content_fallbacks_total", "op" => op, "reason" => reason).increment(1);
    }
}

/// First occurrence of each slug wins.
fn dedup_by_slug(articles: Vec<ArticleViewModel>) -> Vec<ArticleViewModel> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| seen.insert(a.slug.clone()))
        .collect()
}
