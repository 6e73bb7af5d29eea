// tests/common/mod.rs
// Shared stubs for integration tests: an in-memory document store and router builders.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use parasport_news::content::{DocumentStore, QueryExecutor, QueryParams};
use parasport_news::{api, AppState, CmsConfig, ContentService, RetrievalError, SiteConfig};
use serde_json::Value;

pub const BODY_LIMIT: usize = 1024 * 1024;

/// What the stub answers for one document type.
#[derive(Clone)]
pub enum Answer {
    Docs(Value),
    Fail(&'static str),
}

/// Answers queries by the `$type` variable and counts calls.
/// A `$slug` variable narrows an array answer to its first match, or `null`.
pub struct StubStore {
    pub post: Answer,
    pub article: Answer,
    pub calls: AtomicUsize,
}

impl StubStore {
    pub fn new(post: Answer, article: Answer) -> Arc<Self> {
        Arc::new(Self {
            post,
            article,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(
            Answer::Docs(Value::Array(vec![])),
            Answer::Docs(Value::Array(vec![])),
        )
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Answer::Fail("connection reset"), Answer::Fail("connection reset"))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for StubStore {
    async fn fetch(&self, _groq: &str, params: &QueryParams) -> Result<Value, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = match params.get("type").and_then(Value::as_str) {
            Some("post") => &self.post,
            _ => &self.article,
        };
        match (answer, params.get("slug").and_then(Value::as_str)) {
            (Answer::Docs(Value::Array(docs)), Some(slug)) => Ok(docs
                .iter()
                .find(|d| slug_matches(d, slug))
                .cloned()
                .unwrap_or(Value::Null)),
            (Answer::Docs(v), _) => Ok(v.clone()),
            (Answer::Fail(msg), _) => Err(RetrievalError::Transport(msg.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// `slug.current == $slug || slug == $slug`
fn slug_matches(doc: &Value, slug: &str) -> bool {
    doc.get("slug")
        .map(|s| s.get("current").unwrap_or(s))
        .and_then(Value::as_str)
        == Some(slug)
}

pub fn configured() -> CmsConfig {
    CmsConfig::new("proj1", "production").with_image_cdn_host("cdn.example.com")
}

pub fn service_with(store: Arc<StubStore>) -> ContentService {
    let cfg = configured();
    ContentService::new(&cfg, QueryExecutor::with_store(&cfg, store))
}

pub fn unconfigured_service() -> ContentService {
    ContentService::new(&CmsConfig::unconfigured(), QueryExecutor::unconfigured())
}

pub fn router_with(store: Arc<StubStore>) -> Router {
    let cfg = configured();
    let content = ContentService::new(&cfg, QueryExecutor::with_store(&cfg, store));
    api::router(AppState::new(cfg, content, SiteConfig::default()).with_debug_routes(true))
}

pub fn unconfigured_router() -> Router {
    api::router(AppState::new(
        CmsConfig::unconfigured(),
        unconfigured_service(),
        SiteConfig::default(),
    ))
}
