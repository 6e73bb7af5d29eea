// src/content/query.rs
//! Query executor: GROQ templates, cache hints and the document store seam.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::Value;

use crate::config::CmsConfig;
use crate::content::normalize::SourceShape;
use crate::error::RetrievalError;

pub type QueryParams = BTreeMap<String, Value>;

pub const TAG_ARTICLES: &str = "articles";
pub const TAG_FEATURED: &str = "featured-articles";
pub const TAG_LATEST: &str = "latest-articles";

const POST_PROJECTION: &str = r#"{
  _id, _createdAt, title, slug, publishedAt,
  image{ ..., asset->{ _id, url } },
  body, featured
}"#;

const ARTICLE_PROJECTION: &str = r#"{
  _id, _createdAt, title, slug, excerpt, content,
  featuredImage{ ..., asset->{ _id, url } },
  publishedAt,
  "author": coalesce(author->name, author),
  "category": coalesce(category->title, category),
  sportTags, featured
}"#;

fn projection(shape: SourceShape) -> &'static str {
    match shape {
        SourceShape::Post => POST_PROJECTION,
        SourceShape::Article => ARTICLE_PROJECTION,
    }
}

/// Tags + revalidation interval attached to a query for the outer cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHints {
    pub tags: Vec<String>,
    pub revalidate: Duration,
}

impl CacheHints {
    pub fn new<I, S>(tags: I, revalidate: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            revalidate,
        }
    }

    pub fn tags_header(&self) -> String {
        self.tags.join(",")
    }

    pub fn cache_control(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate",
            self.revalidate.as_secs()
        )
    }
}

/// Ordered-by-recency listing parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListSpec {
    pub limit: Option<usize>,
    pub featured_only: bool,
}

#[derive(Debug, Clone)]
pub struct CmsQuery {
    pub groq: String,
    pub params: QueryParams,
    /// Shape the projection returns; threaded into normalization.
    pub shape: SourceShape,
    pub hints: CacheHints,
}

impl CmsQuery {
    /// `*[_type == $type] | order(publishedAt desc) [0...N]`
    pub fn list(shape: SourceShape, spec: ListSpec, hints: CacheHints) -> Self {
        let filter = if spec.featured_only {
            "_type == $type && featured == true"
        } else {
            "_type == $type"
        };
        let slice = spec
            .limit
            .map(|n| format!(" [0...{n}]"))
            .unwrap_or_default();
        let groq = format!(
            "*[{filter}] | order(publishedAt desc){slice} {}",
            projection(shape)
        );
        let mut params = QueryParams::new();
        params.insert("type".into(), Value::from(shape.doc_type()));
        Self {
            groq,
            params,
            shape,
            hints,
        }
    }

    /// `*[_type == $type && (slug.current == $slug || slug == $slug)][0]`
    ///
    /// Matches both slug encodings the normalizer accepts.
    pub fn by_slug(shape: SourceShape, slug: &str, hints: CacheHints) -> Self {
        let groq = format!(
            "*[_type == $type && (slug.current == $slug || slug == $slug)][0] {}",
            projection(shape)
        );
        let mut params = QueryParams::new();
        params.insert("type".into(), Value::from(shape.doc_type()));
        params.insert("slug".into(), Value::from(slug));
        Self {
            groq,
            params,
            shape,
            hints,
        }
    }
}

/// Anything that can answer a GROQ query with a raw JSON result.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, groq: &str, params: &QueryParams) -> Result<Value, RetrievalError>;
    fn name(&self) -> &'static str;
}

/// Query HTTP API of the hosted store.
pub struct HttpDocumentStore {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpDocumentStore {
    pub fn new(cfg: &CmsConfig) -> anyhow::Result<Self> {
        let project = cfg
            .project_id()
            .context("cms project id is required for the http store")?;
        let dataset = cfg
            .dataset()
            .context("cms dataset is required for the http store")?;
        // The edge host never sees private drafts; authenticated reads go to the live API.
        let host = if cfg.use_cdn && cfg.token().is_none() {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let endpoint = format!(
            "https://{project}.{host}/v{}/data/query/{dataset}",
            cfg.api_version
        );
        let http = reqwest::Client::builder()
            .user_agent(concat!("parasport-news/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building cms http client")?;
        Ok(Self {
            http,
            endpoint,
            token: cfg.token().map(str::to_string),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self, groq: &str, params: &QueryParams) -> Result<Value, RetrievalError> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(params.len() + 1);
        pairs.push(("query".to_string(), groq.to_string()));
        for (name, value) in params {
            pairs.push((format!("${name}"), value.to_string()));
        }

        let mut req = self.http.get(&self.endpoint).query(&pairs);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                message: store_error_message(&body),
            });
        }
        let body: QueryResponse = resp.json().await?;
        Ok(body.result)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Pull the human-readable part out of a store error body.
fn store_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let described = parsed.as_ref().and_then(|v| {
        v.pointer("/error/description")
            .or_else(|| v.pointer("/error/message"))
            .or_else(|| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    described.unwrap_or_else(|| body.chars().take(200).collect())
}

/// Runs queries when the store is configured; otherwise answers empty.
#[derive(Clone)]
pub struct QueryExecutor {
    store: Option<Arc<dyn DocumentStore>>,
}

impl QueryExecutor {
    /// HTTP-backed executor. Unconfigured settings yield an inert executor.
    pub fn from_config(cfg: &CmsConfig) -> anyhow::Result<Self> {
        if !cfg.is_configured() {
            return Ok(Self::unconfigured());
        }
        let store = HttpDocumentStore::new(cfg)?;
        tracing::info!(target: "cms", endpoint = store.endpoint(), "cms query executor ready");
        Ok(Self {
            store: Some(Arc::new(store)),
        })
    }

    /// Custom store. The store is dropped when `cfg` is not configured.
    pub fn with_store(cfg: &CmsConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store: cfg.is_configured().then_some(store),
        }
    }

    pub fn unconfigured() -> Self {
        Self { store: None }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Single attempt. `null` is empty, an object is one document.
    pub async fn execute(&self, query: &CmsQuery) -> Result<Vec<Value>, RetrievalError> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };
        let doc_type = query.shape.doc_type();
        let t0 = Instant::now();
        let res = store.fetch(&query.groq, &query.params).await;
        histogram!("cms_query_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        match res {
            Ok(v) => {
                let docs = into_documents(v);
                counter!("cms_queries_total", "doc_type" => doc_type, "outcome" => "ok")
                    .increment(1);
                tracing::debug!(
                    target: "cms",
                    doc_type,
                    store = store.name(),
                    count = docs.len(),
                    tags = %query.hints.tags_header(),
                    "query ok"
                );
                Ok(docs)
            }
            Err(e) => {
                counter!("cms_queries_total", "doc_type" => doc_type, "outcome" => "error")
                    .increment(1);
                tracing::warn!(target: "cms", doc_type, store = store.name(), error = %e, "query failed");
                Err(e)
            }
        }
    }

    /// Configured and answering a trivial query.
    pub async fn ping(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store
            .fetch(r#"*[_type in ["post", "article"]][0]._id"#, &QueryParams::new())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(target: "cms", error = %e, "cms ping failed");
                false
            }
        }
    }
}

fn into_documents(v: Value) -> Vec<Value> {
    match v {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().filter(|d| !d.is_null()).collect(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recording {
        answer: Value,
        seen: Mutex<Vec<(String, QueryParams)>>,
    }

    #[async_trait]
    impl DocumentStore for Recording {
        async fn fetch(&self, groq: &str, params: &QueryParams) -> Result<Value, RetrievalError> {
            self.seen
                .lock()
                .unwrap()
                .push((groq.to_string(), params.clone()));
            Ok(self.answer.clone())
        }
        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct Failing;

    #[async_trait]
    impl DocumentStore for Failing {
        async fn fetch(&self, _: &str, _: &QueryParams) -> Result<Value, RetrievalError> {
            Err(RetrievalError::Transport("connection refused".into()))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn hints() -> CacheHints {
        CacheHints::new([TAG_ARTICLES], Duration::from_secs(60))
    }

    #[test]
    fn list_query_orders_and_limits() {
        let q = CmsQuery::list(
            SourceShape::Post,
            ListSpec {
                limit: Some(6),
                featured_only: false,
            },
            hints(),
        );
        assert!(q.groq.starts_with("*[_type == $type] | order(publishedAt desc) [0...6]"));
        assert_eq!(q.params.get("type"), Some(&json!("post")));

        let featured = CmsQuery::list(
            SourceShape::Article,
            ListSpec {
                limit: None,
                featured_only: true,
            },
            hints(),
        );
        assert!(featured.groq.contains("featured == true"));
        assert!(!featured.groq.contains("[0..."));
        assert!(featured.groq.contains("sportTags"));
    }

    #[test]
    fn slug_query_binds_variables_by_name() {
        let q = CmsQuery::by_slug(SourceShape::Article, "some-slug", hints());
        assert!(q.groq.contains("(slug.current == $slug || slug == $slug)"));
        assert_eq!(q.params.get("slug"), Some(&json!("some-slug")));
        assert_eq!(q.params.get("type"), Some(&json!("article")));
    }

    #[test]
    fn cache_headers() {
        let h = CacheHints::new([TAG_ARTICLES, TAG_LATEST], Duration::from_secs(60));
        assert_eq!(h.tags_header(), "articles,latest-articles");
        assert_eq!(h.cache_control(), "public, s-maxage=60, stale-while-revalidate");
    }

    #[tokio::test]
    async fn unconfigured_executor_never_touches_the_store() {
        let store = Arc::new(Recording {
            answer: json!([{"title": "x"}]),
            seen: Mutex::new(Vec::new()),
        });
        let exec = QueryExecutor::with_store(&CmsConfig::unconfigured(), store.clone());
        assert!(!exec.is_configured());
        let q = CmsQuery::by_slug(SourceShape::Post, "x", hints());
        assert!(exec.execute(&q).await.unwrap().is_empty());
        assert!(store.seen.lock().unwrap().is_empty());
        assert!(!exec.ping().await);
    }

    #[tokio::test]
    async fn result_shapes_become_document_lists() {
        let cfg = CmsConfig::new("p", "d");
        let q = CmsQuery::by_slug(SourceShape::Post, "x", hints());
        for (answer, expected) in [
            (Value::Null, 0usize),
            (json!({"title": "one"}), 1),
            (json!([{"title": "a"}, null, {"title": "b"}]), 2),
        ] {
            let store = Arc::new(Recording {
                answer,
                seen: Mutex::new(Vec::new()),
            });
            let exec = QueryExecutor::with_store(&cfg, store);
            assert_eq!(exec.execute(&q).await.unwrap().len(), expected);
        }
    }

    #[tokio::test]
    async fn store_errors_are_surfaced_not_swallowed() {
        let exec = QueryExecutor::with_store(&CmsConfig::new("p", "d"), Arc::new(Failing));
        let q = CmsQuery::by_slug(SourceShape::Post, "x", hints());
        let err = exec.execute(&q).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert!(!exec.ping().await);
    }

    #[test]
    fn http_store_picks_host_by_token() {
        let mut cfg = CmsConfig::new("proj1", "production");
        let cdn = HttpDocumentStore::new(&cfg).unwrap();
        assert_eq!(
            cdn.endpoint(),
            "https://proj1.apicdn.sanity.io/v2024-01-01/data/query/production"
        );
        cfg.token = Some("t".into());
        let live = HttpDocumentStore::new(&cfg).unwrap();
        assert!(live.endpoint().starts_with("https://proj1.api.sanity.io/"));
        assert!(HttpDocumentStore::new(&CmsConfig::unconfigured()).is_err());
    }

    #[test]
    fn store_error_message_prefers_description() {
        let body = r#"{"error":{"description":"param $slug referenced, but not provided","type":"queryParseError"}}"#;
        assert_eq!(
            store_error_message(body),
            "param $slug referenced, but not provided"
        );
        assert_eq!(store_error_message("plain failure"), "plain failure");
    }
}
