// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::config::{env_flag, site::ENV_DEBUG_ROUTES, CmsConfig, SiteConfig};
use crate::content::{ArticleViewModel, ContentService, SportTag, Sourced};
use crate::error::ContentError;
use crate::feed;

#[derive(Clone)]
pub struct AppState {
    pub content: ContentService,
    pub cms: Arc<CmsConfig>,
    pub site: Arc<SiteConfig>,
    /// Mounts `/api/cms/health`.
    pub debug_routes: bool,
}

impl AppState {
    pub fn new(cms: CmsConfig, content: ContentService, site: SiteConfig) -> Self {
        Self {
            content,
            cms: Arc::new(cms),
            site: Arc::new(site),
            debug_routes: false,
        }
    }

    /// HTTP-backed content service; `DEBUG_ROUTES` decides the diagnostics route.
    pub fn from_config(cms: CmsConfig, site: SiteConfig) -> anyhow::Result<Self> {
        let content = ContentService::from_config(&cms)?;
        Ok(Self::new(cms, content, site).with_debug_routes(env_flag(ENV_DEBUG_ROUTES)))
    }

    pub fn with_debug_routes(mut self, on: bool) -> Self {
        self.debug_routes = on;
        self
    }
}

pub fn router(state: AppState) -> Router {
    let mut r = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/articles", get(list_all))
        .route("/api/articles/featured", get(list_featured))
        .route("/api/articles/latest", get(list_latest))
        .route("/api/articles/{slug}", get(article_by_slug))
        .route("/api/sports/{sport}/articles", get(sport_articles))
        .route("/feed.xml", get(rss_feed));

    if state.debug_routes {
        r = r.route("/api/cms/health", get(cms_health));
    }

    r.layer(CorsLayer::very_permissive()).with_state(state)
}

/// JSON body plus origin and cache headers.
fn sourced_json<T: Serialize>(sourced: Sourced<T>) -> Response {
    let headers = [
        ("x-content-source", sourced.origin.as_str().to_string()),
        ("cache-control", sourced.hints.cache_control()),
        ("x-cache-tags", sourced.hints.tags_header()),
    ];
    (headers, Json(sourced.value)).into_response()
}

async fn list_all(State(state): State<AppState>) -> Response {
    sourced_json(state.content.list_all().await)
}

async fn list_featured(State(state): State<AppState>) -> Response {
    sourced_json(state.content.list_featured().await)
}

async fn list_latest(State(state): State<AppState>) -> Response {
    sourced_json(state.content.list_latest().await)
}

async fn article_by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.content.get_by_slug(&slug).await {
        Ok(found) => sourced_json(found),
        Err(ContentError::NotFound { slug }) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "slug": slug })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = %e, "unexpected content error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal" })),
            )
                .into_response()
        }
    }
}

#[derive(Serialize)]
struct SportArticles {
    sport: SportTag,
    articles: Vec<ArticleViewModel>,
}

async fn sport_articles(State(state): State<AppState>, Path(sport): Path<String>) -> Response {
    let tag = SportTag::from_slug(&sport.to_ascii_lowercase());
    let found = state.content.list_by_sport(&tag.slug).await;
    sourced_json(found.map(|articles| SportArticles {
        sport: tag,
        articles,
    }))
}

async fn rss_feed(State(state): State<AppState>) -> Response {
    let latest = state.content.list_latest().await;
    match feed::render_rss(&latest.value, &state.site) {
        Ok(xml) => (
            [
                ("content-type", "application/rss+xml; charset=utf-8".to_string()),
                ("x-content-source", latest.origin.as_str().to_string()),
                ("cache-control", latest.hints.cache_control()),
            ],
            xml,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = ?e, "rss render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "feed unavailable").into_response()
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CmsHealth {
    configured: bool,
    reachable: bool,
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: String,
}

async fn cms_health(State(state): State<AppState>) -> Json<CmsHealth> {
    Json(CmsHealth {
        configured: state.content.is_configured(),
        reachable: state.content.cms_reachable().await,
        project_id: state.cms.project_id().map(str::to_string),
        dataset: state.cms.dataset().map(str::to_string),
        api_version: state.cms.api_version.clone(),
    })
}
