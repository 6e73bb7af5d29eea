// src/content/normalize.rs
//! Post / article documents -> `ArticleViewModel`.
//!
//! The shape is always known from the query that produced the document;
//! nothing here guesses it from field presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::image::ImageResolver;
use crate::content::model::{
    excerpt_from_text, shape_checked_blocks, synthesize_excerpt, ArticleViewModel,
    SportTag, DEFAULT_AUTHOR, DEFAULT_CATEGORY, EXCERPT_MAX_CHARS,
};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceShape {
    Post,
    Article,
}

impl SourceShape {
    /// Document `_type` in the store.
    pub fn doc_type(self) -> &'static str {
        match self {
            SourceShape::Post => "post",
            SourceShape::Article => "article",
        }
    }
}

/// Legacy `post` documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(rename = "_createdAt")]
    pub created_at: Option<String>,
    pub title: Option<String>,
    pub slug: Option<Value>,
    pub published_at: Option<String>,
    pub image: Option<Value>,
    pub body: Option<Value>,
    pub featured: Option<bool>,
}

/// Editorial `article` documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleDocument {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(rename = "_createdAt")]
    pub created_at: Option<String>,
    pub title: Option<String>,
    pub slug: Option<Value>,
    pub excerpt: Option<String>,
    pub content: Option<Value>,
    pub featured_image: Option<Value>,
    pub published_at: Option<String>,
    pub author: Option<Value>,
    pub category: Option<Value>,
    pub sport_tags: Option<Value>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub enum RawDocument {
    Post(PostDocument),
    Article(ArticleDocument),
}

impl RawDocument {
    pub fn from_value(shape: SourceShape, v: Value) -> Result<Self, ValidationError> {
        if !v.is_object() {
            return Err(ValidationError::NotAnObject);
        }
        let malformed = |e: serde_json::Error| ValidationError::Malformed(e.to_string());
        Ok(match shape {
            SourceShape::Post => RawDocument::Post(serde_json::from_value(v).map_err(malformed)?),
            SourceShape::Article => {
                RawDocument::Article(serde_json::from_value(v).map_err(malformed)?)
            }
        })
    }

    pub fn shape(&self) -> SourceShape {
        match self {
            RawDocument::Post(_) => SourceShape::Post,
            RawDocument::Article(_) => SourceShape::Article,
        }
    }
}

pub fn normalize_value(
    v: Value,
    shape: SourceShape,
    images: &ImageResolver,
) -> Result<ArticleViewModel, ValidationError> {
    normalize(RawDocument::from_value(shape, v)?, images)
}

pub fn normalize(
    raw: RawDocument,
    images: &ImageResolver,
) -> Result<ArticleViewModel, ValidationError> {
    match raw {
        RawDocument::Post(p) => normalize_post(p, images),
        RawDocument::Article(a) => normalize_article(a, images),
    }
}

fn normalize_post(
    p: PostDocument,
    images: &ImageResolver,
) -> Result<ArticleViewModel, ValidationError> {
    let title = required_title(p.title.as_deref(), p.id.as_deref())?;
    let slug = required_slug(p.slug.as_ref(), p.id.as_deref())?;
    let content = shape_checked_blocks(p.body.as_ref());
    let excerpt = synthesize_excerpt(&content);

    Ok(ArticleViewModel {
        id: non_blank(p.id).unwrap_or_else(|| slug.clone()),
        title,
        excerpt,
        content,
        featured_image: images.resolve_value(p.image.as_ref()),
        published_at: published_at(p.published_at.as_deref(), p.created_at.as_deref()),
        author: DEFAULT_AUTHOR.to_string(),
        category: DEFAULT_CATEGORY.to_string(),
        sport_tags: Vec::new(),
        slug,
        featured: p.featured.unwrap_or(false),
    })
}

fn normalize_article(
    a: ArticleDocument,
    images: &ImageResolver,
) -> Result<ArticleViewModel, ValidationError> {
    let title = required_title(a.title.as_deref(), a.id.as_deref())?;
    let slug = required_slug(a.slug.as_ref(), a.id.as_deref())?;
    let content = shape_checked_blocks(a.content.as_ref());
    let excerpt = non_blank(a.excerpt)
        .and_then(|e| {
            if e.chars().count() <= EXCERPT_MAX_CHARS {
                Some(e)
            } else {
                excerpt_from_text(&e)
            }
        })
        .unwrap_or_else(|| synthesize_excerpt(&content));

    Ok(ArticleViewModel {
        id: non_blank(a.id).unwrap_or_else(|| slug.clone()),
        title,
        excerpt,
        content,
        featured_image: images.resolve_value(a.featured_image.as_ref()),
        published_at: published_at(a.published_at.as_deref(), a.created_at.as_deref()),
        author: display_field(a.author.as_ref(), "name")
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        category: display_field(a.category.as_ref(), "title")
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        sport_tags: sport_tags(a.sport_tags.as_ref()),
        slug,
        featured: a.featured.unwrap_or(false),
    })
}

fn required_title(title: Option<&str>, id: Option<&str>) -> Result<String, ValidationError> {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::MissingTitle {
            id: id.unwrap_or("<unknown>").to_string(),
        })
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `{current: "x"}` or `"x"`. The slug query matches exactly these two forms.
fn required_slug(slug: Option<&Value>, id: Option<&str>) -> Result<String, ValidationError> {
    slug.and_then(|s| s.get("current").unwrap_or(s).as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::MissingSlug {
            id: id.unwrap_or("<unknown>").to_string(),
        })
}

fn published_at(primary: Option<&str>, created: Option<&str>) -> DateTime<Utc> {
    [primary, created]
        .into_iter()
        .flatten()
        .find_map(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Plain string, or an object carrying `key` (dereferenced author/category).
fn display_field(v: Option<&Value>, key: &str) -> Option<String> {
    let s = match v? {
        Value::String(s) => s.as_str(),
        obj @ Value::Object(_) => obj.get(key)?.as_str()?,
        _ => return None,
    };
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn sport_tags(v: Option<&Value>) -> Vec<SportTag> {
    let Some(Value::Array(items)) = v else {
        return Vec::new();
    };
    let mut out: Vec<SportTag> = Vec::with_capacity(items.len());
    for item in items {
        let raw = match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => item
                .get("value")
                .or_else(|| item.get("current"))
                .and_then(Value::as_str),
            _ => None,
        };
        let Some(slug) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        if out.iter().any(|t| t.slug == slug) {
            continue;
        }
        out.push(SportTag::from_slug(slug));
    }
    out
}
