// src/content/mod.rs
//! CMS-backed article content: image resolution, querying, normalization,
//! built-in fallback articles and the facade tying them together.

pub mod facade;
pub mod fallback;
pub mod image;
pub mod model;
pub mod normalize;
pub mod query;

pub use facade::{ContentService, Origin, Sourced, FEATURED_LIMIT, LATEST_LIMIT};
pub use image::{ImageParams, ImageRef, ImageResolver, PLACEHOLDER_IMAGE};
pub use model::{tag_display_name, ArticleViewModel, SportTag};
pub use normalize::{normalize, normalize_value, RawDocument, SourceShape};
pub use query::{CacheHints, CmsQuery, DocumentStore, HttpDocumentStore, QueryExecutor, QueryParams};
