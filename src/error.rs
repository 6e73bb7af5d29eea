// src/error.rs
//! Error taxonomy for the content layer.
//!
//! "CMS not configured" is deliberately absent: it is a steady state the
//! executor reports through `is_configured()`, not a failure.

use thiserror::Error;

/// Transport or store-side failure while running a query.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("cms request failed: {0}")]
    Transport(String),
    #[error("cms returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("cms response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RetrievalError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RetrievalError::Decode(e.to_string())
        } else {
            RetrievalError::Transport(e.to_string())
        }
    }
}

/// A fetched document that cannot become an article.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("document {id} has no title")]
    MissingTitle { id: String },
    #[error("document {id} has no slug")]
    MissingSlug { id: String },
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("malformed document: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no article with slug '{slug}'")]
    NotFound { slug: String },
}
