// src/content/model.rs
//! Presentation-ready article shape shared by every content source.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_AUTHOR: &str = "Admin";
pub const DEFAULT_CATEGORY: &str = "News";
pub const NO_EXCERPT: &str = "No excerpt available";
pub const EXCERPT_MAX_CHARS: usize = 200;
pub const ELLIPSIS: &str = "...";

/// One article as handed to the rendering layer. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleViewModel {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    /// Rich-text blocks, opaque beyond the `_type` shape check.
    pub content: Vec<Value>,
    pub featured_image: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub category: String,
    pub sport_tags: Vec<SportTag>,
    pub slug: String,
    pub featured: bool,
}

impl ArticleViewModel {
    pub fn has_sport(&self, sport_slug: &str) -> bool {
        self.sport_tags
            .iter()
            .any(|t| t.slug.eq_ignore_ascii_case(sport_slug))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportTag {
    pub slug: String,
    pub display_name: String,
}

impl SportTag {
    pub fn from_slug(slug: &str) -> Self {
        let slug = slug.trim().to_string();
        let display_name = tag_display_name(&slug);
        Self { slug, display_name }
    }
}

// A word starts the string or follows whitespace or a hyphen.
static RE_WORD_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s-])(\w)").expect("word start regex"));

/// `para-athletics` -> `Para Athletics`.
///
/// Only the first hyphen becomes a space; every word start is uppercased,
/// so `wheelchair-rugby-league` reads `Wheelchair Rugby-League`.
pub fn tag_display_name(slug: &str) -> String {
    let spaced = slug.replacen('-', " ", 1);
    RE_WORD_START
        .replace_all(&spaced, |caps: &regex::Captures| {
            format!("{}{}", &caps[1], caps[2].to_uppercase())
        })
        .into_owned()
}

/// Keep only JSON objects that carry a string `_type`.
pub fn shape_checked_blocks(raw: Option<&Value>) -> Vec<Value> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|b| b.get("_type").and_then(Value::as_str).is_some())
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Joined span text of the first `block` with non-blank text.
pub fn first_block_text(blocks: &[Value]) -> Option<String> {
    blocks
        .iter()
        .filter(|b| b.get("_type").and_then(Value::as_str) == Some("block"))
        .map(block_text)
        .find(|t| !t.trim().is_empty())
}

fn block_text(block: &Value) -> String {
    block
        .get("children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter_map(|c| c.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Decode entities, collapse whitespace, cap at 200 chars and append `...`.
pub fn excerpt_from_text(text: &str) -> Option<String> {
    let decoded = html_escape::decode_html_entities(text);
    let collapsed = RE_WS.replace_all(&decoded, " ");
    let clean = collapsed.trim();
    if clean.is_empty() {
        return None;
    }
    let head: String = clean.chars().take(EXCERPT_MAX_CHARS).collect();
    Some(format!("{head}{ELLIPSIS}"))
}

/// Excerpt synthesized from content, or the fixed sentinel.
pub fn synthesize_excerpt(blocks: &[Value]) -> String {
    first_block_text(blocks)
        .and_then(|t| excerpt_from_text(&t))
        .unwrap_or_else(|| NO_EXCERPT.to_string())
}
