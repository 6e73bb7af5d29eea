// src/content/fallback.rs
//! Built-in articles served when the CMS is unconfigured, empty or failing.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::content::model::{ArticleViewModel, SportTag, DEFAULT_AUTHOR};

struct Seed {
    id: &'static str,
    slug: &'static str,
    title: &'static str,
    excerpt: &'static str,
    paragraphs: &'static [&'static str],
    image: &'static str,
    published_at: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
    featured: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "fallback-1",
        slug: "dunn-breaks-world-record-100m-freestyle",
        title: "Dunn breaks world record in 100m freestyle S14",
        excerpt: "Reece Dunn lowered his own S14 world record in the 100m freestyle, touching the wall in a time that confirms him as the class to beat.",
        paragraphs: &[
            "Reece Dunn lowered his own S14 world record in the 100m freestyle on the opening night of competition.",
            "The swimmer went out fast and held his stroke through the final 25 metres to finish clear of the field.",
        ],
        image: "/images/news/dunn-world-record.jpg",
        published_at: "2024-04-20T18:30:00Z",
        category: "Results",
        tags: &["para-swimming"],
        featured: true,
    },
    Seed {
        id: "fallback-2",
        slug: "wheelchair-rugby-squad-named-for-europeans",
        title: "Wheelchair rugby squad named for European Championship",
        excerpt: "Twelve players have been selected for the European Championship, blending experienced internationals with three first-time call-ups.",
        paragraphs: &[
            "Twelve players have been selected for the European Championship squad.",
            "The head coach said the group balances tournament experience with the energy of three debutants.",
        ],
        image: "/images/news/wheelchair-rugby-squad.jpg",
        published_at: "2024-04-18T09:00:00Z",
        category: "Team News",
        tags: &["wheelchair-rugby"],
        featured: true,
    },
    Seed {
        id: "fallback-3",
        slug: "para-athletics-grand-prix-round-up",
        title: "Para athletics Grand Prix round-up",
        excerpt: "Season bests on the track and a championship record in the field made for a busy weekend at the latest Grand Prix meeting.",
        paragraphs: &[
            "Season bests on the track and a championship record in the field made for a busy weekend.",
            "Sprinters in the T44 and T64 classes produced the closest finishes of the meeting.",
        ],
        image: "/images/news/athletics-grand-prix.jpg",
        published_at: "2024-04-15T16:45:00Z",
        category: "Results",
        tags: &["para-athletics"],
        featured: false,
    },
    Seed {
        id: "fallback-4",
        slug: "para-cycling-track-world-cup-preview",
        title: "Para cycling track World Cup preview",
        excerpt: "Riders across the tandem, C and H classes head to the velodrome looking to secure qualification points ahead of the summer.",
        paragraphs: &[
            "Riders across the tandem, C and H classes head to the velodrome looking for qualification points.",
        ],
        image: "/images/news/para-cycling-preview.jpg",
        published_at: "2024-04-12T07:15:00Z",
        category: "Previews",
        tags: &["para-cycling"],
        featured: false,
    },
    Seed {
        id: "fallback-5",
        slug: "boccia-coaching-programme-launches",
        title: "New boccia coaching programme launches",
        excerpt: "A nationwide coaching programme aims to double the number of qualified boccia coaches working with community clubs.",
        paragraphs: &[
            "A nationwide coaching programme aims to double the number of qualified boccia coaches.",
            "Clubs can register interest through their regional development officer.",
        ],
        image: "/images/news/boccia-coaching.jpg",
        published_at: "2024-04-08T12:00:00Z",
        category: "Grassroots",
        tags: &["boccia"],
        featured: false,
    },
    Seed {
        id: "fallback-6",
        slug: "blind-football-league-returns",
        title: "Blind football league returns for new season",
        excerpt: "The domestic blind football league returns with eight teams, a new fixture format and live streaming of every match day.",
        paragraphs: &[
            "The domestic blind football league returns with eight teams and a new fixture format.",
            "Every match day will be streamed live with audio-described commentary.",
        ],
        image: "/images/news/blind-football.jpg",
        published_at: "2024-04-02T10:30:00Z",
        category: "News",
        tags: &["blind-football"],
        featured: false,
    },
];

static FALLBACK_ARTICLES: Lazy<Vec<ArticleViewModel>> =
    Lazy::new(|| SEEDS.iter().map(build).collect());

fn build(seed: &Seed) -> ArticleViewModel {
    ArticleViewModel {
        id: seed.id.to_string(),
        title: seed.title.to_string(),
        excerpt: seed.excerpt.to_string(),
        content: seed
            .paragraphs
            .iter()
            .enumerate()
            .map(|(i, text)| paragraph(seed.id, i, text))
            .collect(),
        featured_image: seed.image.to_string(),
        published_at: DateTime::parse_from_rfc3339(seed.published_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        author: DEFAULT_AUTHOR.to_string(),
        category: seed.category.to_string(),
        sport_tags: seed.tags.iter().map(|t| SportTag::from_slug(t)).collect(),
        slug: seed.slug.to_string(),
        featured: seed.featured,
    }
}

fn paragraph(id: &str, index: usize, text: &str) -> Value {
    json!({
        "_type": "block",
        "_key": format!("{id}-p{index}"),
        "style": "normal",
        "markDefs": [],
        "children": [{"_type": "span", "_key": format!("{id}-s{index}"), "text": text, "marks": []}]
    })
}

/// The fixed fallback set, newest first.
pub fn list_fallback() -> &'static [ArticleViewModel] {
    &FALLBACK_ARTICLES
}

pub fn fallback_by_slug(slug: &str) -> Option<&'static ArticleViewModel> {
    FALLBACK_ARTICLES.iter().find(|a| a.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn slugs_are_unique_and_resolvable() {
        let all = list_fallback();
        let slugs: HashSet<_> = all.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs.len(), all.len());
        for a in all {
            assert_eq!(fallback_by_slug(&a.slug), Some(a));
        }
        assert!(fallback_by_slug("no-such-article").is_none());
    }

    #[test]
    fn dunn_record_is_present() {
        let a = fallback_by_slug("dunn-breaks-world-record-100m-freestyle").unwrap();
        assert_eq!(a.title, "Dunn breaks world record in 100m freestyle S14");
        assert_eq!(a.sport_tags[0].display_name, "Para Swimming");
    }

    #[test]
    fn records_are_display_ready() {
        let all = list_fallback();
        assert!(all.len() >= 6);
        for a in all {
            assert!(!a.excerpt.is_empty());
            assert!(a.excerpt.chars().count() <= 203);
            assert!(!a.featured_image.is_empty());
            assert!(!a.content.is_empty());
            assert_ne!(a.published_at, DateTime::<Utc>::UNIX_EPOCH);
        }
        assert!(all
            .windows(2)
            .all(|w| w[0].published_at >= w[1].published_at));
    }
}
