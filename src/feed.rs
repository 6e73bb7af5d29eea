// src/feed.rs
//! RSS 2.0 rendering of the latest articles.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::ArticleViewModel;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Serialize)]
#[serde(rename = "rss")]
struct Rss<'a> {
    #[serde(rename = "@version")]
    version: &'static str,
    channel: Channel<'a>,
}

#[derive(Serialize)]
struct Channel<'a> {
    title: &'a str,
    link: &'a str,
    description: &'a str,
    #[serde(rename = "lastBuildDate", skip_serializing_if = "Option::is_none")]
    last_build_date: Option<String>,
    item: Vec<Item>,
}

#[derive(Serialize)]
struct Item {
    title: String,
    link: String,
    guid: String,
    description: String,
    #[serde(rename = "pubDate")]
    pub_date: String,
    category: String,
}

pub fn render_rss(articles: &[ArticleViewModel], site: &SiteConfig) -> Result<String> {
    let items = articles
        .iter()
        .map(|a| {
            let link = site.article_url(&a.slug);
            Item {
                title: a.title.clone(),
                guid: link.clone(),
                link,
                description: a.excerpt.clone(),
                pub_date: a.published_at.to_rfc2822(),
                category: a.category.clone(),
            }
        })
        .collect();

    let rss = Rss {
        version: "2.0",
        channel: Channel {
            title: &site.title,
            link: &site.base_url,
            description: &site.description,
            last_build_date: articles
                .iter()
                .map(|a| a.published_at)
                .max()
                .map(|d| d.to_rfc2822()),
            item: items,
        },
    };
    let body = quick_xml::se::to_string(&rss).context("serializing rss feed")?;
    Ok(format!("{XML_DECL}\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback::list_fallback;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct ParsedRss {
        channel: ParsedChannel,
    }
    #[derive(Debug, Deserialize)]
    struct ParsedChannel {
        title: String,
        #[serde(rename = "item", default)]
        item: Vec<ParsedItem>,
    }
    #[derive(Debug, Deserialize)]
    struct ParsedItem {
        title: String,
        link: String,
        #[serde(rename = "pubDate")]
        pub_date: String,
    }

    #[test]
    fn feed_lists_every_article_with_absolute_links() {
        let site = SiteConfig {
            base_url: "https://news.example.org".into(),
            ..SiteConfig::default()
        };
        let articles = list_fallback();
        let xml = render_rss(articles, &site).unwrap();
        assert!(xml.starts_with(XML_DECL));
        assert!(xml.contains(r#"<rss version="2.0">"#));

        let parsed: ParsedRss = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.channel.title, site.title);
        assert_eq!(parsed.channel.item.len(), articles.len());
        assert_eq!(
            parsed.channel.item[0].link,
            "https://news.example.org/news/dunn-breaks-world-record-100m-freestyle"
        );
        assert_eq!(parsed.channel.item[0].title, articles[0].title);
        assert!(parsed.channel.item[0].pub_date.ends_with("+0000"));
    }

    #[test]
    fn markup_in_titles_is_escaped() {
        let mut a = list_fallback()[0].clone();
        a.title = "Gold & <glory>".into();
        let xml = render_rss(&[a], &SiteConfig::default()).unwrap();
        assert!(xml.contains("Gold &amp; &lt;glory"));
    }
}
