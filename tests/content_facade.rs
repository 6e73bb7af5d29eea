// tests/content_facade.rs
//
// Facade behaviour against a stub document store:
// - unconfigured CMS serves the built-in set untouched
// - store errors and empty results fall back
// - slug lookups hit the CMS, then the built-in set, then NotFound
// - every slug a CMS listing returns can be looked up again

mod common;

use common::{service_with, unconfigured_service, Answer, StubStore};
use parasport_news::content::fallback::{fallback_by_slug, list_fallback};
use parasport_news::content::{FEATURED_LIMIT, LATEST_LIMIT, PLACEHOLDER_IMAGE};
use parasport_news::{ContentError, Origin};
use serde_json::json;

#[tokio::test]
async fn unconfigured_lists_are_the_fallback_sets() {
    let svc = unconfigured_service();
    let all = list_fallback().to_vec();

    let listed = svc.list_all().await;
    assert_eq!(listed.origin, Origin::Fallback);
    assert_eq!(listed.value, all);

    let featured = svc.list_featured().await;
    assert_eq!(featured.value, all[..FEATURED_LIMIT].to_vec());

    let latest = svc.list_latest().await;
    assert_eq!(latest.value, all[..LATEST_LIMIT.min(all.len())].to_vec());
}

#[tokio::test]
async fn unconfigured_slug_lookup_returns_the_seed_record() {
    let svc = unconfigured_service();
    let found = svc
        .get_by_slug("dunn-breaks-world-record-100m-freestyle")
        .await
        .expect("seed record");
    assert_eq!(found.origin, Origin::Fallback);
    assert_eq!(
        found.value.title,
        "Dunn breaks world record in 100m freestyle S14"
    );
}

#[tokio::test]
async fn failing_store_never_surfaces_errors_from_lists() {
    let store = StubStore::failing();
    let svc = service_with(store.clone());

    let latest = svc.list_latest().await;
    assert_eq!(latest.origin, Origin::Fallback);
    assert_eq!(latest.value.len(), LATEST_LIMIT.min(list_fallback().len()));
    // One attempt, no retries, and no article query after a post failure.
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn empty_featured_query_falls_back_to_first_n() {
    let store = StubStore::empty();
    let svc = service_with(store.clone());

    let featured = svc.list_featured().await;
    assert_eq!(featured.origin, Origin::Fallback);
    assert_eq!(featured.value, list_fallback()[..FEATURED_LIMIT].to_vec());
    // post then article were both tried
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn every_fallback_slug_resolves_uniquely() {
    let svc = service_with(StubStore::failing());
    for seed in list_fallback() {
        let got = svc.get_by_slug(&seed.slug).await.unwrap();
        assert_eq!(&got.value, seed);
        assert_eq!(fallback_by_slug(&seed.slug), Some(seed));
    }
    let err = svc.get_by_slug("not-a-real-article").await.unwrap_err();
    assert!(matches!(err, ContentError::NotFound { .. }));
}

#[tokio::test]
async fn cms_posts_are_normalized() {
    let body = json!([{"_type": "block", "children": [{"_type": "span", "text": "A".repeat(250)}]}]);
    let store = StubStore::new(
        Answer::Docs(json!([{
            "_id": "post-1",
            "title": "X",
            "slug": {"current": "x"},
            "publishedAt": "2024-05-02T10:00:00Z",
            "body": body,
            "image": null
        }])),
        Answer::Fail("article query must not run"),
    );
    let svc = service_with(store);

    let got = svc.get_by_slug("x").await.unwrap();
    assert_eq!(got.origin, Origin::Cms);
    let a = got.value;
    assert_eq!(a.excerpt, format!("{}...", "A".repeat(200)));
    assert_eq!(a.featured_image, PLACEHOLDER_IMAGE);
    assert_eq!(a.author, "Admin");
    assert_eq!(a.category, "News");
}

#[tokio::test]
async fn cms_articles_resolve_asset_references() {
    let store = StubStore::new(
        Answer::Docs(json!(null)),
        Answer::Docs(json!([{
            "_id": "article-1",
            "title": "Relay gold",
            "slug": {"current": "relay-gold"},
            "featuredImage": {"_type": "image", "asset": {"_ref": "image-abc123def-800x450-jpg"}},
            "publishedAt": "2024-05-03T10:00:00Z",
            "sportTags": ["para-swimming"]
        }])),
    );
    let svc = service_with(store);

    let latest = svc.list_latest().await;
    assert_eq!(latest.origin, Origin::Cms);
    assert_eq!(
        latest.value[0].featured_image,
        "https://cdn.example.com/images/proj1/production/abc123def-800x450.jpg"
    );
    assert_eq!(latest.value[0].sport_tags[0].display_name, "Para Swimming");
}

#[tokio::test]
async fn listed_cms_slugs_resolve_back_to_the_same_article() {
    let docs = json!([
        {"_id": "p1", "title": "Object slug", "slug": {"current": "object-slug"}},
        {"_id": "p2", "title": "String slug", "slug": "string-slug"},
        {"_id": "p3", "title": "Hello World"},
        {"_id": "p4", "title": "日本代表が金メダル"}
    ]);
    let svc = service_with(StubStore::new(Answer::Docs(docs), Answer::Docs(json!([]))));

    let listed = svc.list_all().await;
    assert_eq!(listed.origin, Origin::Cms);
    let slugs: Vec<_> = listed.value.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(slugs, vec!["object-slug", "string-slug"]);

    for article in &listed.value {
        let found = svc.get_by_slug(&article.slug).await.unwrap();
        assert_eq!(found.origin, Origin::Cms, "{}", article.slug);
        assert_eq!(&found.value, article);
    }
}
