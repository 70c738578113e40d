// tests/providers_html_listing.rs
use index_watch::ingest::collect_announcements;
use index_watch::ingest::providers::html_listing::HtmlListingProvider;
use index_watch::ingest::types::{AnnouncementProvider, Confidence};
use index_watch::IndexId;
use std::fs;

const BASE: &str = "https://ir.nasdaq.com/news-releases";

#[tokio::test]
async fn selector_limits_to_press_links() {
    let html = fs::read_to_string("tests/fixtures/nasdaq_press.html")
        .expect("missing tests/fixtures/nasdaq_press.html");
    let p = HtmlListingProvider::from_fixture_str("Nasdaq IR", BASE, &html)
        .with_selector(Some("a[href*='news-release']"));

    let items = p.fetch_latest().await.expect("listing parse ok");
    assert_eq!(items.len(), 3);
    assert_eq!(
        items[0].link,
        "https://ir.nasdaq.com/news-releases/news-release-details/annual-reconstitution-nasdaq-100-index"
    );
    assert_eq!(items[0].date.as_deref(), Some("2025-12-12"));
}

#[tokio::test]
async fn default_selector_takes_every_anchor() {
    let html = fs::read_to_string("tests/fixtures/nasdaq_press.html").unwrap();
    let p = HtmlListingProvider::from_fixture_str("Nasdaq IR", BASE, &html).with_selector(None);
    let items = p.fetch_latest().await.unwrap();
    assert_eq!(items.len(), 6);
    assert!(items.iter().any(|i| i.link == "https://ir.nasdaq.com/about"));
}

#[tokio::test]
async fn nasdaq_announcements_are_high_confidence() {
    let html = fs::read_to_string("tests/fixtures/nasdaq_press.html").unwrap();
    let providers: Vec<Box<dyn AnnouncementProvider>> = vec![Box::new(
        HtmlListingProvider::from_fixture_str("Nasdaq IR", BASE, &html)
            .with_selector(Some("div.news-list a")),
    )];
    let kws = vec![(IndexId::Nasdaq100, vec!["Nasdaq-100".to_string()])];

    let out = collect_announcements(&providers, &kws).await;
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|a| a.index == IndexId::Nasdaq100));
    assert!(out.iter().all(|a| a.confidence == Confidence::High));
}
