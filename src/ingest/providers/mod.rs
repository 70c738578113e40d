// src/ingest/providers/mod.rs
pub mod html_listing;
pub mod rss;
pub mod wikipedia;

use crate::config::{FeedKind, WatchConfig};
use crate::index::IndexId;
use crate::ingest::types::{AnnouncementProvider, MembershipProvider};

use html_listing::HtmlListingProvider;
use rss::RssProvider;
use wikipedia::WikipediaTableProvider;

/// One Wikipedia provider per tracked index.
pub fn membership_providers_from_config(
    cfg: &WatchConfig,
    client: &reqwest::Client,
) -> Vec<(IndexId, Box<dyn MembershipProvider>)> {
    IndexId::ALL
        .iter()
        .map(|&id| {
            let src = cfg.source(id);
            let p = WikipediaTableProvider::from_url(
                id.display_name(),
                src.url.clone(),
                src.column.clone(),
                client.clone(),
            )
            .with_table_hint(src.table_hint);
            (id, Box::new(p) as Box<dyn MembershipProvider>)
        })
        .collect()
}

pub fn announcement_providers_from_config(
    cfg: &WatchConfig,
    client: &reqwest::Client,
) -> Vec<Box<dyn AnnouncementProvider>> {
    cfg.feeds
        .iter()
        .map(|f| match f.kind {
            FeedKind::Rss => Box::new(RssProvider::from_url(
                f.name.clone(),
                f.url.clone(),
                client.clone(),
            )) as Box<dyn AnnouncementProvider>,
            FeedKind::Html => Box::new(
                HtmlListingProvider::from_url(f.name.clone(), f.url.clone(), client.clone())
                    .with_selector(f.selector.as_deref()),
            ),
        })
        .collect()
}
