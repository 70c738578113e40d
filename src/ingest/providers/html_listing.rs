// src/ingest/providers/html_listing.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::ingest::types::{AnnouncementProvider, RawItem};
use crate::ingest::{fetch_text, normalize_text};

pub const DEFAULT_SELECTOR: &str = "a[href]";

/// Press-release listing page scraped for anchors.
pub struct HtmlListingProvider {
    name: String,
    base_url: String,
    selector: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http(reqwest::Client),
}

impl HtmlListingProvider {
    pub fn from_url(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            base_url: url.into(),
            selector: DEFAULT_SELECTOR.to_string(),
            mode: Mode::Http(client),
        }
    }

    /// `base_url` resolves relative hrefs in the fixture.
    pub fn from_fixture_str(name: impl Into<String>, base_url: impl Into<String>, html: &str) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            selector: DEFAULT_SELECTOR.to_string(),
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn with_selector(mut self, selector: Option<&str>) -> Self {
        if let Some(s) = selector.map(str::trim).filter(|s| !s.is_empty()) {
            self.selector = s.to_string();
        }
        self
    }

    pub fn parse_items_from_str(&self, html: &str) -> Result<Vec<RawItem>> {
        let t0 = std::time::Instant::now();
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("invalid listing url {}", self.base_url))?;
        let sel = Selector::parse(&self.selector)
            .map_err(|e| anyhow!("invalid selector {:?}: {e}", self.selector))?;

        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for a in doc.select(&sel) {
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            let Ok(link) = base.join(href.trim()) else {
                continue;
            };
            if !matches!(link.scheme(), "http" | "https") {
                continue;
            }
            let title = normalize_text(&a.text().collect::<String>());
            if title.is_empty() {
                continue;
            }
            let link = link.to_string();
            if !seen.insert(link.clone()) {
                continue;
            }
            let date = a
                .value()
                .attr("data-date")
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());
            out.push(RawItem {
                source: self.name.clone(),
                title,
                link,
                date,
                summary: None,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl AnnouncementProvider for HtmlListingProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http(client) => {
                let body = fetch_text(client, &self.base_url).await?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
