use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::fetch_text;
use crate::ingest::normalize_text;
use crate::ingest::types::{AnnouncementProvider, RawItem};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

pub fn parse_rfc2822_to_unix(ts: &str) -> Option<i64> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
}

/// RSS 2.0 feed of index announcements.
pub struct RssProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssProvider {
    pub fn from_fixture_str(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    /// Items newest first when dates parse; undated items keep feed order at the end.
    pub fn parse_items_from_str(&self, s: &str) -> Result<Vec<RawItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing {} rss xml", self.name))?;

        let mut out: Vec<(Option<i64>, RawItem)> = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let link = it.link.as_deref().map(str::trim).unwrap_or_default().to_string();
            if title.is_empty() || link.is_empty() {
                continue;
            }
            let date = it
                .pub_date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());
            let ts = date.as_deref().and_then(parse_rfc2822_to_unix);
            out.push((
                ts,
                RawItem {
                    source: self.name.clone(),
                    title,
                    link,
                    date,
                    summary: it.description.as_deref().map(normalize_text),
                },
            ));
        }
        // stable: undated (None) sort last
        out.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("parse_ms").record(ms);
        Ok(out.into_iter().map(|(_, it)| it).collect())
    }
}

#[async_trait]
impl AnnouncementProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = fetch_text(client, url).await?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_dates_parse() {
        assert_eq!(
            parse_rfc2822_to_unix("Fri, 06 Sep 2024 21:15:00 +0000"),
            Some(1_725_657_300)
        );
        assert_eq!(parse_rfc2822_to_unix("yesterday"), None);
    }

    #[test]
    fn empty_channel_is_ok() {
        let p = RssProvider::from_fixture_str("x", "");
        let xml = r#"<rss version="2.0"><channel><title>t</title></channel></rss>"#;
        assert!(p.parse_items_from_str(xml).unwrap().is_empty());
    }
}
