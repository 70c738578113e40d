// src/config/mod.rs
//! Run configuration: `config/watch.toml` (or `$INDEX_WATCH_CONFIG`) plus
//! environment overrides. A missing file yields the built-in defaults.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::index::IndexId;
use crate::snapshot::{DEFAULT_MAX_SEEN_LINKS, DEFAULT_SNAPSHOT_PATH};

pub const ENV_CONFIG_PATH: &str = "INDEX_WATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/watch.toml";

const ENV_SNAPSHOT_PATH: &str = "SNAPSHOT_PATH";
const ENV_HTTP_TIMEOUT: &str = "HTTP_TIMEOUT_SECS";
const ENV_GUARD_EMPTY: &str = "GUARD_EMPTY_FETCH";

pub const DEFAULT_LINE_ENDPOINT: &str = "https://notify-api.line.me/api/notify";

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_PATH)
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("index-watch/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_max_seen_links() -> usize {
    DEFAULT_MAX_SEEN_LINKS
}
fn default_sp500() -> IndexSource {
    IndexSource {
        url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies".into(),
        column: "Symbol".into(),
        table_hint: Some(0),
        keywords: vec!["S&P 500".into(), "S&P500".into()],
    }
}
fn default_nasdaq100() -> IndexSource {
    IndexSource {
        url: "https://en.wikipedia.org/wiki/Nasdaq-100".into(),
        column: "Ticker".into(),
        table_hint: Some(4),
        keywords: vec!["Nasdaq-100".into(), "Nasdaq 100".into()],
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_seen_links")]
    pub max_seen_links: usize,
    /// Treat an empty membership fetch as "no data" instead of "no members".
    #[serde(default)]
    pub guard_empty_fetch: bool,
    #[serde(default = "default_sp500")]
    pub sp500: IndexSource,
    #[serde(default = "default_nasdaq100")]
    pub nasdaq100: IndexSource,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub line: LineConfig,
}

/// Where one index's membership table lives.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSource {
    pub url: String,
    /// Header text of the column holding tickers.
    pub column: String,
    /// Table position tried before scanning the whole page.
    #[serde(default)]
    pub table_hint: Option<usize>,
    /// Phrases that tie an announcement to this index.
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Rss,
    Html,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    pub kind: FeedKind,
    /// CSS selector for anchors on `html` listing pages.
    #[serde(default)]
    pub selector: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    #[serde(default = "default_line_endpoint")]
    pub endpoint: String,
}

fn default_line_endpoint() -> String {
    DEFAULT_LINE_ENDPOINT.to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_line_endpoint(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
            max_seen_links: default_max_seen_links(),
            guard_empty_fetch: false,
            sp500: default_sp500(),
            nasdaq100: default_nasdaq100(),
            feeds: Vec::new(),
            line: LineConfig::default(),
        }
    }
}

impl WatchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parsing watch config")?;
        if cfg.http_timeout_secs == 0 {
            bail!("http_timeout_secs must be at least 1");
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading watch config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// `$INDEX_WATCH_CONFIG` (must exist), else `config/watch.toml` if present,
    /// else defaults. Env overrides are applied last.
    pub fn load() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::load_from(&p)?
            } else {
                tracing::debug!("no {DEFAULT_CONFIG_PATH}; using defaults");
                Self::default()
            }
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(p) = env::var(ENV_SNAPSHOT_PATH) {
            if !p.trim().is_empty() {
                self.snapshot_path = PathBuf::from(p.trim());
            }
        }
        if let Some(secs) = env::var(ENV_HTTP_TIMEOUT)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            self.http_timeout_secs = secs;
        }
        if let Ok(v) = env::var(ENV_GUARD_EMPTY) {
            self.guard_empty_fetch = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    pub fn source(&self, index: IndexId) -> &IndexSource {
        match index {
            IndexId::Sp500 => &self.sp500,
            IndexId::Nasdaq100 => &self.nasdaq100,
        }
    }

    /// Keyword lists per index, in tracking order.
    pub fn keywords(&self) -> Vec<(IndexId, Vec<String>)> {
        IndexId::ALL
            .iter()
            .map(|&id| (id, self.source(id).keywords.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = WatchConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.snapshot_path, PathBuf::from("previous_data.json"));
        assert_eq!(cfg.sp500.column, "Symbol");
        assert_eq!(cfg.nasdaq100.column, "Ticker");
        assert!(!cfg.guard_empty_fetch);
        assert!(cfg.feeds.is_empty());
        assert_eq!(cfg.line.endpoint, DEFAULT_LINE_ENDPOINT);
    }

    #[test]
    fn feeds_and_overrides_parse() {
        let toml = r#"
snapshot_path = "state/index.json"
max_seen_links = 50

[nasdaq100]
url = "https://example.test/ndx"
column = "Symbol"
keywords = ["NDX"]

[[feeds]]
name = "S&P DJI"
url = "https://example.test/rss"
kind = "rss"

[[feeds]]
name = "Nasdaq IR"
url = "https://example.test/news"
kind = "html"
selector = "div.news a"
"#;
        let cfg = WatchConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.max_seen_links, 50);
        assert_eq!(cfg.nasdaq100.table_hint, None);
        assert_eq!(cfg.sp500.table_hint, Some(0));
        assert_eq!(cfg.feeds.len(), 2);
        assert_eq!(cfg.feeds[1].kind, FeedKind::Html);
        assert_eq!(cfg.feeds[1].selector.as_deref(), Some("div.news a"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = WatchConfig::from_toml_str("http_timeout_secs = 0").unwrap_err();
        assert!(format!("{err:#}").contains("http_timeout_secs"));
        assert_eq!(
            WatchConfig::from_toml_str("http_timeout_secs = 3")
                .unwrap()
                .http_timeout_secs,
            3
        );
    }
}
