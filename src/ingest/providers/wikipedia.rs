// src/ingest/providers/wikipedia.rs
use anyhow::{bail, Result};
use async_trait::async_trait;
use metrics::histogram;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;

use crate::ingest::types::MembershipProvider;
use crate::ingest::{fetch_text, normalize_symbol};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());

/// Reads ticker symbols from the column of a Wikipedia table whose header
/// matches `column`.
pub struct WikipediaTableProvider {
    name: String,
    column: String,
    table_hint: Option<usize>,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl WikipediaTableProvider {
    pub fn from_url(
        name: impl Into<String>,
        url: impl Into<String>,
        column: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            table_hint: None,
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    pub fn from_fixture_str(name: impl Into<String>, html: &str, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            table_hint: None,
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn with_table_hint(mut self, hint: Option<usize>) -> Self {
        self.table_hint = hint;
        self
    }

    pub fn parse_members_from_str(&self, html: &str) -> Result<BTreeSet<String>> {
        let t0 = std::time::Instant::now();
        let doc = Html::parse_document(html);
        let tables: Vec<ElementRef> = doc.select(&TABLE).collect();

        let hinted = self.table_hint.and_then(|i| tables.get(i).copied());
        let candidates = hinted.into_iter().chain(tables.iter().copied());

        for table in candidates {
            if let Some(set) = column_values(table, &self.column) {
                if set.is_empty() {
                    continue;
                }
                let ms = t0.elapsed().as_secs_f64() * 1_000.0;
                histogram!("parse_ms").record(ms);
                return Ok(set);
            }
        }
        bail!("no table with column {:?} on {} page", self.column, self.name)
    }
}

/// Values under `column` for a table whose header row has that column.
fn column_values(table: ElementRef, column: &str) -> Option<BTreeSet<String>> {
    let mut rows = table.select(&ROW);

    let col = loop {
        let row = rows.next()?;
        if row.select(&HEADER_CELL).next().is_none() {
            continue;
        }
        let pos = row.select(&CELL).position(|c| {
            c.text()
                .collect::<String>()
                .trim()
                .eq_ignore_ascii_case(column.trim())
        });
        // Only the first header row counts.
        break pos?;
    };

    let mut out = BTreeSet::new();
    for row in rows {
        if let Some(cell) = row.select(&CELL).nth(col) {
            if let Some(sym) = normalize_symbol(&cell.text().collect::<String>()) {
                out.insert(sym);
            }
        }
    }
    Some(out)
}

#[async_trait]
impl MembershipProvider for WikipediaTableProvider {
    async fn fetch_members(&self) -> Result<BTreeSet<String>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_members_from_str(s),
            Mode::Http { url, client } => {
                let body = fetch_text(client, url).await?;
                self.parse_members_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<table class="infobox"><tr><th>Founded</th><td>1957</td></tr></table>
<table class="wikitable">
  <tr><th>Company</th><th>Ticker</th><th>Sector</th></tr>
  <tr><td>Apple Inc.</td><td>AAPL</td><td>Tech</td></tr>
  <tr><td>Airbnb</td><td>ABNB[a]</td><td>Consumer</td></tr>
  <tr><td>Apple dup</td><td>AAPL</td><td>Tech</td></tr>
</table>
</body></html>"#;

    #[test]
    fn locates_table_by_header() {
        let p = WikipediaTableProvider::from_fixture_str("Nasdaq-100", PAGE, "ticker");
        let set = p.parse_members_from_str(PAGE).unwrap();
        let v: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(v, vec!["AAPL", "ABNB"]);
    }

    #[test]
    fn wrong_hint_falls_back_to_scan() {
        let p = WikipediaTableProvider::from_fixture_str("Nasdaq-100", PAGE, "Ticker")
            .with_table_hint(Some(7));
        assert_eq!(p.parse_members_from_str(PAGE).unwrap().len(), 2);
    }

    #[test]
    fn missing_column_is_error() {
        let p = WikipediaTableProvider::from_fixture_str("S&P 500", PAGE, "Symbol");
        assert!(p.parse_members_from_str(PAGE).is_err());
    }
}
