//! RuTracker indexer implementation
//!
//! # Authentication
//!
//! RuTracker uses cookie-based sessions. Log in with a browser, copy the
//! `bb_session` cookie, and configure it as `TRACKER_COOKIE`. A page that
//! still shows the login form is reported as [`IndexerError::NotLoggedIn`].
//!
//! # Result page shape
//!
//! Results live in a `table.forumline.tablesorter`. Each `tbody > tr.tCenter`
//! row carries the title link in its third cell as
//! `div.topictitle > a.topictitle`. Rows that don't match this shape are
//! skipped silently.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, header};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::{Indexer, IndexerError};
use crate::config::Config;
use crate::services::text_utils::file_stem;
use crate::types::SearchRow;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.forumline.tablesorter").expect("valid table selector"));
static TBODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody").expect("valid tbody selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr.tCenter").expect("valid row selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("valid cell selector"));
static TITLE_DIV_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.topictitle").expect("valid title div selector"));
static TITLE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.topictitle").expect("valid title link selector"));
static DL_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.dl-link").expect("valid download link selector"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static LOGIN_INPUT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"input[name="login_username"]"#).expect("valid login input selector")
});

static DL_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"dl\.php\?t=\d+").expect("valid dl.php regex"));
static TOPIC_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"t=(\d+)").expect("valid topic regex"));

/// Relative forms of a listing link that the site emits
const RELATIVE_TOPIC_PREFIXES: &[&str] = &["viewtopic.php", "/forum/viewtopic.php"];

/// RuTracker indexer
pub struct RuTrackerIndexer {
    /// Forum base URL (ends with `/`)
    site: Url,
    /// HTTP client carrying the session cookie
    client: Client,
    /// Raw search pages are written here when set
    debug_dir: Option<PathBuf>,
}

impl RuTrackerIndexer {
    /// Create a new RuTracker indexer from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let site = Url::parse(&config.site_url)
            .with_context(|| format!("Invalid site URL: {}", config.site_url))?;

        let mut headers = header::HeaderMap::new();
        if config.cookie.is_empty() {
            warn!(site = %site, "Cookie is empty - searches will hit the login page");
        } else {
            let value = header::HeaderValue::from_str(&config.cookie).map_err(|e| {
                IndexerError::InvalidHeader {
                    name: "cookie",
                    reason: e.to_string(),
                }
            })?;
            headers.insert(header::COOKIE, value);
        }
        if !config.user_agent.is_empty() {
            match header::HeaderValue::from_str(&config.user_agent) {
                Ok(v) => {
                    headers.insert(header::USER_AGENT, v);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse user agent header, using default");
                }
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(IndexerError::Http)?;

        Ok(Self {
            site,
            client,
            debug_dir: config.debug_dir.clone(),
        })
    }

    fn referer(&self) -> String {
        format!("{}index.php", self.site)
    }

    /// Fetch a page as text, failing on non-success statuses
    async fn fetch_page(&self, request: reqwest::RequestBuilder, url: &str) -> Result<String> {
        let response = request
            .header(header::REFERER, self.referer())
            .send()
            .await
            .map_err(IndexerError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexerError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        Ok(response.text().await.map_err(IndexerError::Http)?)
    }

    /// Write a raw search page to the debug directory
    async fn save_debug_page(&self, query: &str, html: &str) {
        let Some(ref dir) = self.debug_dir else {
            return;
        };

        let path = dir.join(format!("search_{}.html", file_stem(query, 50)));
        if let Err(e) = tokio::fs::write(&path, html).await {
            warn!(path = %path.display(), error = %e, "Failed to save debug page");
        }
    }

    /// Whether the site served its login form instead of the requested page
    fn is_login_page(html: &str) -> bool {
        Html::parse_document(html)
            .select(&LOGIN_INPUT_SELECTOR)
            .next()
            .is_some()
    }

    /// Resolve a listing href to an absolute URL.
    ///
    /// Absolute links are kept; the two relative topic forms are joined onto
    /// the site URL. Anything else yields `None`.
    fn resolve_link(href: &str, site: &Url) -> Option<String> {
        let href = href.trim();
        if href.starts_with("http") {
            return Some(href.to_string());
        }
        if RELATIVE_TOPIC_PREFIXES
            .iter()
            .any(|prefix| href.starts_with(prefix))
        {
            return site.join(href).ok().map(|u| u.to_string());
        }
        None
    }

    /// Parse result rows out of a search page
    fn parse_search_results(html: &str, site: &Url) -> Vec<SearchRow> {
        let document = Html::parse_document(html);

        let Some(table) = document.select(&TABLE_SELECTOR).next() else {
            debug!("No results table found");
            return vec![];
        };

        let Some(tbody) = table.select(&TBODY_SELECTOR).next() else {
            debug!("No tbody found in results table");
            return vec![];
        };

        let mut rows = Vec::new();

        for row in tbody.select(&ROW_SELECTOR) {
            // Title lives in the third column
            let Some(title_cell) = row.select(&CELL_SELECTOR).nth(2) else {
                continue;
            };

            let Some(title_link) = title_cell
                .select(&TITLE_DIV_SELECTOR)
                .next()
                .and_then(|div| div.select(&TITLE_LINK_SELECTOR).next())
            else {
                continue;
            };

            let title = title_link.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                continue;
            }

            let href = title_link.value().attr("href").unwrap_or("");
            let Some(link) = Self::resolve_link(href, site) else {
                debug!(href, "Skipping row with unrecognised link");
                continue;
            };

            rows.push(SearchRow { title, link });
        }

        rows
    }

    /// Join a possibly relative download href onto the site URL
    fn absolute_download_href(href: &str, site: &Url) -> Option<String> {
        if href.starts_with("http") {
            Some(href.to_string())
        } else {
            site.join(href).ok().map(|u| u.to_string())
        }
    }

    /// Extract the release download URL from a listing page.
    ///
    /// Tries the dedicated download anchor, then any `dl.php?t=<id>` anchor,
    /// then builds the URL from the topic id in the listing URL itself.
    fn extract_download_url(html: &str, page_url: &str, site: &Url) -> Option<String> {
        let document = Html::parse_document(html);

        if let Some(href) = document
            .select(&DL_LINK_SELECTOR)
            .find_map(|a| a.value().attr("href"))
            && let Some(url) = Self::absolute_download_href(href, site)
        {
            debug!(url = %url, "Found download link");
            return Some(url);
        }

        if let Some(href) = document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| DL_HREF_RE.is_match(href))
            && let Some(url) = Self::absolute_download_href(href, site)
        {
            debug!(url = %url, "Found dl.php link");
            return Some(url);
        }

        let topic_id = TOPIC_ID_RE.captures(page_url)?.get(1)?.as_str();
        let url = site.join(&format!("dl.php?t={topic_id}")).ok()?.to_string();
        debug!(url = %url, "Constructed download link from topic id");
        Some(url)
    }

    /// Whether a download response is a torrent descriptor
    fn looks_like_torrent(content_type: &str, body: &[u8]) -> bool {
        content_type.contains("application/x-bittorrent") || body.first() == Some(&b'd')
    }
}

#[async_trait]
impl Indexer for RuTrackerIndexer {
    fn name(&self) -> &str {
        "rutracker"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchRow>> {
        let url = self.site.join("search.php")?;
        info!(query, "Searching catalog");

        let request = self.client.get(url.clone()).query(&[("nm", query)]);
        let text = self.fetch_page(request, url.as_str()).await?;

        self.save_debug_page(query, &text).await;

        if Self::is_login_page(&text) {
            return Err(IndexerError::NotLoggedIn.into());
        }

        let rows = Self::parse_search_results(&text, &self.site);
        info!(query, results = rows.len(), "Search complete");
        Ok(rows)
    }

    async fn download_url(&self, listing_link: &str) -> Result<Option<String>> {
        debug!(link = listing_link, "Extracting download URL");

        let text = self
            .fetch_page(self.client.get(listing_link), listing_link)
            .await?;

        let url = Self::extract_download_url(&text, listing_link, &self.site);
        if url.is_none() {
            warn!(link = listing_link, "No download links found");
        }
        Ok(url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!(url, "Downloading torrent");

        let response = self
            .client
            .get(url)
            .header(header::REFERER, self.referer())
            .send()
            .await
            .map_err(IndexerError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexerError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response.bytes().await.map_err(IndexerError::Http)?;

        if !Self::looks_like_torrent(&content_type, &bytes) {
            return Err(IndexerError::NotATorrent(content_type).into());
        }

        Ok(bytes.to_vec())
    }
}
