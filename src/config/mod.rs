//! Engine configuration management

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use url::Url;

pub const DEFAULT_SITE_URL: &str = "https://rutracker.org/forum/";

pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
);

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog forum base URL, always ending with `/`
    pub site_url: String,

    /// Session cookie sent with every request
    pub cookie: String,

    /// Browser user agent string
    pub user_agent: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Where raw search pages are dumped, if set
    pub debug_dir: Option<PathBuf>,

    /// Where downloaded torrent descriptors are saved
    pub torrents_dir: PathBuf,

    /// Fetch the descriptor of the best listing
    pub download_torrents: bool,

    /// Pick the matching file inside a downloaded release
    pub selective_download: bool,

    /// Pause between tracks in a batch
    pub track_delay: Duration,

    /// Emit logs as JSON
    pub log_json: bool,
}

impl Config {
    /// Load `.env` if present, then read the environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut site_url = lookup("TRACKER_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        if !site_url.ends_with('/') {
            site_url.push('/');
        }
        Url::parse(&site_url).with_context(|| format!("Invalid TRACKER_URL: {site_url}"))?;

        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default)
        };

        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                lookup(key)
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(default),
            )
        };

        Ok(Self {
            site_url,

            cookie: lookup("TRACKER_COOKIE").unwrap_or_default(),

            user_agent: lookup("TRACKER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),

            request_timeout: secs("REQUEST_TIMEOUT_SECS", 30),

            debug_dir: lookup("DEBUG_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),

            torrents_dir: PathBuf::from(
                lookup("TORRENTS_DIR").unwrap_or_else(|| "torrents".to_string()),
            ),

            download_torrents: flag("DOWNLOAD_TORRENTS", true),

            selective_download: flag("SELECTIVE_DOWNLOAD", true),

            track_delay: secs("TRACK_DELAY_SECS", 2),

            log_json: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Check settings required to talk to the catalog
    pub fn validate(&self) -> Result<()> {
        if self.cookie.trim().is_empty() {
            bail!("TRACKER_COOKIE is required");
        }
        Url::parse(&self.site_url).context("Invalid TRACKER_URL")?;
        Ok(())
    }

    /// Create the output directories
    pub fn create_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.torrents_dir).with_context(|| {
            format!("Failed to create {}", self.torrents_dir.display())
        })?;
        if let Some(ref dir) = self.debug_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            cookie: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            debug_dir: None,
            torrents_dir: PathBuf::from("torrents"),
            download_torrents: true,
            selective_download: true,
            track_delay: Duration::from_secs(2),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.site_url, DEFAULT_SITE_URL);
        assert!(config.cookie.is_empty());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.track_delay, Duration::from_secs(2));
        assert_eq!(config.torrents_dir, PathBuf::from("torrents"));
        assert!(config.debug_dir.is_none());
        assert!(config.download_torrents);
        assert!(config.selective_download);
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TRACKER_URL", "https://mirror.example.org/forum"),
            ("TRACKER_COOKIE", "bb_session=abc"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("DEBUG_DIR", "debug_html"),
            ("DOWNLOAD_TORRENTS", "false"),
            ("SELECTIVE_DOWNLOAD", "1"),
            ("TRACK_DELAY_SECS", "not-a-number"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.site_url, "https://mirror.example.org/forum/");
        assert_eq!(config.cookie, "bb_session=abc");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.debug_dir, Some(PathBuf::from("debug_html")));
        assert!(!config.download_torrents);
        assert!(config.selective_download);
        assert_eq!(config.track_delay, Duration::from_secs(2));
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_site_url() {
        assert!(config_from(&[("TRACKER_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_validate_requires_cookie() {
        let config = config_from(&[]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[("TRACKER_COOKIE", "bb_session=abc")]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_create_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            torrents_dir: tmp.path().join("torrents"),
            debug_dir: Some(tmp.path().join("debug")),
            ..Config::default()
        };
        config.create_directories().unwrap();
        assert!(tmp.path().join("torrents").is_dir());
        assert!(tmp.path().join("debug").is_dir());
    }
}
