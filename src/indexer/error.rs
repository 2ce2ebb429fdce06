//! Transport errors raised by catalog indexers

use thiserror::Error;

/// Failures talking to the catalog site
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Site answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Site served the login form instead of results
    #[error("The user is not logged in. The cookie may have expired or is incorrect.")]
    NotLoggedIn,

    /// Download did not return a torrent descriptor
    #[error("Response is not a torrent file (content-type: {0})")]
    NotATorrent(String),

    /// Cookie or user agent could not be used as a header value
    #[error("Invalid {name} header: {reason}")]
    InvalidHeader { name: &'static str, reason: String },
}
