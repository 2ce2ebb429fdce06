//! Catalog indexers
//!
//! An [`Indexer`] is the engine's only network collaborator. It turns a query
//! into parsed result rows and fetches release descriptors for a listing. The
//! engine never sees markup: HTML scraping lives entirely in the concrete
//! implementations under this module.

pub mod error;
pub mod rutracker;

use anyhow::Result;
use async_trait::async_trait;

pub use error::IndexerError;
pub use rutracker::RuTrackerIndexer;

use crate::types::SearchRow;

/// A searchable catalog site
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Short name used in log fields
    fn name(&self) -> &str;

    /// Run one search query and return the parsed result rows.
    ///
    /// Rows that do not match the expected page shape are skipped by the
    /// implementation; an error means the whole query failed.
    async fn search(&self, query: &str) -> Result<Vec<SearchRow>>;

    /// Find the URL of the release descriptor for a listing page
    async fn download_url(&self, listing_link: &str) -> Result<Option<String>>;

    /// Fetch a release descriptor
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
