//! Track-to-listing match engine
//!
//! Resolves music tracks (artist, title, album) against the listings of a
//! catalog site, picks the single best listing, and then the single best
//! matching file inside that listing's release.
//!
//! ```ignore
//! use trackmatch::{Config, RuTrackerIndexer, Track, TrackResolver};
//!
//! let config = Config::load()?;
//! config.validate()?;
//! let indexer = RuTrackerIndexer::new(&config)?;
//! let resolution = TrackResolver::new(&indexer, &config)
//!     .resolve_track(&Track::new("The Beatles", "Yesterday", "Help!"))
//!     .await;
//! println!("{:?}", resolution.wanted_indices());
//! ```

pub mod config;
pub mod indexer;
pub mod logging;
pub mod services;
pub mod torrent;
pub mod types;

pub use config::Config;
pub use indexer::{Indexer, IndexerError, RuTrackerIndexer};
pub use services::{TrackResolution, TrackResolver, select_best, select_files};
pub use types::{
    Classification, FileEntry, Listing, MatchCandidate, Quality, ReleaseType, SearchRow, Track,
};
