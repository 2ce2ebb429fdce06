//! Multi-strategy search cascade
//!
//! A track is searched with a fixed, ordered list of phrasings, from the most
//! specific (artist + title) to the broadest (first word of the artist). Every
//! strategy runs; results accumulate in discovery order and are deduplicated
//! by link afterwards. A failing strategy contributes nothing and the cascade
//! moves on.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::classifier::classify;
use super::text_utils::clean_query_text;
use crate::indexer::Indexer;
use crate::types::{Listing, SearchRow, Track};

/// Queries shorter than this are never sent
pub const MIN_QUERY_LEN: usize = 2;

/// One phrasing of a track used as a search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    ArtistTitle,
    ArtistAlbum,
    Artist,
    Title,
    Album,
    ArtistFirstWord,
}

impl SearchStrategy {
    /// Strategies in the order they are attempted
    pub const ALL: [SearchStrategy; 6] = [
        SearchStrategy::ArtistTitle,
        SearchStrategy::ArtistAlbum,
        SearchStrategy::Artist,
        SearchStrategy::Title,
        SearchStrategy::Album,
        SearchStrategy::ArtistFirstWord,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SearchStrategy::ArtistTitle => "artist + track",
            SearchStrategy::ArtistAlbum => "artist + album",
            SearchStrategy::Artist => "artist",
            SearchStrategy::Title => "track",
            SearchStrategy::Album => "album",
            SearchStrategy::ArtistFirstWord => "simplified artist",
        }
    }

    /// Build the query for an already-cleaned track
    pub fn query(&self, track: &Track) -> String {
        let query = match self {
            SearchStrategy::ArtistTitle => format!("{} {}", track.artist, track.title),
            SearchStrategy::ArtistAlbum => format!("{} {}", track.artist, track.album),
            SearchStrategy::Artist => track.artist.clone(),
            SearchStrategy::Title => track.title.clone(),
            SearchStrategy::Album => track.album.clone(),
            SearchStrategy::ArtistFirstWord => track
                .artist
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        query.trim().to_string()
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Clean every field of a track for searching and scoring
pub fn clean_track(track: &Track) -> Track {
    Track {
        artist: clean_query_text(&track.artist),
        title: clean_query_text(&track.title),
        album: clean_query_text(&track.album),
    }
}

/// The queries a track will produce, paired with their strategy.
///
/// Queries too short to send are left out.
pub fn planned_queries(track: &Track) -> Vec<(SearchStrategy, String)> {
    let cleaned = clean_track(track);
    SearchStrategy::ALL
        .iter()
        .map(|strategy| (*strategy, strategy.query(&cleaned)))
        .filter(|(_, query)| query.chars().count() >= MIN_QUERY_LEN)
        .collect()
}

/// Classify a raw row and tag it with the strategy that found it
pub fn listing_from_row(row: SearchRow, strategy: SearchStrategy) -> Listing {
    Listing {
        classification: classify(&row.title),
        title: row.title,
        link: row.link,
        strategy: strategy.label().to_string(),
        match_score: None,
    }
}

/// Collapse listings sharing a link, keeping the first occurrence in order
pub fn dedup_by_link(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen: HashSet<String> = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.link.clone()))
        .collect()
}

/// Run every search strategy for a track and return the deduplicated listings.
///
/// Listings are unscored and ordered by discovery.
pub async fn resolve(indexer: &dyn Indexer, track: &Track) -> Vec<Listing> {
    let mut found = Vec::new();

    for (strategy, query) in planned_queries(track) {
        info!(
            indexer = indexer.name(),
            strategy = strategy.label(),
            query = %query,
            "Running search strategy"
        );

        match indexer.search(&query).await {
            Ok(rows) => {
                debug!(strategy = strategy.label(), results = rows.len(), "Strategy returned rows");
                found.extend(rows.into_iter().map(|row| listing_from_row(row, strategy)));
            }
            Err(e) => {
                warn!(
                    strategy = strategy.label(),
                    query = %query,
                    error = %e,
                    "Search strategy failed, continuing"
                );
            }
        }
    }

    let total = found.len();
    let unique = dedup_by_link(found);
    debug!(total, unique = unique.len(), "Deduplicated search results");
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quality, ReleaseType};

    #[test]
    fn test_planned_queries_order() {
        let track = Track::new("The Beatles", "Yesterday", "Help!");
        let queries = planned_queries(&track);

        assert_eq!(
            queries,
            vec![
                (SearchStrategy::ArtistTitle, "The Beatles Yesterday".to_string()),
                (SearchStrategy::ArtistAlbum, "The Beatles Help".to_string()),
                (SearchStrategy::Artist, "The Beatles".to_string()),
                (SearchStrategy::Title, "Yesterday".to_string()),
                (SearchStrategy::Album, "Help".to_string()),
                (SearchStrategy::ArtistFirstWord, "The".to_string()),
            ]
        );
    }

    #[test]
    fn test_short_queries_skipped() {
        let track = Track::new("X", "", "");
        assert!(planned_queries(&track).is_empty());

        let track = Track::new("", "Yesterday", "?!");
        let queries = planned_queries(&track);
        assert_eq!(
            queries,
            vec![
                (SearchStrategy::ArtistTitle, "Yesterday".to_string()),
                (SearchStrategy::Title, "Yesterday".to_string()),
            ]
        );
    }

    #[test]
    fn test_clean_track() {
        let track = Track::new(
            "  Guns N' Roses ",
            "Sweet Child O' Mine",
            "Appetite\tfor  Destruction",
        );
        let cleaned = clean_track(&track);
        assert_eq!(cleaned.artist, "Guns N Roses");
        assert_eq!(cleaned.title, "Sweet Child O Mine");
        assert_eq!(cleaned.album, "Appetite for Destruction");
    }

    #[test]
    fn test_listing_from_row() {
        let row = SearchRow::new("Artist - Song [FLAC]", "https://example.org/t/1");
        let listing = listing_from_row(row, SearchStrategy::Artist);

        assert_eq!(listing.quality(), Quality::Lossless);
        assert_eq!(listing.release_type(), ReleaseType::Single);
        assert_eq!(listing.priority(), 4);
        assert_eq!(listing.strategy, "artist");
        assert!(listing.match_score.is_none());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let row = |title: &str, link: &str| SearchRow::new(title, link);
        let listings = vec![
            listing_from_row(row("First title", "https://x/1"), SearchStrategy::ArtistTitle),
            listing_from_row(row("Other", "https://x/2"), SearchStrategy::ArtistTitle),
            listing_from_row(row("Second title", "https://x/1"), SearchStrategy::Artist),
        ];

        let unique = dedup_by_link(listings);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "First title");
        assert_eq!(unique[0].strategy, "artist + track");
        assert_eq!(unique[1].link, "https://x/2");
    }
}
