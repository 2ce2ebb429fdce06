//! Best-listing selection
//!
//! Runs the search cascade, scores every candidate, and picks the winner by
//! `(match_score, priority)`, both descending. The sort is stable, so fully
//! tied candidates keep their discovery order.

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use super::match_scorer::score_breakdown;
use super::search_cascade::{clean_track, resolve};
use crate::indexer::Indexer;
use crate::types::{Listing, Track};

/// Attach a match score to every listing.
///
/// Targets are the cleaned track fields, the same text the queries were built from.
pub fn score_listings(listings: &mut [Listing], track: &Track) {
    let target = clean_track(track);

    for listing in listings.iter_mut() {
        let breakdown = score_breakdown(listing, &target.artist, &target.title, &target.album);
        debug!(title = %listing.title, breakdown = %breakdown.summary(), "Scored listing");
        listing.match_score = Some(breakdown.total());
    }
}

/// Compare two scored listings, best first
fn compare_listings(a: &Listing, b: &Listing) -> Ordering {
    let a_score = a.match_score.unwrap_or(0.0);
    let b_score = b.match_score.unwrap_or(0.0);

    b_score
        .total_cmp(&a_score)
        .then_with(|| b.priority().cmp(&a.priority()))
}

/// Sort scored listings best first (stable)
pub fn rank_listings(mut listings: Vec<Listing>) -> Vec<Listing> {
    listings.sort_by(compare_listings);
    listings
}

/// Find the best catalog listing for a track.
///
/// Returns `None` when the cascade found nothing; that is an expected outcome,
/// not an error.
pub async fn select_best(indexer: &dyn Indexer, track: &Track) -> Option<Listing> {
    let mut listings = resolve(indexer, track).await;

    if listings.is_empty() {
        warn!(track = %track, "No results found");
        return None;
    }

    info!(candidates = listings.len(), "Calculating match scores");
    score_listings(&mut listings, track);

    let best = rank_listings(listings).into_iter().next()?;
    info!(
        score = %format!("{:.3}", best.match_score.unwrap_or(0.0)),
        priority = best.priority(),
        title = %best.title,
        "Best match"
    );
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, Quality, ReleaseType};

    fn scored(link: &str, score: f64, quality: Quality, release_type: ReleaseType) -> Listing {
        Listing {
            title: format!("listing {link}"),
            link: link.to_string(),
            classification: Classification::new(quality, release_type),
            strategy: "artist".to_string(),
            match_score: Some(score),
        }
    }

    #[test]
    fn test_rank_by_score() {
        let ranked = rank_listings(vec![
            scored("a", 0.4, Quality::Lossless, ReleaseType::Single),
            scored("b", 0.9, Quality::Lossy, ReleaseType::Album),
            scored("c", 0.6, Quality::Lossy, ReleaseType::Single),
        ]);
        let links: Vec<_> = ranked.iter().map(|l| l.link.as_str()).collect();
        assert_eq!(links, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_priority_breaks_ties() {
        let ranked = rank_listings(vec![
            scored("lossy-album", 0.7, Quality::Lossy, ReleaseType::Album),
            scored("lossless-single", 0.7, Quality::Lossless, ReleaseType::Single),
            scored("lossless-album", 0.7, Quality::Lossless, ReleaseType::Album),
        ]);
        let links: Vec<_> = ranked.iter().map(|l| l.link.as_str()).collect();
        assert_eq!(links, vec!["lossless-single", "lossless-album", "lossy-album"]);
    }

    #[test]
    fn test_full_ties_keep_discovery_order() {
        let ranked = rank_listings(vec![
            scored("first", 0.5, Quality::Lossy, ReleaseType::Single),
            scored("second", 0.5, Quality::Lossy, ReleaseType::Single),
            scored("third", 0.5, Quality::Lossy, ReleaseType::Single),
        ]);
        let links: Vec<_> = ranked.iter().map(|l| l.link.as_str()).collect();
        assert_eq!(links, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_artist_listing_beats_bare_title() {
        use crate::services::search_cascade::{SearchStrategy, listing_from_row};
        use crate::types::SearchRow;

        let mut listings = vec![
            listing_from_row(
                SearchRow::new("The Beatles - Yesterday (1965) [MP3]", "https://x/1"),
                SearchStrategy::ArtistTitle,
            ),
            listing_from_row(SearchRow::new("Yesterday", "https://x/2"), SearchStrategy::Title),
        ];
        score_listings(&mut listings, &Track::new("The Beatles", "Yesterday", "Help!"));

        let beatles = listings[0].match_score.unwrap();
        let bare = listings[1].match_score.unwrap();
        assert!((beatles - 0.5504).abs() < 1e-3, "{beatles}");
        assert!((bare - 0.5408).abs() < 1e-3, "{bare}");

        let ranked = rank_listings(listings);
        assert_eq!(ranked[0].link, "https://x/1");
    }

    #[test]
    fn test_score_listings_uses_cleaned_targets() {
        let mut listings = vec![scored("a", 0.0, Quality::Lossy, ReleaseType::Album)];
        listings[0].title = "Help".to_string();
        listings[0].match_score = None;

        // "Help!" cleans to "Help", an exact album match
        score_listings(&mut listings, &Track::new("", "", "Help!"));
        let score = listings[0].match_score.unwrap();
        assert!((score - 0.2).abs() < 1e-9, "{score}");
    }
}
