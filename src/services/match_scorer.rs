//! Weighted scoring of catalog listings against a target track
//!
//! ## Scoring Formula
//! ```text
//! combined = 0.3 × artist_sim + 0.3 × track_sim + 0.2 × album_sim
//!          + 0.1 × artist_word_fraction + 0.1 × track_word_fraction
//! score    = combined + 0.10 (lossless) + 0.05 (single)
//! ```
//!
//! Similarities compare each target field with the whole lowercased title.
//! No clamping is applied, so scores sit roughly in `[0, 1.15]`.

use super::text_utils::{similarity, word_overlap, words_of};
use crate::types::{Listing, Quality, ReleaseType};

// ============================================================================
// Weight Constants
// ============================================================================

pub const ARTIST_WEIGHT: f64 = 0.3;
pub const TRACK_WEIGHT: f64 = 0.3;
pub const ALBUM_WEIGHT: f64 = 0.2;
pub const ARTIST_WORDS_WEIGHT: f64 = 0.1;
pub const TRACK_WORDS_WEIGHT: f64 = 0.1;

pub const LOSSLESS_BONUS: f64 = 0.10;
pub const SINGLE_BONUS: f64 = 0.05;

/// Per-component view of a listing score, handy for debug logging
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub artist_sim: f64,
    pub track_sim: f64,
    pub album_sim: f64,
    pub artist_words: f64,
    pub track_words: f64,
    pub bonus: f64,
}

impl ScoreBreakdown {
    pub fn combined(&self) -> f64 {
        ARTIST_WEIGHT * self.artist_sim
            + TRACK_WEIGHT * self.track_sim
            + ALBUM_WEIGHT * self.album_sim
            + ARTIST_WORDS_WEIGHT * self.artist_words
            + TRACK_WORDS_WEIGHT * self.track_words
    }

    pub fn total(&self) -> f64 {
        self.combined() + self.bonus
    }

    pub fn summary(&self) -> String {
        format!(
            "total:{:.3} [artist:{:.2} track:{:.2} album:{:.2} \
             artist_words:{:.2} track_words:{:.2} bonus:{:.2}]",
            self.total(),
            self.artist_sim,
            self.track_sim,
            self.album_sim,
            self.artist_words,
            self.track_words,
            self.bonus
        )
    }
}

/// Break a listing's score down into its weighted components
pub fn score_breakdown(
    listing: &Listing,
    artist: &str,
    title: &str,
    album: &str,
) -> ScoreBreakdown {
    let title_text = listing.title.to_lowercase();
    let title_words = words_of(&title_text);

    let mut bonus = 0.0;
    if listing.quality() == Quality::Lossless {
        bonus += LOSSLESS_BONUS;
    }
    if listing.release_type() == ReleaseType::Single {
        bonus += SINGLE_BONUS;
    }

    ScoreBreakdown {
        artist_sim: similarity(&artist.to_lowercase(), &title_text),
        track_sim: similarity(&title.to_lowercase(), &title_text),
        album_sim: similarity(&album.to_lowercase(), &title_text),
        artist_words: word_overlap(&words_of(artist), &title_words),
        track_words: word_overlap(&words_of(title), &title_words),
        bonus,
    }
}

/// Score a listing against the target artist, title and album
pub fn score_listing(listing: &Listing, artist: &str, title: &str, album: &str) -> f64 {
    score_breakdown(listing, artist, title, album).total()
}
