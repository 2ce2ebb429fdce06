//! Listing classification from free-text titles
//!
//! Catalog titles carry format and scope hints ("[FLAC]", "Discography",
//! "2 CD"). Only whole-word markers count, so "flaccid" is not FLAC.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Classification, Quality, ReleaseType};

/// Lossless markers; includes the Chinese "lossless" tag
static LOSSLESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(flac|ape|wav|24bit|lossless|无损)\b").expect("valid lossless regex")
});

/// Album-sized release markers; includes Russian "discography" and "compilation"
static ALBUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(album|discography|дискография|сборник|compilation|collection",
        r"|disc|lp|ep|cd|box)\b"
    ))
    .expect("valid album regex")
});

/// Derive quality and release type from a raw listing title
pub fn classify(title: &str) -> Classification {
    let quality = if LOSSLESS_RE.is_match(title) {
        Quality::Lossless
    } else {
        Quality::Lossy
    };

    let release_type = if ALBUM_RE.is_match(title) {
        ReleaseType::Album
    } else {
        ReleaseType::Single
    };

    Classification::new(quality, release_type)
}
