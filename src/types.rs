//! Core types shared by the match engine
//!
//! A [`Track`] goes in, [`Listing`]s come out of the search cascade, and a
//! release manifest is described by [`FileEntry`] values. Everything here is
//! created fresh per resolution call; nothing is cached between calls.

use serde::{Deserialize, Serialize};

/// A music track to look up on the catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Track {
    pub artist: String,
    pub title: String,
    pub album: String,
}

impl Track {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Audio quality derived from a listing title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Lossless,
    Lossy,
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Lossless => write!(f, "lossless"),
            Quality::Lossy => write!(f, "lossy"),
        }
    }
}

/// Whether a listing looks like a single release or an album-sized one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Single,
    Album,
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseType::Single => write!(f, "single"),
            ReleaseType::Album => write!(f, "album"),
        }
    }
}

/// Quality and release type of a listing, as read from its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub quality: Quality,
    pub release_type: ReleaseType,
}

impl Classification {
    pub const fn new(quality: Quality, release_type: ReleaseType) -> Self {
        Self {
            quality,
            release_type,
        }
    }

    /// Tie-break rank: lossless single 4, lossless album 3, lossy single 2, lossy album 1
    pub const fn priority(&self) -> u8 {
        match (self.quality, self.release_type) {
            (Quality::Lossless, ReleaseType::Single) => 4,
            (Quality::Lossless, ReleaseType::Album) => 3,
            (Quality::Lossy, ReleaseType::Single) => 2,
            (Quality::Lossy, ReleaseType::Album) => 1,
        }
    }
}

/// One row of a catalog search page, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRow {
    /// Title as displayed by the catalog
    pub title: String,
    /// Absolute URL of the listing page
    pub link: String,
}

impl SearchRow {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// A classified catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Raw title as displayed by the catalog
    pub title: String,
    /// Canonical absolute URL; unique within a deduplicated candidate set
    pub link: String,
    pub classification: Classification,
    /// Label of the search strategy that first produced this listing (diagnostics only)
    pub strategy: String,
    /// Assigned by the listing scorer
    pub match_score: Option<f64>,
}

impl Listing {
    pub fn quality(&self) -> Quality {
        self.classification.quality
    }

    pub fn release_type(&self) -> ReleaseType {
        self.classification.release_type
    }

    pub fn priority(&self) -> u8 {
        self.classification.priority()
    }
}

/// A file inside a release manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Position within the manifest, used to address the file in a download client
    pub index: usize,
    /// Full relative path, slash separated
    pub path: String,
    /// Final path segment
    pub name: String,
    /// Size in bytes
    pub length: u64,
}

/// A manifest file that passed the file matcher's threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub file: FileEntry,
    pub match_score: f64,
}
