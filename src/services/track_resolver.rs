//! Track resolution pipeline
//!
//! Takes a track from lookup to file selection: find the best listing, fetch
//! its release descriptor, save it, and pick the matching file from its
//! manifest. Every step is optional after the first; a failing step is logged
//! and leaves the remaining fields of the [`TrackResolution`] empty.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use super::best_listing::select_best;
use super::file_matcher::{select_files, wanted_indices};
use crate::config::Config;
use crate::indexer::Indexer;
use crate::torrent::parse_torrent_files;
use crate::types::{FileEntry, Listing, MatchCandidate, Track};

/// Outcome of resolving one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackResolution {
    pub track: Track,
    /// Best listing, `None` when nothing was found
    pub listing: Option<Listing>,
    pub download_url: Option<String>,
    /// Where the release descriptor was saved
    pub torrent_path: Option<PathBuf>,
    /// Normalized manifest of the release
    pub files: Vec<FileEntry>,
    /// Best matching file inside the release
    pub selected: Option<MatchCandidate>,
}

impl TrackResolution {
    fn new(track: Track) -> Self {
        Self {
            track,
            listing: None,
            download_url: None,
            torrent_path: None,
            files: Vec::new(),
            selected: None,
        }
    }

    pub fn found(&self) -> bool {
        self.listing.is_some()
    }

    /// Manifest indices a download client should fetch.
    ///
    /// The selected file alone, or the whole release when no file matched.
    pub fn wanted_indices(&self) -> Vec<usize> {
        wanted_indices(&self.files, self.selected.as_slice(), 1)
    }
}

/// Drives tracks through the pipeline against one catalog
pub struct TrackResolver<'a> {
    indexer: &'a dyn Indexer,
    config: &'a Config,
}

impl<'a> TrackResolver<'a> {
    pub fn new(indexer: &'a dyn Indexer, config: &'a Config) -> Self {
        Self { indexer, config }
    }

    /// Resolve a single track; never fails
    pub async fn resolve_track(&self, track: &Track) -> TrackResolution {
        info!(track = %track, "Resolving track");
        let mut resolution = TrackResolution::new(track.clone());

        let Some(listing) = select_best(self.indexer, track).await else {
            info!(track = %track, "Not found");
            return resolution;
        };
        let link = listing.link.clone();
        resolution.listing = Some(listing);

        if !self.config.download_torrents {
            return resolution;
        }

        let url = match self.indexer.download_url(&link).await {
            Ok(Some(url)) => url,
            Ok(None) => return resolution,
            Err(e) => {
                warn!(link = %link, error = %e, "Failed to get download URL");
                return resolution;
            }
        };
        resolution.download_url = Some(url.clone());

        let bytes = match self.indexer.download(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to download torrent");
                return resolution;
            }
        };

        match self.save_descriptor(track, &bytes).await {
            Ok(path) => {
                info!(path = %path.display(), "Saved torrent");
                resolution.torrent_path = Some(path);
            }
            Err(e) => warn!(error = %e, "Failed to save torrent"),
        }

        if self.config.selective_download {
            match parse_torrent_files(&bytes) {
                Ok(files) => {
                    resolution.selected = select_files(&files, &track.title, &track.artist)
                        .into_iter()
                        .next();
                    match resolution.selected {
                        Some(ref c) => info!(
                            file = %c.file.path,
                            score = %format!("{:.3}", c.match_score),
                            "Selected file"
                        ),
                        None => warn!(
                            files = files.len(),
                            "No matching file, will download everything"
                        ),
                    }
                    resolution.files = files;
                }
                Err(e) => warn!(error = %e, "Failed to read torrent manifest"),
            }
        }

        resolution
    }

    /// Resolve tracks one after another, pausing between them.
    ///
    /// `limit` caps how many tracks from the front of the list are processed.
    pub async fn resolve_tracks(
        &self,
        tracks: &[Track],
        limit: Option<usize>,
    ) -> Vec<TrackResolution> {
        let count = limit.unwrap_or(tracks.len()).min(tracks.len());
        let mut resolutions = Vec::with_capacity(count);

        for (i, track) in tracks.iter().take(count).enumerate() {
            if i > 0 && !self.config.track_delay.is_zero() {
                tokio::time::sleep(self.config.track_delay).await;
            }
            info!(current = i + 1, total = count, "Processing track");
            resolutions.push(self.resolve_track(track).await);
        }

        let found = resolutions.iter().filter(|r| r.found()).count();
        info!(found, total = count, "Batch complete");
        resolutions
    }

    async fn save_descriptor(&self, track: &Track, bytes: &[u8]) -> Result<PathBuf> {
        let dir = &self.config.torrents_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join(format!("{}.torrent", sanitize_filename::sanitize(track.to_string())));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
