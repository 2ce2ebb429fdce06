//! Torrent manifest parsing
//!
//! Extracts the file list of a .torrent descriptor without downloading any
//! content. Both descriptor shapes (a single implicit file, or an explicit
//! list of files) normalize to the same [`FileEntry`] list.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::services::file_matcher::is_audio_file;
use crate::types::FileEntry;

/// Release manifest as published by the descriptor, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawManifest {
    /// One implicit file named after the release
    SingleFile { name: String, length: u64 },
    /// An explicit, ordered list of files
    MultiFile(Vec<RawManifestEntry>),
}

/// One entry of a multi-file manifest; either field may be missing in a malformed descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawManifestEntry {
    pub path: Vec<String>,
    pub length: Option<u64>,
}

impl RawManifestEntry {
    pub fn new(path: &[&str], length: u64) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            length: Some(length),
        }
    }
}

/// Normalize a raw manifest into file entries.
///
/// Entries without a length or with an empty path are skipped; the remaining
/// entries keep their position in the manifest as their index.
pub fn normalize(raw: RawManifest) -> Vec<FileEntry> {
    match raw {
        RawManifest::SingleFile { name, length } => vec![FileEntry {
            index: 0,
            path: name.clone(),
            name,
            length,
        }],
        RawManifest::MultiFile(entries) => entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let Some(length) = entry.length else {
                    debug!(index, "Skipping manifest entry without length");
                    return None;
                };
                let Some(name) = entry.path.last().filter(|n| !n.is_empty()).cloned() else {
                    debug!(index, "Skipping manifest entry without path");
                    return None;
                };
                Some(FileEntry {
                    index,
                    path: entry.path.join("/"),
                    name,
                    length,
                })
            })
            .collect(),
    }
}

// Minimal bencode structures for extracting file info

#[derive(Debug, Deserialize)]
struct BencodeFile {
    #[serde(default)]
    length: Option<u64>,
    #[serde(default)]
    path: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BencodeInfo {
    name: String,
    #[serde(default)]
    length: Option<u64>,
    #[serde(default)]
    files: Option<Vec<BencodeFile>>,
    #[serde(default, rename = "piece length")]
    piece_length: Option<u64>,
    #[serde(default)]
    private: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BencodeTorrent {
    info: BencodeInfo,
    #[serde(default)]
    announce: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default, rename = "created by")]
    created_by: Option<String>,
    #[serde(default, rename = "creation date")]
    creation_date: Option<i64>,
}

impl BencodeInfo {
    fn raw_manifest(&self) -> Option<RawManifest> {
        if let Some(ref files) = self.files {
            return Some(RawManifest::MultiFile(
                files
                    .iter()
                    .map(|f| RawManifestEntry {
                        path: f.path.clone(),
                        length: f.length,
                    })
                    .collect(),
            ));
        }
        self.length.map(|length| RawManifest::SingleFile {
            name: self.name.clone(),
            length,
        })
    }
}

fn decode(torrent_bytes: &[u8]) -> Result<BencodeTorrent> {
    serde_bencode::from_bytes(torrent_bytes).context("Failed to parse torrent file")
}

/// Decode the raw manifest of a .torrent descriptor
pub fn parse_raw_manifest(torrent_bytes: &[u8]) -> Result<RawManifest> {
    let torrent = decode(torrent_bytes)?;
    torrent
        .info
        .raw_manifest()
        .context("Torrent info has neither files nor length")
}

/// Parse a .torrent descriptor and extract its file list
///
/// # Example
/// ```ignore
/// let torrent_bytes = std::fs::read("album.torrent")?;
/// for file in parse_torrent_files(&torrent_bytes)? {
///     println!("{}: {} bytes", file.path, file.length);
/// }
/// ```
pub fn parse_torrent_files(torrent_bytes: &[u8]) -> Result<Vec<FileEntry>> {
    Ok(normalize(parse_raw_manifest(torrent_bytes)?))
}

/// Basic descriptor information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentSummary {
    pub name: String,
    pub announce: Option<String>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    /// Unix timestamp
    pub creation_date: Option<i64>,
    pub is_private: bool,
    pub piece_length: Option<u64>,
    /// Sum of all file lengths
    pub total_size: u64,
    pub file_count: usize,
}

/// Summarize a .torrent descriptor
pub fn torrent_summary(torrent_bytes: &[u8]) -> Result<TorrentSummary> {
    let torrent = decode(torrent_bytes)?;
    let files = torrent.info.raw_manifest().map(normalize).unwrap_or_default();

    Ok(TorrentSummary {
        name: torrent.info.name,
        announce: torrent.announce,
        comment: torrent.comment,
        created_by: torrent.created_by,
        creation_date: torrent.creation_date,
        is_private: torrent.info.private == Some(1),
        piece_length: torrent.info.piece_length,
        total_size: files.iter().map(|f| f.length).sum(),
        file_count: files.len(),
    })
}

/// Extract only audio files from a manifest
pub fn audio_files(files: &[FileEntry]) -> Vec<&FileEntry> {
    files.iter().filter(|f| is_audio_file(&f.name)).collect()
}

/// A tuple of (audio_file_count, total_file_count, total_audio_size_bytes)
pub fn audio_summary(files: &[FileEntry]) -> (usize, usize, u64) {
    let audio = audio_files(files);
    let audio_size = audio.iter().map(|f| f.length).sum();
    (audio.len(), files.len(), audio_size)
}
