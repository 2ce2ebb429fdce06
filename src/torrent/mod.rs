//! Release descriptor handling

pub mod manifest;

pub use manifest::{
    RawManifest, RawManifestEntry, TorrentSummary, audio_files, audio_summary, normalize,
    parse_raw_manifest, parse_torrent_files, torrent_summary,
};
