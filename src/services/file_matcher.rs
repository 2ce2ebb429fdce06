//! File matching inside a release
//!
//! Given the manifest of a downloaded release and the target track, scores
//! every audio file and keeps the ones that clear [`FILE_MATCH_THRESHOLD`].
//! Non-audio files (cover art, cue sheets, logs) are dropped before scoring.
//!
//! ## Scoring Formula
//! ```text
//! score = 0.4 × max(title_sim(name), title_sim(path))
//!       + 0.3 × max(artist_sim(name), artist_sim(path))
//!       + 0.2 × title_word_fraction + 0.1 × artist_word_fraction
//! ```
//! Word fractions treat `.`, `_` and `-` in the file name as separators.

use std::collections::HashSet;

use tracing::debug;

use super::text_utils::{similarity, word_overlap, words_of};
use crate::types::{FileEntry, MatchCandidate};

/// Audio file extensions (lowercase)
pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".flac", ".wav", ".aac", ".ogg", ".m4a", ".wma"];

/// Minimum score for a file to count as a match
pub const FILE_MATCH_THRESHOLD: f64 = 0.3;

const TITLE_WEIGHT: f64 = 0.4;
const ARTIST_WEIGHT: f64 = 0.3;
const TITLE_WORDS_WEIGHT: f64 = 0.2;
const ARTIST_WORDS_WEIGHT: f64 = 0.1;

/// Check if a file is an audio file based on extension
///
/// # Example
/// ```
/// use trackmatch::services::file_matcher::is_audio_file;
/// assert!(is_audio_file("01 - Yesterday.FLAC"));
/// assert!(!is_audio_file("cover.jpg"));
/// ```
pub fn is_audio_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Word set of a file name, splitting on `.`, `_` and `-` as well as whitespace
fn file_words(name: &str) -> HashSet<String> {
    words_of(&name.replace(['.', '_', '-'], " "))
}

/// Score one file against the target title and artist
pub fn score_file(file: &FileEntry, title: &str, artist: &str) -> f64 {
    let name_text = file.name.to_lowercase();
    let path_text = file.path.to_lowercase();
    let title = title.to_lowercase();
    let artist = artist.to_lowercase();

    let title_sim = similarity(&title, &name_text).max(similarity(&title, &path_text));
    let artist_sim = similarity(&artist, &name_text).max(similarity(&artist, &path_text));

    let words = file_words(&name_text);
    let title_words = word_overlap(&words_of(&title), &words);
    let artist_words = word_overlap(&words_of(&artist), &words);

    TITLE_WEIGHT * title_sim
        + ARTIST_WEIGHT * artist_sim
        + TITLE_WORDS_WEIGHT * title_words
        + ARTIST_WORDS_WEIGHT * artist_words
}

/// Rank the audio files of a manifest against a target track, best first.
///
/// Only files scoring above [`FILE_MATCH_THRESHOLD`] are returned. The sort is
/// stable, so equal scores keep manifest order.
pub fn select_files(manifest: &[FileEntry], title: &str, artist: &str) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = manifest
        .iter()
        .filter(|file| is_audio_file(&file.name))
        .filter_map(|file| {
            let match_score = score_file(file, title, artist);
            debug!(file = %file.path, score = match_score, "Scored file");
            (match_score > FILE_MATCH_THRESHOLD).then(|| MatchCandidate {
                file: file.clone(),
                match_score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    candidates
}

/// Manifest indices to fetch for a selection.
///
/// Takes the first `limit` candidates; when nothing matched, every file in the
/// manifest is wanted.
pub fn wanted_indices(
    manifest: &[FileEntry],
    candidates: &[MatchCandidate],
    limit: usize,
) -> Vec<usize> {
    if candidates.is_empty() {
        return manifest.iter().map(|f| f.index).collect();
    }
    candidates.iter().take(limit).map(|c| c.file.index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_file(index: usize, path: &str) -> FileEntry {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        FileEntry {
            index,
            path: path.to_string(),
            name,
            length: 30_000_000,
        }
    }

    fn album_manifest() -> Vec<FileEntry> {
        vec![
            make_file(0, "The Beatles - Help! (1965)/01 - Help!.flac"),
            make_file(1, "The Beatles - Help! (1965)/13 - Yesterday.flac"),
            make_file(2, "The Beatles - Help! (1965)/14 - Dizzy Miss Lizzy.flac"),
            make_file(3, "The Beatles - Help! (1965)/cover.jpg"),
            make_file(4, "The Beatles - Help! (1965)/Help.cue"),
        ]
    }

    #[test]
    fn test_is_audio_file() {
        for name in ["a.mp3", "a.FLAC", "a.wav", "a.aac", "a.ogg", "a.m4a", "a.wma"] {
            assert!(is_audio_file(name), "{name}");
        }
        for name in ["cover.jpg", "album.cue", "rip.log", "flac", "notes.txt"] {
            assert!(!is_audio_file(name), "{name}");
        }
    }

    #[test]
    fn test_file_words_separators() {
        let words = file_words("13_yesterday-the.beatles.flac");
        for w in ["13", "yesterday", "the", "beatles", "flac"] {
            assert!(words.contains(w), "{w}");
        }
    }

    #[test]
    fn test_selects_matching_track() {
        let candidates = select_files(&album_manifest(), "Yesterday", "The Beatles");

        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].file.index, 1);
        assert_eq!(candidates[0].file.name, "13 - Yesterday.flac");
        assert!(candidates[0].match_score > FILE_MATCH_THRESHOLD);
        for pair in candidates.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
    }

    #[test]
    fn test_non_audio_never_selected() {
        // A cover named exactly like the target still never shows up
        let manifest = vec![
            make_file(0, "Yesterday The Beatles.jpg"),
            make_file(1, "cover.jpg"),
        ];
        assert!(select_files(&manifest, "Yesterday", "The Beatles").is_empty());

        let candidates = select_files(&album_manifest(), "cover", "The Beatles");
        assert!(candidates.iter().all(|c| c.file.name != "cover.jpg"));
    }

    #[test]
    fn test_threshold_filters_unrelated() {
        let manifest = vec![make_file(0, "zzz/qqq.mp3")];
        assert!(select_files(&manifest, "Yesterday", "The Beatles").is_empty());
    }

    #[test]
    fn test_empty_targets_do_not_panic() {
        let candidates = select_files(&album_manifest(), "", "");
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_exact_name_scores_high() {
        let file = make_file(0, "Yesterday.mp3");
        let score = score_file(&file, "Yesterday", "");
        assert!(score > 0.5, "{score}");
    }

    #[test]
    fn test_wanted_indices() {
        let manifest = album_manifest();
        let candidates = select_files(&manifest, "Yesterday", "The Beatles");
        assert_eq!(wanted_indices(&manifest, &candidates, 1), vec![1]);
        assert_eq!(wanted_indices(&manifest, &[], 1), vec![0, 1, 2, 3, 4]);
    }
}
