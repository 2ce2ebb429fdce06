//! Match engine services
//!
//! The engine proper is pure scoring over explicit inputs: [`search_cascade`]
//! gathers listings, [`match_scorer`] and [`best_listing`] pick one, and
//! [`file_matcher`] picks a file inside its release. [`track_resolver`] wires
//! them to the catalog client and the release manifest.

pub mod best_listing;
pub mod classifier;
pub mod file_matcher;
pub mod match_scorer;
pub mod search_cascade;
pub mod sequence_matcher;
pub mod text_utils;
pub mod track_resolver;

pub use best_listing::{rank_listings, score_listings, select_best};
pub use classifier::classify;
pub use file_matcher::{is_audio_file, select_files, wanted_indices};
pub use match_scorer::{ScoreBreakdown, score_breakdown, score_listing};
pub use search_cascade::{SearchStrategy, planned_queries, resolve};
pub use text_utils::similarity;
pub use track_resolver::{TrackResolution, TrackResolver};
