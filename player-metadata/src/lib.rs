//! # Metadata Resolution Module
//!
//! Resolves the best available metadata for a local media file: title,
//! artist, album, cover image, lyrics, and style tags.
//!
//! ## Overview
//!
//! This crate handles:
//! - Filename-derived defaults (`artist - title` parsing, file size formatting)
//! - Embedded tag extraction via `lofty`, raced against a wall-clock timeout
//! - Companion lyric file discovery with fuzzy matching
//! - Network enrichment for lyrics and covers when local sources miss
//! - Style-label lookup and batch enrichment backed by the label store
//! - Label-based recommendations
//!
//! Resolution is best-effort: any sub-step failure degrades to the
//! filename-derived defaults instead of propagating. Only the initial
//! file-existence/extension precondition is reported to the caller.

pub mod basic;
pub mod error;
pub mod extractor;
pub mod labels;
pub mod lyrics_local;
pub mod providers;
pub mod recommend;
pub mod resolver;
pub mod types;

pub use error::{MetadataError, Result};
pub use labels::{BatchItemResult, LabelService};
pub use recommend::{recommend_similar, Recommendation};
pub use resolver::MetadataResolver;
pub use types::{CoverImage, FieldSource, MediaMetadata, MetadataOrigin};
