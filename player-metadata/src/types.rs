//! Metadata record types and extension allow-lists

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Placeholder artist when nothing better is known.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Placeholder album when nothing better is known.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Extensions accepted by the resolver (lowercase, no dot).
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "ogg", "mkv", "avi", "mov", "asf", "wmv", "navi", "3gp", "flv", "f4v", "rmvb",
    "hddvd", "rm", "mp3", "wav", "flac",
];

/// Subset of [`MEDIA_EXTENSIONS`] eligible for style tagging.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg"];

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether the path's extension is in the supported media allow-list.
/// Matching is case-insensitive; a path with no extension is unsupported.
pub fn is_supported_media(path: &Path) -> bool {
    extension_lower(path)
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Whether the path's extension marks it as an audio file.
pub fn is_audio_file(path: &Path) -> bool {
    extension_lower(path)
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Where a resolved field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// Field is absent
    None,
    /// Embedded in the file or found beside it on disk
    Local,
    /// Fetched from a network service
    Online,
}

/// Which path produced the core text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataOrigin {
    /// Parsed out of the file name
    Filename,
    /// Read from the file's embedded tags
    EmbeddedTags,
}

/// A cover image, either inlined or by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CoverImage {
    /// `data:` URL with the image bytes base64-inlined
    DataUrl(String),
    /// Plain URL pointing at the image
    Url(String),
}

impl CoverImage {
    /// Inline raw image bytes as a `data:` URL.
    pub fn inline(mime_type: &str, data: &[u8]) -> Self {
        CoverImage::DataUrl(format!("data:{};base64,{}", mime_type, BASE64.encode(data)))
    }

    /// The URL string, whichever variant holds it.
    pub fn as_str(&self) -> &str {
        match self {
            CoverImage::DataUrl(s) | CoverImage::Url(s) => s,
        }
    }
}

/// Fully resolved metadata for one media file.
///
/// Every field is always populated with at least a filename-derived
/// default; the `*_source`, `origin`, and `timed_out` fields record how
/// much better than the default the resolution got.
#[derive(Debug, Clone, Serialize)]
pub struct MediaMetadata {
    /// Absolute path of the source file
    pub file_path: PathBuf,
    /// File name without extension
    pub file_name: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
    pub comment: String,
    /// Human-readable size, e.g. `"3.52 MB"`
    pub file_size: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub cover: Option<CoverImage>,
    pub cover_source: FieldSource,
    pub lyrics: Option<String>,
    pub lyrics_source: FieldSource,
    /// Style label JSON as stored, e.g. `["rock","indie"]`
    pub style_label: Option<String>,
    pub origin: MetadataOrigin,
    /// True when the embedded-tag read lost the race against the
    /// wall-clock budget and the record fell back to filename defaults
    pub timed_out: bool,
}
