//! Filename-derived defaults
//!
//! Everything here is pure and synchronous apart from the one `stat` call
//! in [`basic_metadata`]. These defaults are what every resolution falls
//! back to when tags, lyrics, and network enrichment all come up empty.

use crate::error::Result;
use crate::types::{FieldSource, MediaMetadata, MetadataOrigin, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Split a file stem into `(artist, title)` on the first dash.
///
/// Recognizes `-`, `–`, and `—` with any surrounding whitespace. When no
/// dash is present the whole stem becomes the title and the artist falls
/// back to [`UNKNOWN_ARTIST`]. Either half may be empty if the stem starts
/// or ends with a dash; that mirrors how the original filenames parse.
pub fn parse_artist_title(stem: &str) -> (String, String) {
    for (idx, ch) in stem.char_indices() {
        if matches!(ch, '-' | '–' | '—') {
            let artist = stem[..idx].trim();
            let title = stem[idx + ch.len_utf8()..].trim();
            return (artist.to_string(), title.to_string());
        }
    }
    (UNKNOWN_ARTIST.to_string(), stem.trim().to_string())
}

/// Format a byte count as a human-readable size.
///
/// Uses 1024-based units with up to two decimals, trailing zeros trimmed:
/// `0` is `"0 Bytes"`, `1024` is `"1 KB"`, `1536` is `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);

    let mut formatted = format!("{:.2}", value);
    if formatted.contains('.') {
        formatted = formatted.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    format!("{} {}", formatted, UNITS[exponent])
}

/// Build the default metadata record for a file from its name and `stat`
/// info alone. The file must exist; extension checks happen before this.
pub async fn basic_metadata(path: &Path) -> Result<MediaMetadata> {
    let stat = tokio::fs::metadata(path).await?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let (artist, title) = parse_artist_title(&stem);

    let last_modified = stat
        .modified()
        .ok()
        .map(|t| DateTime::<Utc>::from(t));

    Ok(MediaMetadata {
        file_path: path.to_path_buf(),
        file_name: stem,
        title,
        artist,
        album: UNKNOWN_ALBUM.to_string(),
        year: String::new(),
        genre: String::new(),
        comment: String::new(),
        file_size: format_file_size(stat.len()),
        last_modified,
        cover: None,
        cover_source: FieldSource::None,
        lyrics: None,
        lyrics_source: FieldSource::None,
        style_label: None,
        origin: MetadataOrigin::Filename,
        timed_out: false,
    })
}
