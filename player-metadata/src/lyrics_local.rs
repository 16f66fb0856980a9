//! Companion lyric file discovery
//!
//! Looks for an `.lrc` file belonging to a media file before any network
//! lookup happens. Matching runs in priority order: exact stem match,
//! prefix match, artist/title or fuzzy stem match, and finally the
//! only-lrc-in-directory fallback. Directory entries are visited in
//! sorted order so ties resolve deterministically.

use std::path::{Path, PathBuf};
use strsim::normalized_levenshtein;
use tracing::debug;

use crate::error::Result;
use crate::types::UNKNOWN_ARTIST;

/// Companion lyric extension (matched case-insensitively).
pub const LYRICS_EXTENSION: &str = "lrc";

/// Minimum normalized Levenshtein similarity for a fuzzy stem match.
const FUZZY_THRESHOLD: f64 = 0.7;

/// Normalized Levenshtein similarity in `[0, 1]`, case-insensitive.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

fn is_lyrics_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(LYRICS_EXTENSION))
        .unwrap_or(false)
}

/// Find the companion lyric file for `media_path`, if any.
///
/// `artist` and `title` feed the name-contains heuristic; the artist is
/// skipped when empty or still the placeholder. Returns `Ok(None)` when
/// the directory holds no plausible candidate. Directory read errors
/// propagate; the caller degrades them.
pub async fn find_companion_lyrics(
    media_path: &Path,
    artist: &str,
    title: &str,
) -> Result<Option<PathBuf>> {
    let stem = match media_path.file_stem().and_then(|s| s.to_str()) {
        Some(s) => s,
        None => return Ok(None),
    };
    let dir = match media_path.parent() {
        Some(d) => d,
        None => return Ok(None),
    };

    // Exact stem match, common extension casings first
    for ext in [LYRICS_EXTENSION, "LRC", "Lrc"] {
        let candidate = dir.join(format!("{}.{}", stem, ext));
        if tokio::fs::try_exists(&candidate).await? {
            debug!(path = %candidate.display(), "Found lyrics by exact stem match");
            return Ok(Some(candidate));
        }
    }

    let mut lyric_files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_lyrics_file(&path) {
            lyric_files.push(path);
        }
    }
    lyric_files.sort();

    let stem_lower = stem.to_lowercase();

    // Prefix match on the media stem
    for candidate in &lyric_files {
        let candidate_stem = candidate
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if candidate_stem.to_lowercase().starts_with(&stem_lower) {
            debug!(path = %candidate.display(), "Found lyrics by prefix match");
            return Ok(Some(candidate.clone()));
        }
    }

    // Name contains artist or title, or the stems are close enough
    let artist_lower = artist.trim().to_lowercase();
    let artist_usable = !artist_lower.is_empty() && artist != UNKNOWN_ARTIST;
    let title_lower = title.trim().to_lowercase();

    for candidate in &lyric_files {
        let candidate_stem = candidate
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let candidate_lower = candidate_stem.to_lowercase();

        let by_artist = artist_usable && candidate_lower.contains(&artist_lower);
        let by_title = !title_lower.is_empty() && candidate_lower.contains(&title_lower);
        let by_fuzzy = string_similarity(candidate_stem, stem) > FUZZY_THRESHOLD;

        if by_artist || by_title || by_fuzzy {
            debug!(path = %candidate.display(), "Found lyrics by name similarity");
            return Ok(Some(candidate.clone()));
        }
    }

    // A lone lyric file in the directory is assumed to belong to us
    if lyric_files.len() == 1 {
        debug!(path = %lyric_files[0].display(), "Found lyrics as only candidate");
        return Ok(Some(lyric_files.remove(0)));
    }

    Ok(None)
}

/// Read a lyric file as text.
///
/// Tries UTF-8 first and falls back to GB18030, which covers the GBK and
/// GB2312 encodings common in older Chinese lyric files.
pub async fn read_lyrics_file(path: &Path) -> Result<String> {
    let raw = tokio::fs::read(path).await?;

    match String::from_utf8(raw) {
        Ok(text) => Ok(text),
        Err(err) => {
            let (decoded, _, _) = encoding_rs::GB18030.decode(err.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}
