//! Embedded tag extraction via `lofty`
//!
//! Reads ID3v2, Vorbis Comments, MP4 tags, and FLAC metadata. The reader
//! sits behind a trait so the resolver's timeout race can be exercised
//! against arbitrarily slow stand-ins in tests.

use async_trait::async_trait;
use bytes::Bytes;
use lofty::config::ParseOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, PictureType};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::Path;
use tracing::debug;

use crate::error::{MetadataError, Result};

/// Tag fields pulled out of a media file. All optional; an untagged file
/// yields a value where [`EmbeddedTags::is_empty`] is true.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub cover: Option<EmbeddedPicture>,
}

impl EmbeddedTags {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.comment.is_none()
            && self.cover.is_none()
    }
}

/// An embedded cover image.
#[derive(Debug, Clone)]
pub struct EmbeddedPicture {
    pub data: Bytes,
    pub mime_type: String,
}

/// Reads embedded tags from a file on disk.
#[async_trait]
pub trait TagReader: Send + Sync {
    /// Read the embedded tags of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ExtractionFailed`] when the file cannot be
    /// read or its container format cannot be parsed.
    async fn read_tags(&self, path: &Path) -> Result<EmbeddedTags>;
}

/// [`TagReader`] backed by the `lofty` crate.
pub struct LoftyTagReader {
    parse_options: ParseOptions,
}

impl LoftyTagReader {
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::new(),
        }
    }

    fn mime_type_to_string(mime_type: &MimeType) -> String {
        match mime_type {
            MimeType::Png => "image/png".to_string(),
            MimeType::Jpeg => "image/jpeg".to_string(),
            MimeType::Tiff => "image/tiff".to_string(),
            MimeType::Bmp => "image/bmp".to_string(),
            MimeType::Gif => "image/gif".to_string(),
            _ => "application/octet-stream".to_string(),
        }
    }

    /// Pick the front cover if one is marked as such, otherwise the first
    /// usable picture.
    fn extract_cover(tag: &lofty::tag::Tag) -> Option<EmbeddedPicture> {
        let pictures = tag.pictures();

        let pick = pictures
            .iter()
            .find(|pic| pic.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())?;

        if pick.data().is_empty() {
            return None;
        }

        let mime_type = pick
            .mime_type()
            .map(Self::mime_type_to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Some(EmbeddedPicture {
            data: Bytes::copy_from_slice(pick.data()),
            mime_type,
        })
    }
}

impl Default for LoftyTagReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_tags(parse_options: ParseOptions, file_data: Vec<u8>) -> Result<EmbeddedTags> {
    let tagged_file = Probe::new(std::io::Cursor::new(&file_data))
        .options(parse_options)
        .guess_file_type()
        .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to probe file: {}", e)))?
        .read()
        .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to parse file: {}", e)))?;

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let Some(tag) = tag else {
        return Ok(EmbeddedTags::default());
    };

    let non_empty = |s: std::borrow::Cow<'_, str>| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    Ok(EmbeddedTags {
        title: tag.title().and_then(non_empty),
        artist: tag.artist().and_then(non_empty),
        album: tag.album().and_then(non_empty),
        year: tag.year(),
        genre: tag.genre().and_then(non_empty),
        comment: tag.comment().and_then(non_empty),
        cover: LoftyTagReader::extract_cover(tag),
    })
}

#[async_trait]
impl TagReader for LoftyTagReader {
    async fn read_tags(&self, path: &Path) -> Result<EmbeddedTags> {
        debug!(path = %path.display(), "Reading embedded tags");

        let file_data = tokio::fs::read(path).await.map_err(|e| {
            MetadataError::ExtractionFailed(format!("Failed to read file: {}", e))
        })?;

        // Container parsing is CPU-bound, keep it off the async threads
        let parse_options = self.parse_options;
        let tags = tokio::task::spawn_blocking(move || parse_tags(parse_options, file_data))
            .await
            .map_err(|e| MetadataError::ExtractionFailed(format!("Tag parse task failed: {}", e)))??;

        if tags.is_empty() {
            debug!(path = %path.display(), "No tags present");
        }

        Ok(tags)
    }
}
