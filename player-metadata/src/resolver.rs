//! Metadata resolution pipeline
//!
//! Orchestrates one file's journey from path to [`MediaMetadata`]:
//! preconditions, filename defaults, the embedded-tag read raced against
//! a wall-clock budget, companion lyric discovery, network enrichment,
//! and finally the style label. Every step past the preconditions is
//! best-effort and degrades to what was already resolved.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::basic::basic_metadata;
use crate::error::{MetadataError, Result};
use crate::extractor::{EmbeddedTags, TagReader};
use crate::labels::LabelService;
use crate::lyrics_local::{find_companion_lyrics, read_lyrics_file};
use crate::providers::{CoverProvider, LyricsProvider};
use crate::types::{
    is_audio_file, is_supported_media, CoverImage, FieldSource, MediaMetadata, MetadataOrigin,
};
use player_runtime::config::DEFAULT_TAG_READ_TIMEOUT;

/// Resolves the best available metadata for media files.
pub struct MetadataResolver {
    tag_reader: Arc<dyn TagReader>,
    lyrics_provider: Arc<dyn LyricsProvider>,
    cover_provider: Arc<dyn CoverProvider>,
    label_service: Option<Arc<LabelService>>,
    tag_read_timeout: Duration,
}

impl MetadataResolver {
    pub fn new(
        tag_reader: Arc<dyn TagReader>,
        lyrics_provider: Arc<dyn LyricsProvider>,
        cover_provider: Arc<dyn CoverProvider>,
    ) -> Self {
        Self {
            tag_reader,
            lyrics_provider,
            cover_provider,
            label_service: None,
            tag_read_timeout: DEFAULT_TAG_READ_TIMEOUT,
        }
    }

    /// Attach a label service; audio files then get their style label
    /// resolved as the final step.
    pub fn with_label_service(mut self, label_service: Arc<LabelService>) -> Self {
        self.label_service = Some(label_service);
        self
    }

    /// Override the embedded-tag read budget.
    pub fn with_tag_read_timeout(mut self, timeout: Duration) -> Self {
        self.tag_read_timeout = timeout;
        self
    }

    /// Resolve metadata for `path`.
    ///
    /// # Errors
    ///
    /// Only the preconditions fail the call: an extension outside the
    /// allow-list returns [`MetadataError::UnsupportedFormat`] and a
    /// missing file returns [`MetadataError::FileNotFound`]. Everything
    /// after that degrades into the returned record.
    pub async fn resolve(&self, path: &Path) -> Result<MediaMetadata> {
        // Extension gate comes before any filesystem access
        if !is_supported_media(path) {
            return Err(MetadataError::UnsupportedFormat(
                path.to_string_lossy().into_owned(),
            ));
        }

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MetadataError::FileNotFound(
                path.to_string_lossy().into_owned(),
            ));
        }

        let mut metadata = basic_metadata(path).await?;

        // Race the tag read against the wall-clock budget. The read runs
        // on its own task so a timeout abandons it without cancelling it;
        // a late result is simply discarded.
        let reader = Arc::clone(&self.tag_reader);
        let owned_path = path.to_path_buf();
        let handle = tokio::spawn(async move { reader.read_tags(&owned_path).await });

        match tokio::time::timeout(self.tag_read_timeout, handle).await {
            Ok(Ok(Ok(tags))) if !tags.is_empty() => {
                debug!(path = %path.display(), "Embedded tags read");
                self.merge_tags(&mut metadata, tags);
            }
            Ok(Ok(Ok(_))) => {
                debug!(path = %path.display(), "File has no embedded tags");
            }
            Ok(Ok(Err(e))) => {
                warn!(path = %path.display(), error = %e, "Tag read failed");
            }
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "Tag read task panicked");
            }
            Err(_) => {
                warn!(
                    path = %path.display(),
                    timeout_secs = self.tag_read_timeout.as_secs(),
                    "Tag read timed out, falling back to filename metadata"
                );
                metadata.timed_out = true;
            }
        }

        self.resolve_lyrics(&mut metadata).await;
        self.resolve_cover(&mut metadata).await;
        self.resolve_style_label(&mut metadata).await;

        info!(
            path = %path.display(),
            origin = ?metadata.origin,
            lyrics = ?metadata.lyrics_source,
            cover = ?metadata.cover_source,
            timed_out = metadata.timed_out,
            "Metadata resolved"
        );

        Ok(metadata)
    }

    /// Overlay embedded tag values onto the filename defaults. Absent tag
    /// fields keep their defaults.
    fn merge_tags(&self, metadata: &mut MediaMetadata, tags: EmbeddedTags) {
        metadata.origin = MetadataOrigin::EmbeddedTags;

        if let Some(title) = tags.title {
            metadata.title = title;
        }
        if let Some(artist) = tags.artist {
            metadata.artist = artist;
        }
        if let Some(album) = tags.album {
            metadata.album = album;
        }
        if let Some(year) = tags.year {
            metadata.year = year.to_string();
        }
        if let Some(genre) = tags.genre {
            metadata.genre = genre;
        }
        if let Some(comment) = tags.comment {
            metadata.comment = comment;
        }
        if let Some(picture) = tags.cover {
            metadata.cover = Some(CoverImage::inline(&picture.mime_type, &picture.data));
            metadata.cover_source = FieldSource::Local;
        }
    }

    /// Fill lyrics from a companion file, then from the network.
    async fn resolve_lyrics(&self, metadata: &mut MediaMetadata) {
        match find_companion_lyrics(&metadata.file_path, &metadata.artist, &metadata.title).await {
            Ok(Some(lyrics_path)) => match read_lyrics_file(&lyrics_path).await {
                Ok(text) if !text.trim().is_empty() => {
                    metadata.lyrics = Some(text);
                    metadata.lyrics_source = FieldSource::Local;
                    return;
                }
                Ok(_) => {
                    debug!(path = %lyrics_path.display(), "Companion lyric file is empty");
                }
                Err(e) => {
                    warn!(path = %lyrics_path.display(), error = %e, "Could not read companion lyrics");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(path = %metadata.file_path.display(), error = %e, "Companion lyric scan failed");
            }
        }

        match self
            .lyrics_provider
            .fetch_lyrics(&metadata.title, &metadata.artist)
            .await
        {
            Ok(Some(text)) => {
                metadata.lyrics = Some(text);
                metadata.lyrics_source = FieldSource::Online;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(title = %metadata.title, error = %e, "Network lyrics lookup failed");
            }
        }
    }

    /// Fill the cover from the network when no embedded one was found.
    async fn resolve_cover(&self, metadata: &mut MediaMetadata) {
        if metadata.cover.is_some() {
            return;
        }

        match self
            .cover_provider
            .fetch_cover(&metadata.title, &metadata.artist)
            .await
        {
            Ok(Some(cover)) => {
                metadata.cover = Some(cover);
                metadata.cover_source = FieldSource::Online;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(title = %metadata.title, error = %e, "Network cover lookup failed");
            }
        }
    }

    /// Resolve the style label for audio files when a label service is
    /// attached. Failures leave the field empty.
    async fn resolve_style_label(&self, metadata: &mut MediaMetadata) {
        let Some(service) = &self.label_service else {
            return;
        };
        if !is_audio_file(&metadata.file_path) {
            return;
        }

        match service.process_file(&metadata.file_path).await {
            Ok(record) => {
                metadata.style_label = record.style_label;
            }
            Err(e) => {
                warn!(path = %metadata.file_path.display(), error = %e, "Style label resolution failed");
            }
        }
    }
}
