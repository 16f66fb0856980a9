//! End-to-end resolution tests with stubbed readers and providers.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use player_metadata::extractor::{EmbeddedPicture, EmbeddedTags, TagReader};
use player_metadata::providers::{CoverProvider, LyricsProvider};
use player_metadata::types::FieldSource;
use player_metadata::{CoverImage, MediaMetadata, MetadataError, MetadataOrigin, MetadataResolver};

struct StubTagReader {
    tags: EmbeddedTags,
    delay: Duration,
    fail: bool,
}

impl StubTagReader {
    fn with_tags(tags: EmbeddedTags) -> Self {
        Self {
            tags,
            delay: Duration::ZERO,
            fail: false,
        }
    }

    fn empty() -> Self {
        Self::with_tags(EmbeddedTags::default())
    }

    fn slow(delay: Duration) -> Self {
        Self {
            tags: EmbeddedTags::default(),
            delay,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            tags: EmbeddedTags::default(),
            delay: Duration::ZERO,
            fail: true,
        }
    }
}

#[async_trait]
impl TagReader for StubTagReader {
    async fn read_tags(&self, path: &Path) -> player_metadata::Result<EmbeddedTags> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(MetadataError::ExtractionFailed(
                path.to_string_lossy().into_owned(),
            ));
        }
        Ok(self.tags.clone())
    }
}

#[derive(Default)]
struct StubLyricsProvider {
    lyrics: Option<String>,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl LyricsProvider for StubLyricsProvider {
    async fn fetch_lyrics(&self, _: &str, _: &str) -> player_metadata::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MetadataError::LyricsFetchFailed("offline".to_string()));
        }
        Ok(self.lyrics.clone())
    }
}

#[derive(Default)]
struct StubCoverProvider {
    cover: Option<CoverImage>,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl CoverProvider for StubCoverProvider {
    async fn fetch_cover(&self, _: &str, _: &str) -> player_metadata::Result<Option<CoverImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MetadataError::CoverFetchFailed("offline".to_string()));
        }
        Ok(self.cover.clone())
    }
}

async fn media_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, vec![0u8; 1024]).await.unwrap();
    path
}

fn resolver(
    reader: StubTagReader,
    lyrics: Arc<StubLyricsProvider>,
    cover: Arc<StubCoverProvider>,
) -> MetadataResolver {
    MetadataResolver::new(Arc::new(reader), lyrics, cover)
}

#[tokio::test]
async fn unsupported_extension_rejected_before_any_lookup() {
    let lyrics = Arc::new(StubLyricsProvider::default());
    let cover = Arc::new(StubCoverProvider::default());
    let resolver = resolver(StubTagReader::empty(), Arc::clone(&lyrics), Arc::clone(&cover));

    // Path does not exist; the extension gate must fire first
    let result = resolver.resolve(Path::new("/nonexistent/notes.txt")).await;

    assert!(matches!(result, Err(MetadataError::UnsupportedFormat(_))));
    assert_eq!(lyrics.calls.load(Ordering::SeqCst), 0);
    assert_eq!(cover.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_file_rejected() {
    let resolver = resolver(
        StubTagReader::empty(),
        Arc::new(StubLyricsProvider::default()),
        Arc::new(StubCoverProvider::default()),
    );

    let result = resolver.resolve(Path::new("/nonexistent/song.mp3")).await;
    assert!(matches!(result, Err(MetadataError::FileNotFound(_))));
}

#[tokio::test]
async fn embedded_tags_take_precedence_over_filename() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "Wrong Artist - Wrong Title.mp3").await;

    let tags = EmbeddedTags {
        title: Some("Real Title".to_string()),
        artist: Some("Real Artist".to_string()),
        album: Some("Real Album".to_string()),
        year: Some(2019),
        genre: Some("Rock".to_string()),
        comment: None,
        cover: Some(EmbeddedPicture {
            data: Bytes::from_static(&[1, 2, 3]),
            mime_type: "image/jpeg".to_string(),
        }),
    };

    let lyrics = Arc::new(StubLyricsProvider {
        lyrics: Some("[00:00.00] words".to_string()),
        ..Default::default()
    });
    let cover = Arc::new(StubCoverProvider::default());
    let resolver = resolver(
        StubTagReader::with_tags(tags),
        Arc::clone(&lyrics),
        Arc::clone(&cover),
    );

    let meta = resolver.resolve(&path).await.unwrap();

    assert_eq!(meta.origin, MetadataOrigin::EmbeddedTags);
    assert_eq!(meta.title, "Real Title");
    assert_eq!(meta.artist, "Real Artist");
    assert_eq!(meta.album, "Real Album");
    assert_eq!(meta.year, "2019");
    assert_eq!(meta.genre, "Rock");
    assert!(!meta.timed_out);

    // Embedded cover wins; the cover provider is never consulted
    assert_eq!(meta.cover_source, FieldSource::Local);
    assert!(matches!(meta.cover, Some(CoverImage::DataUrl(_))));
    assert_eq!(cover.calls.load(Ordering::SeqCst), 0);

    // No companion file, so lyrics came from the network
    assert_eq!(meta.lyrics_source, FieldSource::Online);
    assert_eq!(lyrics.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn filename_defaults_when_file_has_no_tags() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "Some Artist - Some Song.mp3").await;

    let resolver = resolver(
        StubTagReader::empty(),
        Arc::new(StubLyricsProvider::default()),
        Arc::new(StubCoverProvider::default()),
    );

    let meta = resolver.resolve(&path).await.unwrap();

    assert_eq!(meta.origin, MetadataOrigin::Filename);
    assert_eq!(meta.artist, "Some Artist");
    assert_eq!(meta.title, "Some Song");
    assert_eq!(meta.album, "Unknown Album");
    assert!(meta.cover.is_none());
    assert_eq!(meta.cover_source, FieldSource::None);
}

#[tokio::test]
async fn slow_tag_read_times_out_and_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "Artist - Song.mp3").await;

    let lyrics = Arc::new(StubLyricsProvider {
        lyrics: Some("net lyrics".to_string()),
        ..Default::default()
    });
    let resolver = resolver(
        StubTagReader::slow(Duration::from_secs(30)),
        Arc::clone(&lyrics),
        Arc::new(StubCoverProvider::default()),
    )
    .with_tag_read_timeout(Duration::from_millis(20));

    let meta = resolver.resolve(&path).await.unwrap();

    assert!(meta.timed_out);
    assert_eq!(meta.origin, MetadataOrigin::Filename);
    assert_eq!(meta.artist, "Artist");
    // Enrichment still ran after the timeout
    assert_eq!(meta.lyrics.as_deref(), Some("net lyrics"));
    assert_eq!(meta.lyrics_source, FieldSource::Online);
}

#[tokio::test]
async fn tag_read_failure_degrades_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "Artist - Song.flac").await;

    let resolver = resolver(
        StubTagReader::failing(),
        Arc::new(StubLyricsProvider::default()),
        Arc::new(StubCoverProvider::default()),
    );

    let meta = resolver.resolve(&path).await.unwrap();
    assert_eq!(meta.origin, MetadataOrigin::Filename);
    assert!(!meta.timed_out);
}

#[tokio::test]
async fn provider_failures_never_fail_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "Artist - Song.mp3").await;

    let resolver = resolver(
        StubTagReader::empty(),
        Arc::new(StubLyricsProvider {
            fail: true,
            ..Default::default()
        }),
        Arc::new(StubCoverProvider {
            fail: true,
            ..Default::default()
        }),
    );

    let meta = resolver.resolve(&path).await.unwrap();

    assert_eq!(meta.artist, "Artist");
    assert!(meta.lyrics.is_none());
    assert!(meta.cover.is_none());
    assert_eq!(meta.lyrics_source, FieldSource::None);
    assert_eq!(meta.cover_source, FieldSource::None);
}

#[tokio::test]
async fn companion_lyrics_preempt_network_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "Artist - Song.mp3").await;
    tokio::fs::write(dir.path().join("Artist - Song.lrc"), "[00:01.00] local line")
        .await
        .unwrap();

    let lyrics = Arc::new(StubLyricsProvider {
        lyrics: Some("network line".to_string()),
        ..Default::default()
    });
    let resolver = resolver(
        StubTagReader::empty(),
        Arc::clone(&lyrics),
        Arc::new(StubCoverProvider::default()),
    );

    let meta = resolver.resolve(&path).await.unwrap();

    assert_eq!(meta.lyrics.as_deref(), Some("[00:01.00] local line"));
    assert_eq!(meta.lyrics_source, FieldSource::Local);
    assert_eq!(lyrics.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn network_cover_fills_when_no_embedded_art() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "Artist - Song.mp3").await;

    let cover = Arc::new(StubCoverProvider {
        cover: Some(CoverImage::Url("https://img.example/cover.jpg".to_string())),
        ..Default::default()
    });
    let resolver = resolver(
        StubTagReader::empty(),
        Arc::new(StubLyricsProvider::default()),
        Arc::clone(&cover),
    );

    let meta = resolver.resolve(&path).await.unwrap();

    assert_eq!(meta.cover_source, FieldSource::Online);
    assert_eq!(
        meta.cover,
        Some(CoverImage::Url("https://img.example/cover.jpg".to_string()))
    );
}

#[tokio::test]
async fn every_record_has_populated_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = media_file(&dir, "NoDashName.wav").await;

    let resolver = resolver(
        StubTagReader::empty(),
        Arc::new(StubLyricsProvider::default()),
        Arc::new(StubCoverProvider::default()),
    );

    let meta: MediaMetadata = resolver.resolve(&path).await.unwrap();

    assert_eq!(meta.title, "NoDashName");
    assert_eq!(meta.artist, "Unknown Artist");
    assert_eq!(meta.file_size, "1 KB");
    assert!(meta.last_modified.is_some());
}
