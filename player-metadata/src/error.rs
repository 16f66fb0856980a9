use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to extract metadata: {0}")]
    ExtractionFailed(String),

    #[error("Lyrics fetch failed: {0}")]
    LyricsFetchFailed(String),

    #[error("Cover fetch failed: {0}")]
    CoverFetchFailed(String),

    #[error("Style tagging failed: {0}")]
    TaggingFailed(String),

    #[error("Store error: {0}")]
    Store(#[from] player_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
