//! Domain models for the label store

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted style-label record for a music file.
///
/// Keyed by absolute file path (UNIQUE). A `None` or empty `style_label`
/// means the record is still pending enrichment by the tagging service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MusicLabelRecord {
    /// Row id
    pub id: i64,
    /// File name including extension
    pub file_name: String,
    /// Absolute path, unique per record
    pub file_path: String,
    /// JSON-encoded array of style tags, or legacy comma-joined text
    pub style_label: Option<String>,
    /// Unix seconds
    pub created_at: i64,
    /// Unix seconds
    pub updated_at: i64,
}

impl MusicLabelRecord {
    /// Whether this record still needs a style label
    pub fn is_pending(&self) -> bool {
        match &self.style_label {
            None => true,
            Some(label) => label.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(style_label: Option<&str>) -> MusicLabelRecord {
        MusicLabelRecord {
            id: 1,
            file_name: "song.mp3".to_string(),
            file_path: "/music/song.mp3".to_string(),
            style_label: style_label.map(|s| s.to_string()),
            created_at: 1700000000,
            updated_at: 1700000000,
        }
    }

    #[test]
    fn test_is_pending() {
        assert!(record(None).is_pending());
        assert!(record(Some("")).is_pending());
        assert!(!record(Some(r#"["rock","pop"]"#)).is_pending());
    }
}
