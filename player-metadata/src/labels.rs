//! Style-label lookup and batch enrichment
//!
//! Ties the label store to the external style-tagging service. Single-file
//! processing is the resolver's step; batch processing is the background
//! enrichment job that sweeps a library in throttled chunks.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{MetadataError, Result};
use crate::types::is_audio_file;
use player_runtime::config::{BatchConfig, EndpointConfig};
use player_store::models::MusicLabelRecord;
use player_store::repositories::LabelRepository;

/// Classifies a file into style labels.
#[async_trait]
pub trait StyleTagger: Send + Sync {
    /// Classify `path`. Returns the label string to store, or `Ok(None)`
    /// when the service had no answer for this file.
    async fn tag_file(&self, path: &Path) -> Result<Option<String>>;
}

#[derive(Serialize)]
struct TagRequest<'a> {
    path: &'a str,
}

/// [`StyleTagger`] backed by the HTTP tagging service.
///
/// Sends `POST {base}/api/musiclabel` with the file path and accepts two
/// response shapes: `{"labels": [...]}`, stored as the JSON array string,
/// and a legacy bare-string body, stored as-is.
pub struct HttpStyleTagger {
    base_url: String,
    client: Client,
}

impl HttpStyleTagger {
    /// Create a tagger from the endpoint configuration.
    pub fn new(endpoints: &EndpointConfig) -> Self {
        let client = Client::builder()
            .timeout(endpoints.tagging_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: endpoints.tagging_base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn parse_response(body: &str) -> Option<String> {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            if let Some(labels) = value.get("labels").and_then(|l| l.as_array()) {
                // Store the array back as its JSON string form
                return serde_json::to_string(labels).ok();
            }
            if let Some(s) = value.as_str() {
                let s = s.trim();
                return (!s.is_empty()).then(|| s.to_string());
            }
            return None;
        }

        // Legacy plain-text body
        let trimmed = body.trim();
        (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
    }
}

#[async_trait]
impl StyleTagger for HttpStyleTagger {
    async fn tag_file(&self, path: &Path) -> Result<Option<String>> {
        let url = format!("{}/api/musiclabel", self.base_url);
        let path_str = path.to_string_lossy();

        debug!(path = %path_str, "Requesting style labels");

        let response = self
            .client
            .post(&url)
            .json(&TagRequest { path: &path_str })
            .send()
            .await
            .map_err(|e| MetadataError::TaggingFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::TaggingFailed(e.to_string()))?;

        Ok(Self::parse_response(&body))
    }
}

/// Outcome of one file inside a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub file_path: String,
    pub file_name: String,
    pub success: bool,
    pub style_label: Option<String>,
    pub error: Option<String>,
}

/// Progress hook for batch runs: `(index, total, file_name)`, invoked
/// before each file starts, with `index` counting from 1.
pub type ProgressCallback = dyn Fn(usize, usize, &str) + Send + Sync;

/// Coordinates label registration, tagging, and persistence.
pub struct LabelService {
    repository: Arc<dyn LabelRepository>,
    tagger: Arc<dyn StyleTagger>,
    batch: BatchConfig,
}

impl LabelService {
    pub fn new(
        repository: Arc<dyn LabelRepository>,
        tagger: Arc<dyn StyleTagger>,
        batch: BatchConfig,
    ) -> Self {
        Self {
            repository,
            tagger,
            batch,
        }
    }

    /// Ensure `path` has a label record and try to fill its style label.
    ///
    /// Non-audio files are rejected. An already-labeled record is returned
    /// without hitting the tagging service again. Tagging failures degrade:
    /// the pending record is returned and the error only logged.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::UnsupportedFormat`] for non-audio files and
    /// [`MetadataError::Store`] when the database itself fails.
    pub async fn process_file(&self, path: &Path) -> Result<MusicLabelRecord> {
        if !is_audio_file(path) {
            return Err(MetadataError::UnsupportedFormat(
                path.to_string_lossy().into_owned(),
            ));
        }

        let file_path = path.to_string_lossy().into_owned();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if let Some(record) = self.repository.get_label(&file_path).await? {
            if !record.is_pending() {
                debug!(path = %file_path, "Label already present, skipping tagger");
                return Ok(record);
            }
        } else {
            self.repository.save_label(&file_name, &file_path).await?;
        }

        match self.tagger.tag_file(path).await {
            Ok(Some(label)) => {
                self.repository.update_label(&file_path, &label).await?;
                info!(path = %file_path, label = %label, "Stored style label");
            }
            Ok(None) => {
                debug!(path = %file_path, "Tagging service returned no labels");
            }
            Err(e) => {
                warn!(path = %file_path, error = %e, "Style tagging failed");
            }
        }

        self.repository
            .get_label(&file_path)
            .await?
            .ok_or_else(|| MetadataError::TaggingFailed(format!("record vanished: {}", file_path)))
    }

    /// Overwrite the stored label for a path.
    ///
    /// Returns false when no record exists or the store fails; the store
    /// failure is only logged.
    pub async fn update_label(&self, path: &Path, style_label: &str) -> bool {
        let file_path = path.to_string_lossy();
        match self.repository.update_label(&file_path, style_label).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(path = %file_path, error = %e, "Label update failed");
                false
            }
        }
    }

    /// Most recently updated records, up to `limit`. Empty on store
    /// failure.
    pub async fn all_labels(&self, limit: i64) -> Vec<MusicLabelRecord> {
        match self.repository.list_all(limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Could not list label records");
                Vec::new()
            }
        }
    }

    /// Process many files in throttled batches.
    ///
    /// Non-audio paths and paths that no longer exist on disk are filtered
    /// out up front, so a stale library listing cannot seed the store with
    /// records for missing files. Files within a batch run concurrently;
    /// batches are separated by the configured delay. One result is
    /// produced per accepted file, failures included, so callers can
    /// always line results up against their input.
    pub async fn process_files(
        &self,
        paths: &[std::path::PathBuf],
        progress: Option<&ProgressCallback>,
    ) -> Vec<BatchItemResult> {
        let mut audio_paths: Vec<&std::path::PathBuf> = Vec::new();
        for path in paths {
            if !is_audio_file(path) {
                continue;
            }
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                warn!(path = %path.display(), "Skipping missing file");
                continue;
            }
            audio_paths.push(path);
        }
        let total = audio_paths.len();

        info!(total = total, skipped = paths.len() - total, "Starting batch tagging run");

        let mut results = Vec::with_capacity(total);

        for (batch_index, chunk) in audio_paths.chunks(self.batch.batch_size).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(self.batch.inter_batch_delay).await;
            }

            let futures = chunk.iter().enumerate().map(|(offset, path)| {
                let index = batch_index * self.batch.batch_size + offset + 1;
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();

                if let Some(callback) = progress {
                    callback(index, total, &file_name);
                }

                async move {
                    let file_path = path.to_string_lossy().into_owned();
                    match self.process_file(path).await {
                        Ok(record) => BatchItemResult {
                            file_path,
                            file_name,
                            success: true,
                            style_label: record.style_label,
                            error: None,
                        },
                        Err(e) => BatchItemResult {
                            file_path,
                            file_name,
                            success: false,
                            style_label: None,
                            error: Some(e.to_string()),
                        },
                    }
                }
            });

            results.extend(join_all(futures).await);
        }

        info!(
            total = total,
            succeeded = results.iter().filter(|r| r.success).count(),
            "Batch tagging run finished"
        );

        results
    }

    /// Re-run tagging for every record still pending in the store.
    ///
    /// A store failure degrades to an empty run; per-file failures show up
    /// in the per-item results as usual.
    pub async fn process_unlabeled(
        &self,
        progress: Option<&ProgressCallback>,
    ) -> Vec<BatchItemResult> {
        let pending = match self.repository.list_unlabeled().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Could not list pending records");
                return Vec::new();
            }
        };

        let paths: Vec<std::path::PathBuf> = pending
            .into_iter()
            .map(|r| std::path::PathBuf::from(r.file_path))
            .collect();

        self.process_files(&paths, progress).await
    }
}
