//! Label-based similarity recommendations
//!
//! Treats each file's style labels as a binary term set and ranks other
//! labeled files by cosine similarity against the current one. Small
//! libraries by design: the whole labeled set is scored in memory.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::error::Result;
use player_store::repositories::LabelRepository;

/// How many records to pull from the store per recommendation query.
const CANDIDATE_LIMIT: i64 = 1000;

/// A scored recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub file_name: String,
    pub file_path: String,
    /// Cosine similarity in `(0, 1]`
    pub score: f64,
}

/// Parse a stored label string into its label set.
///
/// Labels are stored either as a JSON array string or, in the legacy
/// format, as a comma-separated list.
fn parse_labels(raw: &str) -> HashSet<String> {
    if let Ok(labels) = serde_json::from_str::<Vec<String>>(raw) {
        return labels
            .into_iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
    }

    raw.split(", ")
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Cosine similarity of two binary label sets.
fn cosine_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    intersection / ((a.len() as f64).sqrt() * (b.len() as f64).sqrt())
}

/// Recommend files similar to `current_file_name`, ranked by label
/// overlap.
///
/// Returns an empty list when the current file has no labels, when fewer
/// than two labeled files exist, or when nothing scores above zero.
///
/// # Errors
///
/// Propagates store failures from the candidate query.
pub async fn recommend_similar(
    repository: &dyn LabelRepository,
    current_file_name: &str,
    top_n: usize,
) -> Result<Vec<Recommendation>> {
    let records = repository.list_all(CANDIDATE_LIMIT).await?;

    let labeled: Vec<_> = records
        .into_iter()
        .filter(|r| !r.is_pending())
        .collect();

    if labeled.len() < 2 {
        debug!(
            labeled = labeled.len(),
            "Not enough labeled files for recommendations"
        );
        return Ok(Vec::new());
    }

    let current_labels = labeled
        .iter()
        .find(|r| r.file_name == current_file_name)
        .and_then(|r| r.style_label.as_deref())
        .map(parse_labels)
        .unwrap_or_default();

    if current_labels.is_empty() {
        return Ok(Vec::new());
    }

    let mut scored: Vec<Recommendation> = labeled
        .iter()
        .filter(|r| r.file_name != current_file_name)
        .filter_map(|r| {
            let labels = parse_labels(r.style_label.as_deref()?);
            let score = cosine_similarity(&current_labels, &labels);
            (score > 0.0).then(|| Recommendation {
                file_name: r.file_name.clone(),
                file_path: r.file_path.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    scored.truncate(top_n);

    Ok(scored)
}
