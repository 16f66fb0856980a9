//! Label repository trait and SQLite implementation

use crate::error::Result;
use crate::models::MusicLabelRecord;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

/// Data access for style-label records.
///
/// All write operations are upserts keyed by the unique `file_path` column,
/// safe to call concurrently with last-writer-wins row semantics.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Find a record by absolute file path
    ///
    /// # Returns
    /// - `Ok(Some(record))` if found
    /// - `Ok(None)` if no record exists for the path
    async fn get_label(&self, file_path: &str) -> Result<Option<MusicLabelRecord>>;

    /// Register a file with an empty (pending) style label.
    ///
    /// Calling this twice with the same path is a no-op on the second call;
    /// the unique-path invariant always holds.
    ///
    /// When a record exists with the same file name but a different path,
    /// that record is repointed to the new path instead of inserting a
    /// duplicate. This mirrors the original store's behavior for moved
    /// files; it is a heuristic, not a guaranteed contract.
    async fn save_label(&self, file_name: &str, file_path: &str) -> Result<()>;

    /// Store the style label for a path
    ///
    /// # Returns
    /// - `Ok(true)` if a record was updated
    /// - `Ok(false)` if no record exists for the path
    async fn update_label(&self, file_path: &str, style_label: &str) -> Result<bool>;

    /// All records still pending enrichment (NULL or empty label)
    async fn list_unlabeled(&self) -> Result<Vec<MusicLabelRecord>>;

    /// Most recently updated records, up to `limit`
    async fn list_all(&self, limit: i64) -> Result<Vec<MusicLabelRecord>>;
}

/// SQLite implementation of [`LabelRepository`]
pub struct SqliteLabelRepository {
    pool: SqlitePool,
}

impl SqliteLabelRepository {
    /// Create a repository over an existing connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[async_trait]
impl LabelRepository for SqliteLabelRepository {
    async fn get_label(&self, file_path: &str) -> Result<Option<MusicLabelRecord>> {
        let record = sqlx::query_as::<_, MusicLabelRecord>(
            "SELECT * FROM music_labels WHERE file_path = ?",
        )
        .bind(file_path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn save_label(&self, file_name: &str, file_path: &str) -> Result<()> {
        if self.get_label(file_path).await?.is_some() {
            // Already registered for this path, nothing to do
            return Ok(());
        }

        // A record with the same file name but a different path is assumed
        // to be the same file after a move; repoint it. Heuristic carried
        // over from the original store, exercised but not relied upon.
        let name_collision = sqlx::query_as::<_, MusicLabelRecord>(
            "SELECT * FROM music_labels WHERE file_name = ? AND file_path != ?",
        )
        .bind(file_name)
        .bind(file_path)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(existing) = name_collision {
            debug!(
                file_name = %file_name,
                old_path = %existing.file_path,
                new_path = %file_path,
                "Repointing label record to new path"
            );
            sqlx::query("UPDATE music_labels SET file_path = ?, updated_at = ? WHERE id = ?")
                .bind(file_path)
                .bind(Self::now())
                .bind(existing.id)
                .execute(&self.pool)
                .await?;
            return Ok(());
        }

        let now = Self::now();
        sqlx::query(
            r#"
            INSERT INTO music_labels (file_name, file_path, style_label, created_at, updated_at)
            VALUES (?, ?, NULL, ?, ?)
            ON CONFLICT(file_path) DO NOTHING
            "#,
        )
        .bind(file_name)
        .bind(file_path)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_label(&self, file_path: &str, style_label: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE music_labels SET style_label = ?, updated_at = ? WHERE file_path = ?",
        )
        .bind(style_label)
        .bind(Self::now())
        .bind(file_path)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_unlabeled(&self) -> Result<Vec<MusicLabelRecord>> {
        let records = sqlx::query_as::<_, MusicLabelRecord>(
            "SELECT * FROM music_labels WHERE style_label IS NULL OR style_label = '' \
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_all(&self, limit: i64) -> Result<Vec<MusicLabelRecord>> {
        let records = sqlx::query_as::<_, MusicLabelRecord>(
            "SELECT * FROM music_labels ORDER BY updated_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    async fn setup_repo() -> SqliteLabelRepository {
        let pool = create_test_pool().await.unwrap();
        SqliteLabelRepository::new(pool)
    }

    #[tokio::test]
    async fn test_save_and_get_label() {
        let repo = setup_repo().await;

        repo.save_label("song.mp3", "/music/song.mp3").await.unwrap();

        let record = repo.get_label("/music/song.mp3").await.unwrap().unwrap();
        assert_eq!(record.file_name, "song.mp3");
        assert_eq!(record.file_path, "/music/song.mp3");
        assert!(record.is_pending());
    }

    #[tokio::test]
    async fn test_save_label_is_idempotent() {
        let repo = setup_repo().await;

        repo.save_label("song.mp3", "/music/song.mp3").await.unwrap();
        repo.save_label("song.mp3", "/music/song.mp3").await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM music_labels")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1, "second save must not create a duplicate row");
    }

    #[tokio::test]
    async fn test_update_label() {
        let repo = setup_repo().await;

        repo.save_label("song.mp3", "/music/song.mp3").await.unwrap();

        let updated = repo
            .update_label("/music/song.mp3", r#"["rock","indie"]"#)
            .await
            .unwrap();
        assert!(updated);

        let record = repo.get_label("/music/song.mp3").await.unwrap().unwrap();
        assert_eq!(record.style_label.as_deref(), Some(r#"["rock","indie"]"#));
        assert!(!record.is_pending());
    }

    #[tokio::test]
    async fn test_update_label_missing_path() {
        let repo = setup_repo().await;

        let updated = repo
            .update_label("/music/nope.mp3", r#"["rock"]"#)
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_list_unlabeled() {
        let repo = setup_repo().await;

        repo.save_label("a.mp3", "/music/a.mp3").await.unwrap();
        repo.save_label("b.mp3", "/music/b.mp3").await.unwrap();
        repo.update_label("/music/a.mp3", r#"["jazz"]"#).await.unwrap();

        let pending = repo.list_unlabeled().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].file_path, "/music/b.mp3");
    }

    #[tokio::test]
    async fn test_list_all_respects_limit() {
        let repo = setup_repo().await;

        for i in 0..5 {
            repo.save_label(&format!("{i}.mp3"), &format!("/music/{i}.mp3"))
                .await
                .unwrap();
        }

        let records = repo.list_all(3).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    // Documents the moved-file repoint heuristic as observed behavior: a
    // save under a new path with a colliding file name rewrites the old
    // record's path instead of inserting a second row. Possibly surprising
    // (two genuinely different files with the same name collapse into one
    // record), kept for compatibility with the original store.
    #[tokio::test]
    async fn test_save_label_repoints_on_name_collision() {
        let repo = setup_repo().await;

        repo.save_label("song.mp3", "/old/song.mp3").await.unwrap();
        repo.update_label("/old/song.mp3", r#"["rock"]"#).await.unwrap();

        repo.save_label("song.mp3", "/new/song.mp3").await.unwrap();

        assert!(repo.get_label("/old/song.mp3").await.unwrap().is_none());
        let moved = repo.get_label("/new/song.mp3").await.unwrap().unwrap();
        // The existing label travels with the repointed record
        assert_eq!(moved.style_label.as_deref(), Some(r#"["rock"]"#));

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM music_labels")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }
}
