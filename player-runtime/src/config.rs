//! # Core Configuration Module
//!
//! Configuration for the player core, constructed once at process startup
//! and passed explicitly to every consumer.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] instance holding the database location, the external
//! service endpoints, and the timing knobs of the resolution pipeline.
//! Validation is fail-fast: a missing database path or a zero batch size is
//! rejected at build time instead of surfacing later as a runtime surprise.
//!
//! ## Usage
//!
//! ```ignore
//! use player_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/path/to/player.db")
//!     .tagging_base_url("http://localhost:22071")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock budget for the embedded-tag read race.
pub const DEFAULT_TAG_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for style-tagging requests. The classifier runs a model
/// per request, so this is much larger than the lyrics/cover budgets.
pub const DEFAULT_TAGGING_TIMEOUT: Duration = Duration::from_secs(20);

/// Default timeout for lyrics and cover lookups.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// External endpoint settings for the enrichment services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the style-tagging service (`POST {base}/api/musiclabel`)
    pub tagging_base_url: String,

    /// Per-request timeout for tagging calls
    pub tagging_timeout: Duration,

    /// Base URL of the lyrics/cover lookup API
    pub lookup_base_url: String,

    /// Per-request timeout for lyrics lookups
    pub lyrics_timeout: Duration,

    /// Per-request timeout for cover lookups
    pub cover_timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            tagging_base_url: "http://localhost:22071".to_string(),
            tagging_timeout: DEFAULT_TAGGING_TIMEOUT,
            lookup_base_url: "https://api.lrc.cx".to_string(),
            lyrics_timeout: DEFAULT_LOOKUP_TIMEOUT,
            cover_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Throttling knobs for background label enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of files whose tagging requests run concurrently
    pub batch_size: usize,

    /// Fixed pause between consecutive batches. A crude rate limit for the
    /// external tagging service, not a token bucket.
    pub inter_batch_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            inter_batch_delay: Duration::from_millis(500),
        }
    }
}

/// Core configuration for the player.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Wall-clock budget for the embedded-tag read race
    pub tag_read_timeout: Duration,

    /// External service endpoints
    pub endpoints: EndpointConfig,

    /// Batch enrichment throttling
    pub batch: BatchConfig,
}

impl CoreConfig {
    /// Create a builder for the configuration
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`] with fail-fast validation.
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    tag_read_timeout: Option<Duration>,
    endpoints: EndpointConfig,
    batch: BatchConfig,
}

impl CoreConfigBuilder {
    /// Set the SQLite database path (required)
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the embedded-tag read budget
    pub fn tag_read_timeout(mut self, timeout: Duration) -> Self {
        self.tag_read_timeout = Some(timeout);
        self
    }

    /// Set the style-tagging service base URL
    pub fn tagging_base_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.tagging_base_url = url.into();
        self
    }

    /// Set the tagging request timeout
    pub fn tagging_timeout(mut self, timeout: Duration) -> Self {
        self.endpoints.tagging_timeout = timeout;
        self
    }

    /// Set the lyrics/cover lookup API base URL
    pub fn lookup_base_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.lookup_base_url = url.into();
        self
    }

    /// Set the lyrics lookup timeout
    pub fn lyrics_timeout(mut self, timeout: Duration) -> Self {
        self.endpoints.lyrics_timeout = timeout;
        self
    }

    /// Set the cover lookup timeout
    pub fn cover_timeout(mut self, timeout: Duration) -> Self {
        self.endpoints.cover_timeout = timeout;
        self
    }

    /// Set the enrichment batch size
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch.batch_size = size;
        self
    }

    /// Set the pause between enrichment batches
    pub fn inter_batch_delay(mut self, delay: Duration) -> Self {
        self.batch.inter_batch_delay = delay;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the database path is missing, an endpoint
    /// URL is empty, or the batch size is zero.
    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self
            .database_path
            .ok_or_else(|| Error::Config("database_path is required".to_string()))?;

        if self.endpoints.tagging_base_url.is_empty() {
            return Err(Error::Config("tagging_base_url must not be empty".to_string()));
        }
        if self.endpoints.lookup_base_url.is_empty() {
            return Err(Error::Config("lookup_base_url must not be empty".to_string()));
        }
        if self.batch.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }

        Ok(CoreConfig {
            database_path,
            tag_read_timeout: self.tag_read_timeout.unwrap_or(DEFAULT_TAG_READ_TIMEOUT),
            endpoints: self.endpoints,
            batch: self.batch,
        })
    }
}
