//! Network lyrics and cover providers
//!
//! Thin HTTP clients over the lookup API. Both providers return
//! `Ok(None)` for "nothing found" and reserve errors for transport
//! failures; the resolver degrades either outcome the same way.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

use crate::error::{MetadataError, Result};
use crate::types::{CoverImage, UNKNOWN_ARTIST};
use player_runtime::config::EndpointConfig;

/// Build the lookup query for a track.
///
/// `"{title} - {artist}"` when a real artist is known, bare title when the
/// artist is empty or still the placeholder.
pub fn build_search_query(title: &str, artist: &str) -> String {
    let artist = artist.trim();
    if artist.is_empty() || artist == UNKNOWN_ARTIST {
        title.trim().to_string()
    } else {
        format!("{} - {}", title.trim(), artist)
    }
}

/// Fetches lyrics text for a track.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Look up lyrics by title and artist. `Ok(None)` means no match.
    async fn fetch_lyrics(&self, title: &str, artist: &str) -> Result<Option<String>>;
}

/// Fetches a cover image for a track.
#[async_trait]
pub trait CoverProvider: Send + Sync {
    /// Look up a cover by title and artist. `Ok(None)` means no match.
    async fn fetch_cover(&self, title: &str, artist: &str) -> Result<Option<CoverImage>>;
}

/// Client for the lyrics/cover lookup API.
///
/// Lyrics requests follow redirects normally. Cover requests disable
/// redirect following: the API answers either with a redirect to the
/// image, which we pass through as a URL, or with image bytes, which we
/// inline as a `data:` URL.
pub struct LrcApiClient {
    base_url: String,
    lyrics_client: Client,
    cover_client: Client,
}

impl LrcApiClient {
    /// Create a client from the endpoint configuration.
    pub fn new(endpoints: &EndpointConfig) -> Self {
        let lyrics_client = Client::builder()
            .timeout(endpoints.lyrics_timeout)
            .build()
            .expect("Failed to build HTTP client");

        let cover_client = Client::builder()
            .timeout(endpoints.cover_timeout)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: endpoints.lookup_base_url.trim_end_matches('/').to_string(),
            lyrics_client,
            cover_client,
        }
    }
}

#[async_trait]
impl LyricsProvider for LrcApiClient {
    async fn fetch_lyrics(&self, title: &str, artist: &str) -> Result<Option<String>> {
        let query = build_search_query(title, artist);
        let url = format!(
            "{}/lyrics?title={}",
            self.base_url,
            urlencoding::encode(&query)
        );

        debug!(query = %query, "Fetching lyrics");

        let response = self
            .lyrics_client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetadataError::LyricsFetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::LyricsFetchFailed(e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(body))
    }
}

#[async_trait]
impl CoverProvider for LrcApiClient {
    async fn fetch_cover(&self, title: &str, artist: &str) -> Result<Option<CoverImage>> {
        let query = build_search_query(title, artist);
        let url = format!(
            "{}/cover?title={}",
            self.base_url,
            urlencoding::encode(&query)
        );

        debug!(query = %query, "Fetching cover");

        let response = self
            .cover_client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetadataError::CoverFetchFailed(e.to_string()))?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            return Ok(location.map(CoverImage::Url));
        }

        if !status.is_success() {
            return Ok(None);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        match content_type {
            Some(mime) if mime.starts_with("image/") => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| MetadataError::CoverFetchFailed(e.to_string()))?;
                if body.is_empty() {
                    return Ok(None);
                }
                Ok(Some(CoverImage::inline(&mime, &body)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_query_with_artist() {
        assert_eq!(build_search_query("晴天", "周杰伦"), "晴天 - 周杰伦");
    }

    #[test]
    fn test_build_search_query_skips_placeholder_artist() {
        assert_eq!(build_search_query("Song", UNKNOWN_ARTIST), "Song");
        assert_eq!(build_search_query("Song", ""), "Song");
        assert_eq!(build_search_query("Song", "   "), "Song");
    }

    #[test]
    fn test_query_is_url_encoded() {
        let query = build_search_query("A & B", "C/D");
        assert_eq!(
            urlencoding::encode(&query),
            "A%20%26%20B%20-%20C%2FD"
        );
    }
}
