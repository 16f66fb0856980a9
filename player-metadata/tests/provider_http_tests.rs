//! HTTP provider tests against a local one-shot server.

use std::time::Duration;

use player_metadata::providers::{CoverProvider, LrcApiClient, LyricsProvider};
use player_metadata::CoverImage;
use player_runtime::config::EndpointConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one connection with a canned HTTP response, returning the base URL.
async fn serve_once(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
    });

    format!("http://{}", addr)
}

fn text_response(status_line: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        content_type,
        body.len(),
        body
    )
}

fn client(base_url: String) -> LrcApiClient {
    let endpoints = EndpointConfig {
        lookup_base_url: base_url,
        lyrics_timeout: Duration::from_secs(2),
        cover_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    LrcApiClient::new(&endpoints)
}

#[tokio::test]
async fn lyrics_accepts_any_2xx_status() {
    let base = serve_once(text_response(
        "201 Created",
        "text/plain",
        "[00:01.00] a line",
    ))
    .await;

    let lyrics = client(base).fetch_lyrics("Song", "Artist").await.unwrap();
    assert_eq!(lyrics.as_deref(), Some("[00:01.00] a line"));
}

#[tokio::test]
async fn lyrics_not_found_yields_none() {
    let base = serve_once(text_response("404 Not Found", "text/plain", "nope")).await;

    let lyrics = client(base).fetch_lyrics("Song", "Artist").await.unwrap();
    assert_eq!(lyrics, None);
}

#[tokio::test]
async fn lyrics_empty_body_yields_none() {
    let base = serve_once(text_response("200 OK", "text/plain", "  \n")).await;

    let lyrics = client(base).fetch_lyrics("Song", "Artist").await.unwrap();
    assert_eq!(lyrics, None);
}

#[tokio::test]
async fn cover_redirect_passes_location_through() {
    let response = "HTTP/1.1 302 Found\r\nlocation: https://img.example/cover.jpg\r\n\
                    content-length: 0\r\nconnection: close\r\n\r\n"
        .to_string();
    let base = serve_once(response).await;

    let cover = client(base).fetch_cover("Song", "Artist").await.unwrap();
    assert_eq!(
        cover,
        Some(CoverImage::Url("https://img.example/cover.jpg".to_string()))
    );
}

#[tokio::test]
async fn cover_image_body_is_inlined() {
    let base = serve_once(text_response("200 OK", "image/png", "abc")).await;

    let cover = client(base).fetch_cover("Song", "Artist").await.unwrap();
    match cover {
        Some(CoverImage::DataUrl(url)) => {
            assert!(url.starts_with("data:image/png;base64,"));
        }
        other => panic!("expected inline cover, got {:?}", other),
    }
}

#[tokio::test]
async fn cover_non_image_body_yields_none() {
    let base = serve_once(text_response("200 OK", "text/html", "<html></html>")).await;

    let cover = client(base).fetch_cover("Song", "Artist").await.unwrap();
    assert_eq!(cover, None);
}
