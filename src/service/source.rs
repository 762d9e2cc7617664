//! Source document fetch.
//!
//! A run only starts once the page's document is reachable over HTTP.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Fetch
// ============================================================================

/// Fetches the document at `url`.
///
/// # Errors
///
/// Returns [`Error::UnreachableSource`] if `url` is not an absolute URL, the
/// request fails or times out, or the response status is not `200`.
pub async fn fetch_source(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::unreachable_source(url, e.to_string()))?;

    let response = client
        .get(parsed)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            warn!(url, error = %e, "Source fetch failed");
            Error::unreachable_source(url, e.to_string())
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        warn!(url, status = status.as_u16(), "Source fetch rejected");
        return Err(Error::unreachable_source(url, status.to_string()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::unreachable_source(url, e.to_string()))?;

    debug!(url, bytes = body.len(), "Source fetched");
    Ok(prepare_document(body))
}

/// Pre-clean hook applied to a fetched document.
///
/// Currently the identity.
#[inline]
#[must_use]
pub fn prepare_document(document: String) -> String {
    document
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one HTTP response and returns the URL to request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });

        format!("http://{addr}/")
    }

    #[test]
    fn test_prepare_document_is_identity() {
        assert_eq!(prepare_document("<p>hi</p>".into()), "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let url = serve_once("200 OK", "<html></html>").await;
        let body = fetch_source(&Client::new(), &url, Duration::from_secs(5))
            .await
            .expect("fetch");
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_unreachable() {
        let url = serve_once("404 Not Found", "missing").await;
        let err = fetch_source(&Client::new(), &url, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnreachableSource { .. }));
    }

    #[tokio::test]
    async fn test_relative_url_is_unreachable() {
        let err = fetch_source(&Client::new(), "example.com", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_user_facing());
    }
}
