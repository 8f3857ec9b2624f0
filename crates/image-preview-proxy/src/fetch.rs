//! Upstream image fetching

use crate::error::{PreviewError, Result};
use reqwest::header::{HeaderMap, HOST};
use reqwest::Client;
use tracing::{debug, warn};

/// Content type the proxy is willing to cache.
const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// HTTP client for fetching images from their source hosts.
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Fetch a JPEG from `source`, a host/path string requested over
    /// plain HTTP (e.g. `cdn.example.com/photos/1.jpg`).
    ///
    /// The client's request headers are forwarded to the source, so hosts
    /// expecting auth or user-agent values still answer; the host header
    /// belongs to the source and is not forwarded.
    ///
    /// Responses with a non-success status or a content type other than
    /// `image/jpeg` are domain errors, not transport errors.
    pub async fn fetch(&self, source: &str, headers: &HeaderMap) -> Result<Vec<u8>> {
        let url = format!("http://{}", source);
        debug!(url = %url, "Fetching image from source");

        let mut forwarded = headers.clone();
        forwarded.remove(HOST);

        let response = self.client.get(&url).headers(forwarded).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, url = %url, "Source rejected the request");
            return Err(PreviewError::RemoteRejected(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Compare the media type alone, ignoring any parameters.
        let media_type = content_type.split(';').next().unwrap_or("").trim();
        if media_type != JPEG_CONTENT_TYPE {
            return Err(PreviewError::UnsupportedContentType(content_type));
        }

        let data = response.bytes().await?.to_vec();
        debug!(size = data.len(), url = %url, "Fetched image from source");
        Ok(data)
    }
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_unreachable_source() {
        let fetcher = ImageFetcher::new();

        // Nothing listens on the discard port.
        let result = fetcher.fetch("127.0.0.1:9/img.jpg", &HeaderMap::new()).await;
        assert!(matches!(result, Err(PreviewError::RemoteUnavailable(_))));
    }
}
