//! Visual capture client: screenshot rendering and image hosting.
//!
//! Two chained provider calls implement the
//! [`vigil_review::ScreenshotService`] seam: `capture` asks the screenshot
//! provider for a fresh render of a target URL, `publish` uploads the image
//! bytes to the hosting provider and returns the public URL. Both calls
//! consume quota against external rate limits; pacing between them belongs
//! to the pipeline driver, never to this client.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use vigil_review::{CaptureError, PublishError, ScreenshotService};

/// Render delay passed to the screenshot provider, in seconds. The provider
/// requires string-typed query values.
const RENDER_DELAY: &str = "3";

/// Forces a fresh capture instead of a provider-cached one.
const FORCE_FRESH: &str = "1";

/// Access configuration for the two capture providers.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Screenshot provider endpoint.
    pub screenshot_endpoint: Url,
    /// Screenshot provider access key.
    pub screenshot_key: String,
    /// Image host upload endpoint.
    pub image_host_endpoint: Url,
    /// Image host access key.
    pub image_host_key: String,
}

/// HTTP client for the screenshot and image-hosting providers.
#[derive(Debug, Clone)]
pub struct CaptureClient {
    client: Client,
    config: CaptureConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadedImage,
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    url: String,
}

impl CaptureClient {
    /// Construct a client from a shared HTTP client and provider config.
    #[must_use]
    pub const fn new(client: Client, config: CaptureConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ScreenshotService for CaptureClient {
    async fn capture(&self, url: &str) -> Result<Vec<u8>, CaptureError> {
        let mut endpoint = self.config.screenshot_endpoint.clone();
        endpoint
            .query_pairs_mut()
            .append_pair("access_key", &self.config.screenshot_key)
            .append_pair("url", url)
            .append_pair("delay", RENDER_DELAY)
            .append_pair("force", FORCE_FRESH);

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|source| CaptureError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| CaptureError::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!(url, bytes = bytes.len(), "captured screenshot");
        Ok(bytes.to_vec())
    }

    async fn publish(&self, image: &[u8]) -> Result<String, PublishError> {
        let mut endpoint = self.config.image_host_endpoint.clone();
        endpoint
            .query_pairs_mut()
            .append_pair("key", &self.config.image_host_key);

        let encoded = general_purpose::STANDARD.encode(image);
        let response = self
            .client
            .post(endpoint)
            .form(&[("image", encoded)])
            .send()
            .await
            .map_err(|source| PublishError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Status {
                status: status.as_u16(),
            });
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|source| PublishError::Decode { source })?;
        debug!(url = %upload.data.url, "published screenshot");
        Ok(upload.data.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> CaptureClient {
        let config = CaptureConfig {
            screenshot_endpoint: server
                .url("/api/capture")
                .parse()
                .expect("valid endpoint"),
            screenshot_key: "shot-key".to_string(),
            image_host_endpoint: server.url("/1/upload").parse().expect("valid endpoint"),
            image_host_key: "host-key".to_string(),
        };
        CaptureClient::new(Client::new(), config)
    }

    #[tokio::test]
    async fn capture_requests_a_fresh_render() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/capture")
                .query_param("access_key", "shot-key")
                .query_param("url", "http://example.com")
                .query_param("delay", RENDER_DELAY)
                .query_param("force", FORCE_FRESH);
            then.status(200).body([0x89, 0x50, 0x4E, 0x47]);
        });

        let bytes = client(&server)
            .capture("http://example.com")
            .await
            .expect("capture succeeds");

        mock.assert();
        assert_eq!(bytes, vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[tokio::test]
    async fn capture_rejects_non_success_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/capture");
            then.status(429);
        });

        let error = client(&server)
            .capture("http://example.com")
            .await
            .expect_err("provider quota exhausted");

        assert!(matches!(error, CaptureError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn publish_uploads_base64_form_data() {
        let server = MockServer::start_async().await;
        let encoded = general_purpose::STANDARD.encode([0xABu8, 0xCD]);
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/1/upload")
                .query_param("key", "host-key")
                .form_urlencoded_tuple("image", encoded.as_str());
            then.status(200)
                .json_body(serde_json::json!({"data":{"url":"https://img.example/abc.png"}}));
        });

        let url = client(&server)
            .publish(&[0xAB, 0xCD])
            .await
            .expect("upload succeeds");

        mock.assert();
        assert_eq!(url, "https://img.example/abc.png");
    }

    #[tokio::test]
    async fn publish_rejects_non_success_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/1/upload");
            then.status(400);
        });

        let error = client(&server)
            .publish(&[0x01])
            .await
            .expect_err("host rejected upload");

        assert!(matches!(error, PublishError::Status { status: 400 }));
    }

    #[tokio::test]
    async fn publish_rejects_undecodable_response() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/1/upload");
            then.status(200).body("not json");
        });

        let error = client(&server)
            .publish(&[0x01])
            .await
            .expect_err("response body unusable");

        assert!(matches!(error, PublishError::Decode { .. }));
    }
}
