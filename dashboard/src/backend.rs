//! HTTP client for the people-detection backend.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Number;
use types::{CountResponse, HealthResponse, StreamStatusResponse};

use crate::{DashboardError, live_monitor::CountSource};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// HTTP client whose requests give up after `timeout`, so a backend that
/// never answers cannot pile up unfinished polls.
///
/// # Errors
/// If the TLS backend cannot be initialised.
pub fn http_client(
    timeout: Duration,
) -> Result<reqwest::Client, DashboardError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// # Errors
    /// If `base_url` is not an `http` or `https` URL.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
    ) -> Result<Self, DashboardError> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            return Err(DashboardError::InvalidSetting {
                name: "backend_url",
                reason: format!("{base_url} is not an http(s) URL"),
            });
        }

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Multipart MJPEG stream of annotated frames.
    #[must_use]
    pub fn feed_url(&self) -> String {
        self.endpoint("video_feed")
    }

    #[must_use]
    pub fn count_url(&self) -> String {
        self.endpoint("count")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// # Errors
    /// On transport failure, a non-success status or an unexpected body.
    pub async fn health(&self) -> Result<HealthResponse, DashboardError> {
        let response = self
            .http
            .get(self.endpoint("health"))
            .send()
            .await?
            .error_for_status()?;

        decode(response).await
    }

    /// Ask the backend to start running detection on its video source.
    ///
    /// # Errors
    /// On transport failure, a non-success status or an unexpected body.
    pub async fn start_stream(
        &self,
    ) -> Result<StreamStatusResponse, DashboardError> {
        self.post_command("start_stream").await
    }

    /// Ask the backend to stop detection. The feed keeps streaming blank
    /// frames.
    ///
    /// # Errors
    /// On transport failure, a non-success status or an unexpected body.
    pub async fn stop_stream(
        &self,
    ) -> Result<StreamStatusResponse, DashboardError> {
        self.post_command("stop_stream").await
    }

    async fn post_command(
        &self,
        path: &str,
    ) -> Result<StreamStatusResponse, DashboardError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .send()
            .await?
            .error_for_status()?;

        let status: StreamStatusResponse = decode(response).await?;
        tracing::info!(command = path, status = ?status.status, "stream command accepted");
        Ok(status)
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, DashboardError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

impl CountSource for BackendClient {
    /// The status code is not looked at: whatever body comes back either
    /// carries a count or fails to decode.
    async fn fetch_count(&self) -> Result<Number, DashboardError> {
        let response = self.http.get(self.count_url()).send().await?;
        let count: CountResponse = decode(response).await?;
        Ok(count.people_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_from_base_url() {
        let client =
            BackendClient::new(reqwest::Client::new(), "http://127.0.0.1:5000/")
                .unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
        assert_eq!(client.feed_url(), "http://127.0.0.1:5000/video_feed");
        assert_eq!(client.count_url(), "http://127.0.0.1:5000/count");
    }

    #[test]
    fn test_http_client_builds_with_timeout() {
        let http = http_client(Duration::from_secs(5)).unwrap();

        assert!(BackendClient::new(http, DEFAULT_BACKEND_URL).is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = BackendClient::new(reqwest::Client::new(), "127.0.0.1:5000");

        assert!(matches!(
            result,
            Err(DashboardError::InvalidSetting {
                name: "backend_url",
                ..
            })
        ));
    }
}
