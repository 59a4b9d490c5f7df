use crate::models::{DailySummary, DashboardData, DrinkRequest, IntakeRecord, TagInfo, WeeklyReport};
use reqwest::{Client, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use std::{future::Future, time::Duration};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/water";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("backend returned {0}")]
    Status(StatusCode),
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if let Some(status) = err.status() {
            ApiError::Status(status)
        } else if err.is_decode() {
            ApiError::Decode(err)
        } else {
            ApiError::Network(err)
        }
    }
}

/// The calls the dashboard controllers depend on.
pub trait WaterApi: Send + Sync + 'static {
    fn dashboard(&self, tag: &str) -> impl Future<Output = Result<DashboardData, ApiError>> + Send;

    fn tags(&self) -> impl Future<Output = Result<Vec<TagInfo>, ApiError>> + Send;

    fn record_drink(
        &self,
        tag: &str,
        amount_ml: f64,
    ) -> impl Future<Output = Result<serde_json::Value, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct WaterClient {
    http: Client,
    base_url: Url,
}

impl WaterClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Network)?;

        let base_url = base_url.into();
        let parsed = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        Ok(Self { http, base_url: parsed })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub async fn summary(&self, tag: &str) -> Result<DailySummary, ApiError> {
        self.get(self.endpoint(&[tag, "summary"])?).await
    }

    pub async fn recent(&self, tag: &str) -> Result<Vec<IntakeRecord>, ApiError> {
        self.get(self.endpoint(&[tag, "recent"])?).await
    }

    pub async fn weekly(&self, tag: &str) -> Result<WeeklyReport, ApiError> {
        self.get(self.endpoint(&[tag, "weekly"])?).await
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");

        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

impl WaterApi for WaterClient {
    async fn dashboard(&self, tag: &str) -> Result<DashboardData, ApiError> {
        self.get(self.endpoint(&[tag, "dashboard"])?).await
    }

    async fn tags(&self) -> Result<Vec<TagInfo>, ApiError> {
        self.get(self.endpoint(&["tags"])?).await
    }

    async fn record_drink(&self, tag: &str, amount_ml: f64) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["drink"])?;
        let body = DrinkRequest {
            rfid_tag: tag.to_string(),
            amount_ml,
        };
        debug!(%url, tag, amount_ml, "POST");

        let response = self.http.post(url).json(&body).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        // Acknowledgements are opaque; a plain-text body is kept as a string.
        Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = WaterClient::new("http://localhost:8080/api/water/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api/water");
    }

    #[test]
    fn tag_is_encoded_as_a_single_path_segment() {
        let client = WaterClient::new(DEFAULT_BASE_URL).unwrap();
        let url = client.endpoint(&["a/b?c#d", "dashboard"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/water/a%2Fb%3Fc%23d/dashboard");

        let url = client.endpoint(&["TAG001", "summary"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/water/TAG001/summary");
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        assert!(matches!(
            WaterClient::new("not a url"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }
}
