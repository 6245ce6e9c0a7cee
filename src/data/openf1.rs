//! OpenF1 API client
//!
//! This module fetches session records from the public OpenF1 REST API
//! (<https://openf1.org>). All endpoints are read-only GETs returning JSON arrays.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default base URL for the OpenF1 API
pub const OPENF1_BASE_URL: &str = "https://api.openf1.org/v1";

const SESSIONS_PATH: &str = "/sessions";

/// Errors that can occur when talking to the API
///
/// Every variant means the remote source could not deliver a usable response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection failure, timeout or body read error
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("openf1: {path} returned {status}")]
    Status { path: String, status: u16 },

    /// The response body was not the expected JSON shape
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A session record exactly as the API returns it
///
/// Dates stay as strings here; they are validated when mapped into
/// [`Session`](super::Session).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSession {
    pub session_key: u32,
    pub session_name: String,
    pub date_start: String,
    pub date_end: Option<String>,
    pub location: String,
    pub country_name: String,
    pub circuit_short_name: String,
    pub meeting_key: u32,
    pub year: i32,
}

/// The remote origin of session data
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// The latest (current or upcoming) session, if any
    async fn next(&self) -> Result<Option<ApiSession>, ApiError>;

    /// The first session matching the filters; an empty `session_name` matches any
    async fn get_session(
        &self,
        country: &str,
        session_name: &str,
        year: i32,
    ) -> Result<Option<ApiSession>, ApiError>;

    /// Every session of a country's event in a year, `None` when there are none
    async fn get_sessions(&self, country: &str, year: i32) -> Result<Option<Vec<ApiSession>>, ApiError>;
}

/// Client for fetching session data from the OpenF1 API
#[derive(Debug, Clone)]
pub struct OpenF1Client {
    http_client: Client,
    base_url: String,
}

impl OpenF1Client {
    /// Creates a client whose requests are bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http_client, base_url))
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Queries `/sessions` with the given filters
    async fn fetch_sessions(&self, query: &[(&str, String)]) -> Result<Vec<ApiSession>, ApiError> {
        let url = format!("{}{}", self.base_url, SESSIONS_PATH);
        debug!(%url, ?query, "requesting sessions");

        let response = self.http_client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                path: SESSIONS_PATH.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let sessions: Vec<ApiSession> = serde_json::from_str(&text)?;
        debug!(count = sessions.len(), "sessions received");
        Ok(sessions)
    }
}

#[async_trait]
impl SessionSource for OpenF1Client {
    async fn next(&self) -> Result<Option<ApiSession>, ApiError> {
        let sessions = self
            .fetch_sessions(&[("session_key", "latest".to_string())])
            .await?;
        Ok(sessions.into_iter().next())
    }

    async fn get_session(
        &self,
        country: &str,
        session_name: &str,
        year: i32,
    ) -> Result<Option<ApiSession>, ApiError> {
        let mut query = vec![("country_name", country.to_string())];
        if !session_name.is_empty() {
            query.push(("session_name", session_name.to_string()));
        }
        query.push(("year", year.to_string()));

        let sessions = self.fetch_sessions(&query).await?;
        Ok(sessions.into_iter().next())
    }

    async fn get_sessions(&self, country: &str, year: i32) -> Result<Option<Vec<ApiSession>>, ApiError> {
        let query = [
            ("country_name", country.to_string()),
            ("year", year.to_string()),
        ];
        let sessions = self.fetch_sessions(&query).await?;
        Ok(if sessions.is_empty() { None } else { Some(sessions) })
    }
}
