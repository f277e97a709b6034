// Analysis service HTTP client.
// Handles base-URL resolution, request timeouts, and response status checking.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
    multipart::Form,
};

use crate::error::{Result, StriderError};

/// Base URL used when STRIDER_API_BASE is not set.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Environment variable overriding the analysis service base URL.
pub const API_BASE_ENV: &str = "STRIDER_API_BASE";

/// Upper bound on any single request. A per-component call that exceeds it
/// is treated as an item failure and skipped, not retried.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the analysis service.
pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    /// Create a client for the given base URL (trailing slash tolerated).
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("strider-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StriderError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from STRIDER_API_BASE, falling back to localhost.
    pub fn from_env() -> Result<Self> {
        let base = std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(&base)
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request to the analysis service.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).send().await.map_err(StriderError::Api)?;
        check_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(StriderError::Api)?;
        check_response(response).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(StriderError::Api)?;
        check_response(response).await
    }

    /// Make a POST request with a multipart form body.
    pub async fn post_multipart(&self, endpoint: &str, form: Form) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(StriderError::Api)?;
        check_response(response).await
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    match response.status() {
        StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => Ok(response),
        StatusCode::NOT_FOUND => {
            let url = response.url().to_string();
            Err(StriderError::NotFound(url))
        }
        status => Err(StriderError::Backend {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        }),
    }
}
