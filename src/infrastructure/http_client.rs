//! HTTP client for the dashboard backend with optional rate limiting
//!
//! No client-side timeout is set unless one is configured, and no request is
//! retried. Every failure is mapped to an [`ApiError`].

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::{
    Client, RequestBuilder,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;

use super::api_error::{ApiError, ApiResult};
use super::config::ApiConfig;

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub max_requests_per_second: Option<u32>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for HttpClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            user_agent: api.user_agent.clone(),
            timeout: api.timeout_seconds.map(Duration::from_secs),
            max_requests_per_second: api.max_requests_per_second,
        }
    }
}

/// reqwest client plus an optional outbound rate limiter
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let rate_limiter = match config.max_requests_per_second {
            Some(rps) => {
                let rps = NonZeroU32::new(rps).context("Rate limit must be greater than 0")?;
                Some(RateLimiter::direct(Quota::per_second(rps)))
            }
            None => None,
        };

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// `GET url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, endpoint: &str) -> ApiResult<T> {
        self.send(self.client.get(url), url, endpoint).await
    }

    /// `POST url` with an empty body and decode the JSON answer.
    pub async fn post_json<T: DeserializeOwned>(&self, url: &str, endpoint: &str) -> ApiResult<T> {
        self.send(self.client.post(url), url, endpoint).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        endpoint: &str,
    ) -> ApiResult<T> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        tracing::debug!("Requesting {}", url);

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(endpoint, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(endpoint, e.to_string()))?;

        tracing::debug!("Received {} bytes from {} ({})", body.len(), endpoint, status);

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_timeout_or_limit() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_requests_per_second, None);
        assert!(config.user_agent.starts_with("csa-dashboard/"));
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let config = HttpClientConfig {
            max_requests_per_second: Some(0),
            ..HttpClientConfig::default()
        };
        assert!(HttpClient::new(config).is_err());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = HttpClient::new(HttpClientConfig {
            timeout: Some(Duration::from_secs(2)),
            ..HttpClientConfig::default()
        })
        .unwrap();

        let err = client
            .get_json::<serde_json::Value>("http://127.0.0.1:9/api/dashboard/metrics", "/dashboard/metrics")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
        assert!(err.is_transport());
    }
}
