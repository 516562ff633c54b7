//! Backend API surface consumed by the dashboard
//!
//! [`DashboardApi`] has one method per endpoint. [`HttpDashboardApi`] talks to
//! the real backend; the in-process `DemoBackend` implements the same trait.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::api_error::ApiResult;
use super::config::ApiConfig;
use super::http_client::{HttpClient, HttpClientConfig};
use crate::domain::{
    ActivityFeed, CustomerList, DashboardMetrics, FeaturesDemo, RealtimeStats, ResetResponse,
    TriggerResponse,
};

/// Backend endpoints, relative to the API base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DashboardMetrics,
    DashboardActivities,
    RealtimeActivities,
    AtRiskCustomers,
    RealtimeStats,
    TriggerAgent,
    ResetDemo,
    FeaturesDemo,
    ChurnAnalytics,
    RealtimeFeed,
    RecentInterventions,
}

impl Endpoint {
    pub const ALL: [Self; 11] = [
        Self::DashboardMetrics,
        Self::DashboardActivities,
        Self::RealtimeActivities,
        Self::AtRiskCustomers,
        Self::RealtimeStats,
        Self::TriggerAgent,
        Self::ResetDemo,
        Self::FeaturesDemo,
        Self::ChurnAnalytics,
        Self::RealtimeFeed,
        Self::RecentInterventions,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Self::DashboardMetrics => "/dashboard/metrics",
            Self::DashboardActivities => "/dashboard/activities",
            Self::RealtimeActivities => "/activities/real-time",
            Self::AtRiskCustomers => "/customers/at-risk",
            Self::RealtimeStats => "/realtime/stats",
            Self::TriggerAgent => "/agent/trigger",
            Self::ResetDemo => "/demo/reset",
            Self::FeaturesDemo => "/tidb/features-demo",
            Self::ChurnAnalytics => "/analytics/churn",
            Self::RealtimeFeed => "/feed/realtime",
            Self::RecentInterventions => "/interventions/recent",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::TriggerAgent | Self::ResetDemo => Method::POST,
            _ => Method::GET,
        }
    }
}

/// Async access to every backend endpoint the dashboard uses.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics>;

    async fn dashboard_activities(&self) -> ApiResult<ActivityFeed>;

    /// DB-backed variant of [`DashboardApi::dashboard_activities`].
    async fn realtime_activities(&self) -> ApiResult<ActivityFeed>;

    async fn at_risk_customers(&self) -> ApiResult<CustomerList>;

    async fn realtime_stats(&self) -> ApiResult<RealtimeStats>;

    /// Run one backend agent cycle. A non-success `status` is returned as `Ok`.
    async fn trigger_agent(&self) -> ApiResult<TriggerResponse>;

    /// A non-success `status` is returned as `Ok`.
    async fn reset_demo(&self) -> ApiResult<ResetResponse>;

    async fn features_demo(&self) -> ApiResult<FeaturesDemo>;

    /// Raw JSON of an auxiliary endpoint.
    async fn auxiliary(&self, endpoint: Endpoint) -> ApiResult<Value>;
}

/// [`DashboardApi`] over HTTP
pub struct HttpDashboardApi {
    http: HttpClient,
    base_url: String,
}

impl HttpDashboardApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let http = HttpClient::new(HttpClientConfig::from(config))?;
        Ok(Self::with_client(http, &config.base_url))
    }

    pub fn with_client(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn call<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResult<T> {
        let url = self.url(endpoint);
        let result = if endpoint.method() == Method::POST {
            self.http.post_json(&url, endpoint.path()).await
        } else {
            self.http.get_json(&url, endpoint.path()).await
        };

        if let Err(e) = &result {
            tracing::warn!(endpoint = endpoint.path(), "Backend call failed: {}", e);
        }
        result
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics> {
        self.call(Endpoint::DashboardMetrics).await
    }

    async fn dashboard_activities(&self) -> ApiResult<ActivityFeed> {
        self.call(Endpoint::DashboardActivities).await
    }

    async fn realtime_activities(&self) -> ApiResult<ActivityFeed> {
        self.call(Endpoint::RealtimeActivities).await
    }

    async fn at_risk_customers(&self) -> ApiResult<CustomerList> {
        self.call(Endpoint::AtRiskCustomers).await
    }

    async fn realtime_stats(&self) -> ApiResult<RealtimeStats> {
        self.call(Endpoint::RealtimeStats).await
    }

    async fn trigger_agent(&self) -> ApiResult<TriggerResponse> {
        self.call(Endpoint::TriggerAgent).await
    }

    async fn reset_demo(&self) -> ApiResult<ResetResponse> {
        self.call(Endpoint::ResetDemo).await
    }

    async fn features_demo(&self) -> ApiResult<FeaturesDemo> {
        self.call(Endpoint::FeaturesDemo).await
    }

    async fn auxiliary(&self, endpoint: Endpoint) -> ApiResult<Value> {
        self.call(endpoint).await
    }
}
