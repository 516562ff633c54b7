//! Infrastructure layer for configuration, logging and backend access
//!
//! The backend is reached through the [`DashboardApi`] trait: over HTTP in
//! normal operation, or through the in-process [`DemoBackend`].

pub mod api_client;
pub mod api_error;
pub mod config;
pub mod demo_backend;
pub mod http_client;
pub mod logging;

// Re-export commonly used items
pub use api_client::{DashboardApi, Endpoint, HttpDashboardApi};
pub use api_error::{ApiError, ApiResult};
pub use config::{ActivitySource, AgentTimeline, ApiConfig, AppConfig, ConfigError, DashboardSettings};
pub use demo_backend::{DemoBackend, Fault};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging_with_config};
