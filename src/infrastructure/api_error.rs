//! Backend call failures
//!
//! Two families: transport failures (the request did not complete with a
//! usable 2xx body) and business failures (the backend answered but reported
//! a non-success status). Nothing here is retried.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("{endpoint} reported status '{status}': {message}")]
    Business {
        endpoint: String,
        status: String,
        message: String,
    },
}

impl ApiError {
    pub fn network(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub fn business(endpoint: &str, status: &str, message: Option<&str>) -> Self {
        Self::Business {
            endpoint: endpoint.to_string(),
            status: status.to_string(),
            message: message.unwrap_or("no message").to_string(),
        }
    }

    /// Whether the request failed to complete. A non-2xx status counts as
    /// transport: its body never reaches the status check.
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Business { .. })
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::Network { endpoint, .. }
            | Self::HttpStatus { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Business { endpoint, .. } => endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transport_failures() {
        assert!(ApiError::network("/agent/trigger", "connection refused").is_transport());
        assert!(
            ApiError::HttpStatus {
                endpoint: "/agent/trigger".into(),
                status: 500
            }
            .is_transport()
        );
        let business = ApiError::business("/demo/reset", "error", Some("db unavailable"));
        assert!(!business.is_transport());
        assert_eq!(business.endpoint(), "/demo/reset");
        assert_eq!(
            business.to_string(),
            "/demo/reset reported status 'error': db unavailable"
        );
    }
}
