//! At-risk customer records (read-only, server-sourced)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::constants::risk;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// The backend sends integer ids; string ids are accepted too.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    /// In `[0, 1]`.
    #[serde(default)]
    pub churn_probability: f64,
    #[serde(default)]
    pub annual_contract_value: f64,
    #[serde(default)]
    pub last_login_days_ago: u32,
    /// In `[0, 1]`.
    #[serde(default)]
    pub feature_usage_score: f64,
    #[serde(default)]
    pub churn_risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_tickets_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nps_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_signup: Option<u32>,
}

/// Churn risk bucket of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    #[default]
    Low,
}

impl RiskLevel {
    /// Same thresholds the backend predictor uses.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= risk::CRITICAL_THRESHOLD {
            Self::Critical
        } else if probability >= risk::HIGH_THRESHOLD {
            Self::High
        } else if probability >= risk::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Card accent colour.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Critical => "#ef4444",
            Self::High => "#f59e0b",
            Self::Medium => "#3b82f6",
            Self::Low => "#10b981",
        }
    }
}

impl From<Option<String>> for RiskLevel {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            Some("critical") => Self::Critical,
            Some("high") => Self::High,
            Some("medium") => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.as_str().to_owned()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
