//! Response envelopes of the backend endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::activity::ActivityRecord;
use super::constants::api::STATUS_SUCCESS;
use super::customer::CustomerRecord;

/// `{ activities: [...] }` from `/dashboard/activities` and `/activities/real-time`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityFeed {
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

/// `{ customers: [...] }` from `/customers/at-risk`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerList {
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
}

/// Aggregate counts from `/realtime/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RealtimeStats {
    pub total_customers: u64,
    pub agent_memories: u64,
    pub communications: u64,
    pub high_risk_customers: u64,
}

/// Result of `POST /agent/trigger`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interventions_executed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities_created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TriggerResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Result of `POST /demo/reset`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResetResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResetResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Feature showcase payload from `/tidb/features-demo`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeaturesDemo {
    #[serde(default)]
    pub tidb_features_demo: FeatureShowcase,
}

/// Each section is opaque: it is only pretty-printed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureShowcase {
    pub vector_search: Value,
    pub full_text_search: Value,
    pub graph_rag: Value,
    pub htap_processing: Value,
}
