//! Domain module - dashboard records and backend payloads
//!
//! Activity, customer and metrics records as the backend sends them, plus
//! the constants the controller is tuned with.

pub mod activity;
pub mod constants;
pub mod customer;
pub mod metrics;
pub mod payloads;

// Re-export commonly used items
pub use activity::{
    ActivityKind, ActivityMetadata, ActivityRecord, ActivityStatus, ActivityTimestamp, Annotation,
    Urgency,
};
pub use customer::{CustomerRecord, RiskLevel};
pub use metrics::{
    AgentPerformance, ChurnDistribution, ChurnRiskSummary, DashboardMetrics, Kpi, Kpis,
    RiskSegment,
};
pub use payloads::{
    ActivityFeed, CustomerList, FeatureShowcase, FeaturesDemo, RealtimeStats, ResetResponse,
    TriggerResponse,
};
