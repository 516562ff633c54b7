//! Synthetic activity records shown while an agent run animates
//!
//! Fixed narrative templates; only the customer-saved record carries real
//! customer data.

use serde_json::Value;

use crate::domain::{
    ActivityKind, ActivityMetadata, ActivityRecord, ActivityStatus, ActivityTimestamp, Annotation,
    CustomerRecord, Urgency, constants::risk::RISK_AFTER_SAVE,
};

const SCAN_CUSTOMERS: u64 = 1247;
const RECALLED_CASES: u64 = 3;
const MESSAGES_READ: u64 = 247;
const RECALLED_SUCCESS_RATE: f64 = 0.89;

/// Metadata carried on the wire but not surfaced as a tag.
fn passthrough(key: &str, value: impl Into<Value>) -> Annotation {
    Annotation::Unrecognized {
        key: key.to_owned(),
        value: value.into(),
    }
}

fn record(
    prefix: &str,
    kind: ActivityKind,
    title: impl Into<String>,
    description: impl Into<String>,
    status: ActivityStatus,
    urgency: Urgency,
    timestamp: ActivityTimestamp,
    metadata: ActivityMetadata,
) -> ActivityRecord {
    ActivityRecord {
        id: ActivityRecord::synthetic_id(prefix),
        kind,
        title: title.into(),
        description: description.into(),
        status,
        urgency,
        timestamp,
        metadata,
    }
}

/// Opening step: the agent scans the customer base.
pub fn customer_analysis() -> ActivityRecord {
    record(
        "analysis",
        ActivityKind::CustomerAnalysis,
        "🔍 AI Agent: Analyzing customer behavior patterns...",
        "Agent scanning 1,247 customer profiles • Finding similar cases from successful interventions • Identifying optimal retention strategies",
        ActivityStatus::Executing,
        Urgency::High,
        ActivityTimestamp::Now,
        ActivityMetadata::new().with(Annotation::CustomersAnalyzed(SCAN_CUSTOMERS)),
    )
}

pub fn strategy_recall() -> ActivityRecord {
    record(
        "strategy",
        ActivityKind::StrategySelection,
        "🧠 AI Agent: Found proven retention strategies",
        "Agent recalled 3 similar cases from past successes • Same customer segment with 91% risk → 89% success rate • Strategy: Personalized training approach",
        ActivityStatus::Success,
        Urgency::Medium,
        ActivityTimestamp::JustNow,
        ActivityMetadata::new()
            .with(Annotation::SimilarCases(RECALLED_CASES))
            .with(passthrough("success_rate", RECALLED_SUCCESS_RATE)),
    )
}

pub fn communication_insight() -> ActivityRecord {
    record(
        "communication",
        ActivityKind::CommunicationInsight,
        "📞 AI Agent: Discovered customer pain points",
        "Agent analyzed 247 recent messages • Detected frustration with billing complexity • Key insight: Customer needs simplified onboarding",
        ActivityStatus::Warning,
        Urgency::High,
        ActivityTimestamp::JustNow,
        ActivityMetadata::new()
            .with(Annotation::MessagesAnalyzed(MESSAGES_READ))
            .with(passthrough("sentiment", "frustrated")),
    )
}

/// A rescued customer, with before/after churn probability.
pub fn customer_saved(customer: &CustomerRecord) -> ActivityRecord {
    record(
        "save",
        ActivityKind::CustomerSaved,
        format!("✅ CUSTOMER SAVED: {} ({})", customer.name, customer.company),
        format!(
            "AI agent successfully prevented churn • Risk reduced from {:.0}% to {:.0}% • ${:.0}K revenue secured",
            customer.churn_probability * 100.0,
            RISK_AFTER_SAVE * 100.0,
            customer.annual_contract_value / 1000.0
        ),
        ActivityStatus::Success,
        Urgency::Low,
        ActivityTimestamp::JustNow,
        ActivityMetadata::new()
            .with(Annotation::Customer(customer.name.clone()))
            .with(Annotation::RevenueSaved(customer.annual_contract_value))
            .with(Annotation::RiskBefore(customer.churn_probability))
            .with(Annotation::RiskAfter(RISK_AFTER_SAVE)),
    )
}

/// Shown when the backend completes the cycle but reports failure.
pub fn self_correction() -> ActivityRecord {
    record(
        "correction",
        ActivityKind::SelfCorrection,
        "🔄 Agent Self-Correction: Adapted strategy for better results",
        "Initial email approach failed • Agent automatically switched to phone outreach • Customer successfully engaged",
        ActivityStatus::Corrected,
        Urgency::Medium,
        ActivityTimestamp::JustNow,
        ActivityMetadata::new(),
    )
}

pub fn agent_learning() -> ActivityRecord {
    record(
        "learning",
        ActivityKind::AgentLearning,
        "📈 AI Agent: Learning from success",
        "Agent updated retention patterns • Strategy effectiveness confirmed • Similar future cases will benefit from this approach",
        ActivityStatus::Info,
        Urgency::Low,
        ActivityTimestamp::JustNow,
        ActivityMetadata::new().with(passthrough("patterns_updated", 1_u64)),
    )
}
