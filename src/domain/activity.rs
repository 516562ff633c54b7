//! Activity feed records
//!
//! An activity is one event in the live feed, either fetched from the backend
//! or synthesized locally while a scripted agent run is animating. Records
//! deserialize leniently: the backend omits fields freely and sends tags the
//! client does not know about, so every tag type carries an explicit
//! catch-all instead of failing the whole feed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A single entry of the activity feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Stable identity for list rendering; uniqueness is best-effort.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub timestamp: ActivityTimestamp,
    #[serde(default)]
    pub metadata: ActivityMetadata,
}

impl ActivityRecord {
    /// Time-independent id for a locally synthesized record, e.g. `analysis-3f2a…`.
    pub fn synthetic_id(prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4().simple())
    }

    /// Whether the timestamp is one of the "just happened" sentinels.
    pub const fn is_fresh(&self) -> bool {
        self.timestamp.is_fresh()
    }
}

/// Activity type tag (`type` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ActivityKind {
    CustomerAnalysis,
    StrategySelection,
    CommunicationInsight,
    AgentLearning,
    CustomerSaved,
    SelfCorrection,
    TidbVectorSearch,
    AgentMemoryRecall,
    CommunicationAnalysis,
    GraphRagAnalysis,
    HtapProcessing,
    AgentTriggered,
    ChurnIntervention,
    /// Anything else, including the literal `other`. The raw tag is kept.
    Other(String),
}

impl ActivityKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "customer_analysis" => Self::CustomerAnalysis,
            "strategy_selection" => Self::StrategySelection,
            "communication_insight" => Self::CommunicationInsight,
            "agent_learning" => Self::AgentLearning,
            "customer_saved" => Self::CustomerSaved,
            "self_correction" => Self::SelfCorrection,
            "tidb_vector_search" => Self::TidbVectorSearch,
            "agent_memory_recall" => Self::AgentMemoryRecall,
            "communication_analysis" => Self::CommunicationAnalysis,
            "graph_rag_analysis" => Self::GraphRagAnalysis,
            "htap_processing" => Self::HtapProcessing,
            "agent_triggered" => Self::AgentTriggered,
            "churn_intervention" => Self::ChurnIntervention,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CustomerAnalysis => "customer_analysis",
            Self::StrategySelection => "strategy_selection",
            Self::CommunicationInsight => "communication_insight",
            Self::AgentLearning => "agent_learning",
            Self::CustomerSaved => "customer_saved",
            Self::SelfCorrection => "self_correction",
            Self::TidbVectorSearch => "tidb_vector_search",
            Self::AgentMemoryRecall => "agent_memory_recall",
            Self::CommunicationAnalysis => "communication_analysis",
            Self::GraphRagAnalysis => "graph_rag_analysis",
            Self::HtapProcessing => "htap_processing",
            Self::AgentTriggered => "agent_triggered",
            Self::ChurnIntervention => "churn_intervention",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for ActivityKind {
    fn default() -> Self {
        Self::Other("other".to_owned())
    }
}

impl From<Option<String>> for ActivityKind {
    fn from(raw: Option<String>) -> Self {
        raw.map_or_else(Self::default, |s| Self::parse(&s))
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution status of an activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ActivityStatus {
    Executing,
    Success,
    Warning,
    #[default]
    Info,
    Corrected,
    Failed,
    Monitoring,
    Other(String),
}

impl ActivityStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "executing" => Self::Executing,
            "success" => Self::Success,
            "warning" => Self::Warning,
            "info" => Self::Info,
            "corrected" => Self::Corrected,
            "failed" => Self::Failed,
            "monitoring" => Self::Monitoring,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Executing => "executing",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Corrected => "corrected",
            Self::Failed => "failed",
            Self::Monitoring => "monitoring",
            Self::Other(raw) => raw,
        }
    }
}

impl From<Option<String>> for ActivityStatus {
    fn from(raw: Option<String>) -> Self {
        raw.map_or_else(Self::default, |s| Self::parse(&s))
    }
}

impl From<ActivityStatus> for String {
    fn from(status: ActivityStatus) -> Self {
        status.as_str().to_owned()
    }
}

/// Urgency of an activity. Absent or unrecognised values read as `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    #[default]
    Low,
}

impl Urgency {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
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
}

impl From<Option<String>> for Urgency {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map_or_else(Self::default, Self::parse)
    }
}

impl From<Urgency> for String {
    fn from(urgency: Urgency) -> Self {
        urgency.as_str().to_owned()
    }
}

/// Display timestamp. Not a sortable instant; the feed is ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ActivityTimestamp {
    /// `"Now"`
    Now,
    /// `"Just now"`
    JustNow,
    /// `"N min ago"`
    MinutesAgo(u32),
    /// Any other server-provided label (`"2h ago"`, `"Mar 03"`, ...).
    Label(String),
}

impl ActivityTimestamp {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Now" => Self::Now,
            "Just now" => Self::JustNow,
            other => other
                .strip_suffix(" min ago")
                .and_then(|n| n.trim().parse::<u32>().ok())
                .map_or_else(|| Self::Label(other.to_owned()), Self::MinutesAgo),
        }
    }

    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Now | Self::JustNow)
    }
}

impl Default for ActivityTimestamp {
    fn default() -> Self {
        Self::Label(String::new())
    }
}

impl fmt::Display for ActivityTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("Now"),
            Self::JustNow => f.write_str("Just now"),
            Self::MinutesAgo(n) => write!(f, "{n} min ago"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl From<Option<String>> for ActivityTimestamp {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map_or_else(Self::default, Self::parse)
    }
}

impl From<ActivityTimestamp> for String {
    fn from(timestamp: ActivityTimestamp) -> Self {
        timestamp.to_string()
    }
}

/// One metadata entry, typed when the key is known.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    CustomersAnalyzed(u64),
    SimilarCases(u64),
    MessagesAnalyzed(u64),
    RevenueSaved(f64),
    EmbeddingsProcessing(u64),
    MemoriesFound(u64),
    ChurnProbability(f64),
    RevenueAtRisk(f64),
    RiskBefore(f64),
    RiskAfter(f64),
    Customer(String),
    /// Unknown key, or a known key carrying an unexpected JSON type.
    Unrecognized { key: String, value: Value },
}

impl Annotation {
    pub fn from_entry(key: String, value: Value) -> Self {
        let typed = match key.as_str() {
            "customers_analyzed" => count(&value).map(Self::CustomersAnalyzed),
            "similar_cases" => count(&value).map(Self::SimilarCases),
            "messages_analyzed" => count(&value).map(Self::MessagesAnalyzed),
            "revenue_saved" => value.as_f64().map(Self::RevenueSaved),
            "embeddings_processing" => count(&value).map(Self::EmbeddingsProcessing),
            "memories_found" => count(&value).map(Self::MemoriesFound),
            "churn_probability" => value.as_f64().map(Self::ChurnProbability),
            "revenue_at_risk" => value.as_f64().map(Self::RevenueAtRisk),
            "risk_before" => value.as_f64().map(Self::RiskBefore),
            "risk_after" => value.as_f64().map(Self::RiskAfter),
            "customer" => value.as_str().map(|name| Self::Customer(name.to_owned())),
            _ => None,
        };
        typed.unwrap_or_else(|| Self::Unrecognized { key, value })
    }

    pub fn key(&self) -> &str {
        match self {
            Self::CustomersAnalyzed(_) => "customers_analyzed",
            Self::SimilarCases(_) => "similar_cases",
            Self::MessagesAnalyzed(_) => "messages_analyzed",
            Self::RevenueSaved(_) => "revenue_saved",
            Self::EmbeddingsProcessing(_) => "embeddings_processing",
            Self::MemoriesFound(_) => "memories_found",
            Self::ChurnProbability(_) => "churn_probability",
            Self::RevenueAtRisk(_) => "revenue_at_risk",
            Self::RiskBefore(_) => "risk_before",
            Self::RiskAfter(_) => "risk_after",
            Self::Customer(_) => "customer",
            Self::Unrecognized { key, .. } => key,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::CustomersAnalyzed(n)
            | Self::SimilarCases(n)
            | Self::MessagesAnalyzed(n)
            | Self::EmbeddingsProcessing(n)
            | Self::MemoriesFound(n) => Value::from(*n),
            Self::RevenueSaved(v)
            | Self::ChurnProbability(v)
            | Self::RevenueAtRisk(v)
            | Self::RiskBefore(v)
            | Self::RiskAfter(v) => Value::from(*v),
            Self::Customer(name) => Value::from(name.clone()),
            Self::Unrecognized { value, .. } => value.clone(),
        }
    }
}

fn count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    })
}

/// Metadata mapping of an activity, as typed annotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Map<String, Value>>", into = "Map<String, Value>")]
pub struct ActivityMetadata(Vec<Annotation>);

impl ActivityMetadata {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.0.push(annotation);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Annotation>> for ActivityMetadata {
    fn from(annotations: Vec<Annotation>) -> Self {
        Self(annotations)
    }
}

impl From<Option<Map<String, Value>>> for ActivityMetadata {
    fn from(raw: Option<Map<String, Value>>) -> Self {
        raw.map_or_else(Self::new, |map| {
            Self(
                map.into_iter()
                    .map(|(key, value)| Annotation::from_entry(key, value))
                    .collect(),
            )
        })
    }
}

impl From<ActivityMetadata> for Map<String, Value> {
    fn from(metadata: ActivityMetadata) -> Self {
        metadata
            .0
            .iter()
            .map(|a| (a.key().to_owned(), a.to_value()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ActivityMetadata {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_backend_churn_intervention() {
        let raw = json!({
            "id": "intervention_42",
            "type": "churn_intervention",
            "title": "🚨 Customer at Risk: Mike Rodriguez (GrowthCorp)",
            "description": "Churn risk: 91% • Revenue at risk: $54K",
            "status": "executing",
            "urgency": "critical",
            "timestamp": "2 min ago",
            "metadata": {
                "customer": "Mike Rodriguez",
                "churn_probability": 0.91,
                "revenue_at_risk": 54000,
                "intervention": "personal_call",
                "confidence": 0.8
            }
        });

        let record: ActivityRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.kind, ActivityKind::ChurnIntervention);
        assert_eq!(record.status, ActivityStatus::Executing);
        assert_eq!(record.urgency, Urgency::Critical);
        assert_eq!(record.timestamp, ActivityTimestamp::MinutesAgo(2));
        assert!(record.metadata.iter().any(|a| *a == Annotation::ChurnProbability(0.91)));
        assert!(record.metadata.iter().any(|a| *a == Annotation::RevenueAtRisk(54000.0)));
        assert!(record.metadata.iter().any(|a| matches!(
            a,
            Annotation::Unrecognized { key, .. } if key == "intervention"
        )));
    }

    #[test]
    fn missing_and_unknown_tags_fall_back() {
        let raw = json!({
            "id": "followup_7",
            "type": "intervention_followup",
            "status": "monitoring",
            "urgency": null
        });

        let record: ActivityRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.kind, ActivityKind::Other("intervention_followup".into()));
        assert_eq!(record.status, ActivityStatus::Monitoring);
        assert_eq!(record.urgency, Urgency::Low);
        assert!(record.metadata.is_empty());
        assert!(!record.is_fresh());
    }

    #[test]
    fn unrecognized_urgency_reads_low() {
        let record: ActivityRecord =
            serde_json::from_value(json!({ "urgency": "extreme" })).unwrap();
        assert_eq!(record.urgency, Urgency::Low);
        assert_eq!(record.kind.as_str(), "other");
    }

    #[test]
    fn wrongly_typed_known_key_is_kept_unrecognized() {
        let annotation = Annotation::from_entry("similar_cases".into(), json!("three"));
        assert_eq!(
            annotation,
            Annotation::Unrecognized {
                key: "similar_cases".into(),
                value: json!("three"),
            }
        );
    }

    #[test]
    fn fresh_sentinels() {
        assert!(ActivityTimestamp::parse("Now").is_fresh());
        assert!(ActivityTimestamp::parse("Just now").is_fresh());
        assert!(!ActivityTimestamp::parse("15 min ago").is_fresh());
        assert_eq!(
            ActivityTimestamp::parse("2h ago"),
            ActivityTimestamp::Label("2h ago".into())
        );
    }

    #[test]
    fn serializes_to_wire_shape() {
        let record = ActivityRecord {
            id: "save-1".into(),
            kind: ActivityKind::CustomerSaved,
            title: "saved".into(),
            description: String::new(),
            status: ActivityStatus::Success,
            urgency: Urgency::Low,
            timestamp: ActivityTimestamp::JustNow,
            metadata: ActivityMetadata::new()
                .with(Annotation::RevenueSaved(14_400.0))
                .with(Annotation::Customer("Sarah Chen".into())),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "customer_saved");
        assert_eq!(value["timestamp"], "Just now");
        assert_eq!(value["urgency"], "low");
        assert_eq!(value["metadata"]["revenue_saved"], 14_400.0);
        assert_eq!(value["metadata"]["customer"], "Sarah Chen");
    }
}
