//! Dashboard KPI metrics (read-only, server-sourced)
//!
//! The backend answers with an all-empty fallback payload when its own
//! analytics query fails, so every field here defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardMetrics {
    pub kpis: Kpis,
    pub churn_risk_summary: ChurnRiskSummary,
    pub agent_performance: AgentPerformance,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Kpis {
    pub customers_saved: Kpi,
    pub revenue_retained: Kpi,
    pub churn_reduction: Kpi,
    pub agent_autonomy: Kpi,
}

/// A KPI value with its change caption, e.g. `{ value: 87.5, change: "12 customers at risk" }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Kpi {
    pub value: f64,
    pub change: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnRiskSummary {
    pub total_customers: u64,
    pub high_risk_customers: u64,
    pub total_revenue_at_risk: f64,
    pub churn_distribution: ChurnDistribution,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnDistribution {
    pub critical: RiskSegment,
    pub high: RiskSegment,
    pub medium: RiskSegment,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSegment {
    pub count: u64,
    pub total_at_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPerformance {
    pub avg_response_time_minutes: f64,
    pub customers_processed_24h: u64,
    pub critical_interventions_24h: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autonomy_level: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_payload() {
        let metrics: DashboardMetrics = serde_json::from_value(json!({
            "kpis": {
                "customers_saved": { "value": 12, "change": "+0 from baseline", "label": "Customers Saved from Churn" },
                "revenue_retained": { "value": 1250000, "change": "12 successful interventions" },
                "churn_reduction": { "value": 70.0, "change": "3 customers at risk" },
                "agent_autonomy": { "value": 94.5, "change": "2.3min avg response" }
            },
            "churn_risk_summary": {
                "total_customers": 10,
                "high_risk_customers": 3,
                "total_revenue_at_risk": 78000,
                "churn_distribution": {
                    "critical": { "count": 2, "total_at_risk": 68400 },
                    "high": { "count": 1, "total_at_risk": 9600 }
                }
            },
            "agent_performance": {
                "avg_response_time_minutes": 2.3,
                "customers_processed_24h": 47,
                "critical_interventions_24h": 5,
                "autonomy_level": 94.5
            }
        }))
        .unwrap();

        assert_eq!(metrics.churn_risk_summary.churn_distribution.critical.count, 2);
        assert_eq!(metrics.churn_risk_summary.churn_distribution.medium, RiskSegment::default());
        assert_eq!(metrics.agent_performance.customers_processed_24h, 47);
        assert_eq!(metrics.kpis.customers_saved.label.as_deref(), Some("Customers Saved from Churn"));
    }

    #[test]
    fn parses_fallback_payload() {
        let metrics: DashboardMetrics = serde_json::from_value(json!({
            "kpis": {
                "customers_saved": { "value": 0, "change": "", "label": "Customers Saved" }
            },
            "churn_risk_summary": {
                "total_customers": 0,
                "high_risk_customers": 0,
                "total_revenue_at_risk": 0,
                "churn_distribution": {}
            },
            "agent_performance": {}
        }))
        .unwrap();

        assert_eq!(metrics.agent_performance, AgentPerformance::default());
        assert_eq!(metrics.kpis.revenue_retained, Kpi::default());
    }
}
