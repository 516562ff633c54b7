//! In-process demo backend
//!
//! Serves the same payloads as the real API from an in-memory customer book
//! seeded with the demo customers. Failures and latency can be injected per
//! endpoint, and every call is counted. Used by `--offline` and the tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::api_client::{DashboardApi, Endpoint};
use super::api_error::{ApiError, ApiResult};
use crate::domain::{
    ActivityFeed, ActivityKind, ActivityMetadata, ActivityRecord, ActivityStatus,
    ActivityTimestamp, AgentPerformance, Annotation, ChurnDistribution, ChurnRiskSummary,
    CustomerList, CustomerRecord, DashboardMetrics, FeatureShowcase, FeaturesDemo, Kpi, Kpis,
    RealtimeStats, ResetResponse, RiskLevel, RiskSegment, TriggerResponse, Urgency,
    constants::{api::STATUS_SUCCESS, risk},
};

/// Probability at or above which the backend agent intervenes.
const INTERVENTION_THRESHOLD: f64 = 0.75;
/// Customers processed per agent cycle.
const INTERVENTIONS_PER_CYCLE: usize = 3;
/// Probability after a successful backend intervention.
const RISK_AFTER_INTERVENTION: f64 = 0.25;
const AT_RISK_LIMIT: usize = 20;
const DB_FEED_LIMIT: usize = 20;
const AGENT_MEMORIES: u64 = 12;
const COMMUNICATIONS: u64 = 40;

/// A failure to inject into one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Request never completes.
    Network,
    /// Non-2xx answer.
    HttpStatus(u16),
    /// Backend answers with a non-success `status` (trigger, reset), or with
    /// its empty fallback payload (read endpoints).
    Business(String),
}

#[derive(Debug, Clone)]
struct FaultPlan {
    fault: Fault,
    /// `None` keeps failing until cleared.
    remaining: Option<u32>,
}

#[derive(Debug, Clone)]
struct DemoState {
    customers: Vec<CustomerRecord>,
    dashboard_feed: Vec<ActivityRecord>,
    db_feed: Vec<ActivityRecord>,
    customers_saved: u64,
    critical_saves: u64,
    revenue_retained: f64,
    next_activity_id: u64,
}

/// [`DashboardApi`] backed by memory
pub struct DemoBackend {
    state: Mutex<DemoState>,
    faults: Mutex<HashMap<Endpoint, FaultPlan>>,
    latency: Mutex<HashMap<Endpoint, Duration>>,
    calls: HashMap<Endpoint, AtomicUsize>,
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoBackend {
    /// Backend seeded with the demo customer book.
    pub fn new() -> Self {
        Self::with_customers(seed_customers())
    }

    pub fn with_customers(customers: Vec<CustomerRecord>) -> Self {
        Self {
            state: Mutex::new(DemoState::seeded(customers)),
            faults: Mutex::new(HashMap::new()),
            latency: Mutex::new(HashMap::new()),
            calls: Endpoint::ALL
                .into_iter()
                .map(|e| (e, AtomicUsize::new(0)))
                .collect(),
        }
    }

    /// Fail every call to `endpoint` until [`DemoBackend::clear_failure`].
    pub async fn inject_failure(&self, endpoint: Endpoint, fault: Fault) {
        self.faults.lock().await.insert(
            endpoint,
            FaultPlan {
                fault,
                remaining: None,
            },
        );
    }

    /// Fail only the next call to `endpoint`.
    pub async fn inject_failure_once(&self, endpoint: Endpoint, fault: Fault) {
        self.faults.lock().await.insert(
            endpoint,
            FaultPlan {
                fault,
                remaining: Some(1),
            },
        );
    }

    pub async fn clear_failure(&self, endpoint: Endpoint) {
        self.faults.lock().await.remove(&endpoint);
    }

    /// Delay every answer of `endpoint`.
    pub async fn set_latency(&self, endpoint: Endpoint, delay: Duration) {
        self.latency.lock().await.insert(endpoint, delay);
    }

    /// Number of calls received by `endpoint`, failed ones included.
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .get(&endpoint)
            .map_or(0, |c| c.load(Ordering::SeqCst))
    }

    /// Replace the customer book, e.g. to empty the at-risk list.
    pub async fn set_customers(&self, customers: Vec<CustomerRecord>) {
        self.state.lock().await.customers = customers;
    }

    /// Count the call, wait out the latency and return the fault due, if any.
    async fn enter(&self, endpoint: Endpoint) -> Option<Fault> {
        if let Some(counter) = self.calls.get(&endpoint) {
            counter.fetch_add(1, Ordering::SeqCst);
        }

        let delay = self.latency.lock().await.get(&endpoint).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut faults = self.faults.lock().await;
        let plan = faults.get_mut(&endpoint)?;
        let fault = plan.fault.clone();
        let exhausted = match &mut plan.remaining {
            Some(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            }
            None => false,
        };
        if exhausted {
            faults.remove(&endpoint);
        }
        debug!(endpoint = endpoint.path(), ?fault, "Injecting demo backend fault");
        Some(fault)
    }

    /// Transport faults become errors; a business fault is handed back to the caller.
    async fn guard(&self, endpoint: Endpoint) -> ApiResult<Option<String>> {
        match self.enter(endpoint).await {
            None => Ok(None),
            Some(Fault::Network) => Err(ApiError::network(
                endpoint.path(),
                "connection refused (injected)",
            )),
            Some(Fault::HttpStatus(status)) => Err(ApiError::HttpStatus {
                endpoint: endpoint.path().to_string(),
                status,
            }),
            Some(Fault::Business(message)) => Ok(Some(message)),
        }
    }
}

#[async_trait]
impl DashboardApi for DemoBackend {
    async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics> {
        if self.guard(Endpoint::DashboardMetrics).await?.is_some() {
            return Ok(fallback_metrics());
        }
        Ok(self.state.lock().await.metrics())
    }

    async fn dashboard_activities(&self) -> ApiResult<ActivityFeed> {
        if self.guard(Endpoint::DashboardActivities).await?.is_some() {
            return Ok(ActivityFeed::default());
        }
        Ok(ActivityFeed {
            activities: self.state.lock().await.dashboard_feed.clone(),
        })
    }

    async fn realtime_activities(&self) -> ApiResult<ActivityFeed> {
        if self.guard(Endpoint::RealtimeActivities).await?.is_some() {
            return Ok(ActivityFeed::default());
        }
        Ok(ActivityFeed {
            activities: self.state.lock().await.db_feed.clone(),
        })
    }

    async fn at_risk_customers(&self) -> ApiResult<CustomerList> {
        if self.guard(Endpoint::AtRiskCustomers).await?.is_some() {
            return Ok(CustomerList::default());
        }
        Ok(CustomerList {
            customers: self.state.lock().await.at_risk(),
        })
    }

    async fn realtime_stats(&self) -> ApiResult<RealtimeStats> {
        if self.guard(Endpoint::RealtimeStats).await?.is_some() {
            return Ok(RealtimeStats::default());
        }
        let state = self.state.lock().await;
        Ok(RealtimeStats {
            total_customers: state.customers.len() as u64,
            agent_memories: AGENT_MEMORIES,
            communications: COMMUNICATIONS,
            high_risk_customers: state.at_risk().len() as u64,
        })
    }

    async fn trigger_agent(&self) -> ApiResult<TriggerResponse> {
        if let Some(message) = self.guard(Endpoint::TriggerAgent).await? {
            return Ok(TriggerResponse {
                status: "error".into(),
                message: Some(message),
                ..TriggerResponse::default()
            });
        }

        let mut state = self.state.lock().await;
        let saved = state.run_agent_cycle();
        info!(interventions = saved, "Demo backend agent cycle finished");

        Ok(TriggerResponse {
            status: STATUS_SUCCESS.into(),
            interventions_executed: Some(saved as u64),
            activities_created: Some(saved as u64 * 2 + 2),
            message: Some(format!(
                "Enhanced agent processed {} customers, executed {} interventions",
                state.customers.len(),
                saved
            )),
        })
    }

    async fn reset_demo(&self) -> ApiResult<ResetResponse> {
        if let Some(message) = self.guard(Endpoint::ResetDemo).await? {
            return Ok(ResetResponse {
                status: "error".into(),
                message: Some(message),
            });
        }

        *self.state.lock().await = DemoState::seeded(seed_customers());
        info!("Demo backend reset to seed data");
        Ok(ResetResponse {
            status: STATUS_SUCCESS.into(),
            message: Some("Demo data reset".into()),
        })
    }

    async fn features_demo(&self) -> ApiResult<FeaturesDemo> {
        if self.guard(Endpoint::FeaturesDemo).await?.is_some() {
            return Ok(FeaturesDemo::default());
        }
        let state = self.state.lock().await;
        Ok(FeaturesDemo {
            tidb_features_demo: FeatureShowcase {
                vector_search: json!({
                    "description": "Similar customer behaviour via embedding similarity",
                    "embeddings_indexed": state.customers.len(),
                }),
                full_text_search: json!({
                    "description": "Support ticket and message search",
                    "documents_indexed": COMMUNICATIONS,
                }),
                graph_rag: json!({
                    "description": "Retention strategy graph over past interventions",
                    "memories": AGENT_MEMORIES,
                }),
                htap_processing: json!({
                    "description": "Live churn analytics on transactional data",
                    "customers_analyzed": state.customers.len(),
                    "high_risk": state.at_risk().len(),
                }),
            },
        })
    }

    async fn auxiliary(&self, endpoint: Endpoint) -> ApiResult<Value> {
        let fallback = self.guard(endpoint).await?.is_some();
        let state = self.state.lock().await;
        let value = match endpoint {
            _ if fallback => json!({}),
            Endpoint::ChurnAnalytics => {
                let metrics = state.metrics();
                json!({
                    "total_customers": metrics.churn_risk_summary.total_customers,
                    "high_risk_customers": metrics.churn_risk_summary.high_risk_customers,
                    "churn_distribution": metrics.churn_risk_summary.churn_distribution,
                    "agent_performance": metrics.agent_performance,
                })
            }
            Endpoint::RealtimeFeed => json!({
                "feed": state.customers.iter().map(|c| json!({
                    "customer": c.name,
                    "company": c.company,
                    "last_login_days_ago": c.last_login_days_ago,
                    "churn_probability": c.churn_probability,
                })).collect::<Vec<_>>()
            }),
            Endpoint::RecentInterventions => json!({
                "interventions": state.db_feed.iter()
                    .filter(|a| a.kind == ActivityKind::CustomerSaved)
                    .map(|a| json!({ "id": a.id, "description": a.description }))
                    .collect::<Vec<_>>()
            }),
            other => {
                return Err(ApiError::HttpStatus {
                    endpoint: other.path().to_string(),
                    status: 404,
                });
            }
        };
        Ok(value)
    }
}

impl DemoState {
    fn seeded(customers: Vec<CustomerRecord>) -> Self {
        let mut state = Self {
            customers,
            dashboard_feed: Vec::new(),
            db_feed: Vec::new(),
            customers_saved: 0,
            critical_saves: 0,
            revenue_retained: 0.0,
            next_activity_id: 1,
        };
        state.dashboard_feed = state.at_risk().iter().take(2).map(intervention_record).collect();
        state
    }

    /// Probability ≥ 0.6, highest first, at most 20.
    fn at_risk(&self) -> Vec<CustomerRecord> {
        let mut at_risk: Vec<_> = self
            .customers
            .iter()
            .filter(|c| c.churn_probability >= risk::HIGH_THRESHOLD)
            .cloned()
            .collect();
        at_risk.sort_by(|a, b| b.churn_probability.total_cmp(&a.churn_probability));
        at_risk.truncate(AT_RISK_LIMIT);
        at_risk
    }

    fn metrics(&self) -> DashboardMetrics {
        let segment = |lo: f64, hi: f64| {
            let members = self
                .customers
                .iter()
                .filter(|c| c.churn_probability >= lo && c.churn_probability < hi);
            members.fold(RiskSegment::default(), |acc, c| RiskSegment {
                count: acc.count + 1,
                total_at_risk: acc.total_at_risk + c.annual_contract_value,
            })
        };
        let distribution = ChurnDistribution {
            critical: segment(risk::CRITICAL_THRESHOLD, f64::INFINITY),
            high: segment(risk::HIGH_THRESHOLD, risk::CRITICAL_THRESHOLD),
            medium: segment(risk::MEDIUM_THRESHOLD, risk::HIGH_THRESHOLD),
        };

        let total = self.customers.len() as u64;
        let high_risk = self.at_risk().len() as u64;
        let retention = (total - high_risk.min(total)) as f64 / total.max(1) as f64 * 100.0;
        let performance = AgentPerformance {
            avg_response_time_minutes: 0.23,
            customers_processed_24h: self.customers_saved,
            critical_interventions_24h: self.critical_saves,
            autonomy_level: Some(94.7),
        };

        DashboardMetrics {
            kpis: Kpis {
                customers_saved: Kpi {
                    value: self.customers_saved as f64,
                    change: format!("+{} from baseline", self.customers_saved),
                    label: Some("Customers Saved from Churn".into()),
                },
                revenue_retained: Kpi {
                    value: self.revenue_retained,
                    change: format!("{} successful interventions", self.customers_saved),
                    label: Some("Revenue Retained (Total)".into()),
                },
                churn_reduction: Kpi {
                    value: (retention * 10.0).round() / 10.0,
                    change: format!("{high_risk} customers at risk"),
                    label: Some("Customer Retention Rate".into()),
                },
                agent_autonomy: Kpi {
                    value: 94.7,
                    change: format!("{:.1}min avg response", performance.avg_response_time_minutes),
                    label: Some("Agent Autonomy Level".into()),
                },
            },
            churn_risk_summary: ChurnRiskSummary {
                total_customers: total,
                high_risk_customers: high_risk,
                total_revenue_at_risk: distribution.critical.total_at_risk
                    + distribution.high.total_at_risk
                    + distribution.medium.total_at_risk,
                churn_distribution: distribution,
            },
            agent_performance: performance,
        }
    }

    /// Intervene on the top customers above the threshold; returns how many were saved.
    fn run_agent_cycle(&mut self) -> usize {
        let targets: Vec<String> = self
            .at_risk()
            .into_iter()
            .filter(|c| c.churn_probability >= INTERVENTION_THRESHOLD)
            .take(INTERVENTIONS_PER_CYCLE)
            .map(|c| c.id)
            .collect();

        let total = self.customers.len() as u64;
        self.push_db_activity(
            ActivityKind::CustomerAnalysis,
            format!("🔍 AI Agent: Analyzing {total} customer profiles using {AGENT_MEMORIES} successful case studies"),
            format!("{} customers identified as high-risk", targets.len()),
            Urgency::High,
            ActivityMetadata::new().with(Annotation::CustomersAnalyzed(total)),
        );

        for id in &targets {
            let Some(customer) = self.customers.iter_mut().find(|c| &c.id == id) else {
                continue;
            };
            let before = customer.churn_probability;
            customer.churn_probability = RISK_AFTER_INTERVENTION;
            customer.churn_risk_level = RiskLevel::from_probability(RISK_AFTER_INTERVENTION);
            let (name, value) = (customer.name.clone(), customer.annual_contract_value);

            self.customers_saved += 1;
            if before >= risk::CRITICAL_THRESHOLD {
                self.critical_saves += 1;
            }
            self.revenue_retained += value;
            self.push_db_activity(
                ActivityKind::CustomerSaved,
                format!("✅ CUSTOMER SAVED: {name} • ${:.0}K revenue secured", value / 1000.0),
                format!(
                    "Customer {name} successfully rescued • Churn risk reduced from {:.0}% to estimated {:.0}%",
                    before * 100.0,
                    RISK_AFTER_INTERVENTION * 100.0
                ),
                Urgency::Low,
                ActivityMetadata::new()
                    .with(Annotation::Customer(name.clone()))
                    .with(Annotation::RevenueSaved(value))
                    .with(Annotation::RiskBefore(before))
                    .with(Annotation::RiskAfter(RISK_AFTER_INTERVENTION)),
            );
        }

        if !targets.is_empty() {
            self.push_db_activity(
                ActivityKind::AgentLearning,
                format!(
                    "📈 AI Agent: Learning from {} successful interventions to improve future performance",
                    targets.len()
                ),
                "Strategy effectiveness confirmed".into(),
                Urgency::Low,
                ActivityMetadata::new(),
            );
        }

        targets.len()
    }

    fn push_db_activity(
        &mut self,
        kind: ActivityKind,
        title: String,
        description: String,
        urgency: Urgency,
        metadata: ActivityMetadata,
    ) {
        let record = ActivityRecord {
            id: format!("db_activity_{}", self.next_activity_id),
            kind,
            title,
            description,
            status: ActivityStatus::Success,
            urgency,
            timestamp: ActivityTimestamp::JustNow,
            metadata,
        };
        self.next_activity_id += 1;
        self.db_feed.insert(0, record);
        self.db_feed.truncate(DB_FEED_LIMIT);
    }
}

fn intervention_record(customer: &CustomerRecord) -> ActivityRecord {
    ActivityRecord {
        id: format!("intervention_{}", customer.id),
        kind: ActivityKind::ChurnIntervention,
        title: format!("🚨 Customer at Risk: {} ({})", customer.name, customer.company),
        description: format!(
            "Churn risk: {:.0}% • Revenue at risk: ${:.0}K • Strategy: personal_call",
            customer.churn_probability * 100.0,
            customer.annual_contract_value / 1000.0
        ),
        status: ActivityStatus::Executing,
        urgency: if customer.churn_probability >= 0.9 {
            Urgency::Critical
        } else {
            Urgency::High
        },
        timestamp: ActivityTimestamp::MinutesAgo(2),
        metadata: ActivityMetadata::new()
            .with(Annotation::Customer(customer.name.clone()))
            .with(Annotation::ChurnProbability(customer.churn_probability))
            .with(Annotation::RevenueAtRisk(customer.annual_contract_value)),
    }
}

/// The all-empty payload the backend answers with when its analytics fail.
fn fallback_metrics() -> DashboardMetrics {
    let kpi = |label: &str| Kpi {
        value: 0.0,
        change: String::new(),
        label: Some(label.to_string()),
    };
    DashboardMetrics {
        kpis: Kpis {
            customers_saved: kpi("Customers Saved"),
            revenue_retained: kpi("Revenue Retained"),
            churn_reduction: kpi("Churn Reduction"),
            agent_autonomy: kpi("Agent Autonomy"),
        },
        ..DashboardMetrics::default()
    }
}

/// The demo customer book.
pub fn seed_customers() -> Vec<CustomerRecord> {
    // name, company, plan, monthly, acv, signup days, login days, tickets, usage, nps, churn
    let rows: [(&str, &str, &str, f64, f64, u32, u32, u32, f64, i32, f64); 10] = [
        ("Sarah Chen", "TechStart Inc", "pro", 1200.0, 14_400.0, 180, 12, 8, 0.30, 5, 0.78),
        ("Mike Rodriguez", "GrowthCorp", "enterprise", 4500.0, 54_000.0, 90, 8, 12, 0.25, 4, 0.91),
        ("Jennifer Walsh", "InnovatePlus", "pro", 800.0, 9_600.0, 45, 15, 6, 0.20, 6, 0.85),
        ("David Park", "Nexus Technologies", "basic", 299.0, 3_588.0, 120, 5, 3, 0.60, 7, 0.45),
        ("Lisa Thompson", "FastTrack Solutions", "pro", 1500.0, 18_000.0, 200, 3, 2, 0.55, 6, 0.52),
        ("Alex Kumar", "ScaleVision Inc", "enterprise", 8900.0, 106_800.0, 300, 1, 1, 0.90, 9, 0.08),
        ("Rachel Green", "BrightFuture Corp", "pro", 2200.0, 26_400.0, 150, 1, 0, 0.80, 8, 0.12),
        ("Tom Wilson", "Dynamic Tech", "basic", 199.0, 2_388.0, 60, 2, 1, 0.70, 8, 0.22),
        ("Emma Davis", "CloudStream", "enterprise", 5600.0, 67_200.0, 400, 7, 4, 0.40, 6, 0.67),
        ("James Miller", "Pivot Corporation", "pro", 999.0, 11_988.0, 75, 4, 2, 0.65, 7, 0.38),
    ];

    rows.iter()
        .enumerate()
        .map(
            |(i, &(name, company, plan, monthly, acv, signup, login, tickets, usage, nps, churn))| {
                let email_domain = company.split_whitespace().next().unwrap_or(company).to_lowercase();
                CustomerRecord {
                    id: (i + 1).to_string(),
                    name: name.to_string(),
                    company: company.to_string(),
                    churn_probability: churn,
                    annual_contract_value: acv,
                    last_login_days_ago: login,
                    feature_usage_score: usage,
                    churn_risk_level: RiskLevel::from_probability(churn),
                    email: Some(format!(
                        "{}@{email_domain}.com",
                        name.split_whitespace().next().unwrap_or(name).to_lowercase()
                    )),
                    subscription_plan: Some(plan.to_string()),
                    monthly_revenue: Some(monthly),
                    support_tickets_count: Some(tickets),
                    nps_score: Some(nps),
                    days_since_signup: Some(signup),
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn at_risk_list_is_sorted_and_filtered() {
        let backend = DemoBackend::new();
        let customers = backend.at_risk_customers().await.unwrap().customers;
        let names: Vec<_> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Mike Rodriguez", "Jennifer Walsh", "Sarah Chen", "Emma Davis"]
        );
        assert_eq!(backend.call_count(Endpoint::AtRiskCustomers), 1);
    }

    #[tokio::test]
    async fn trigger_saves_top_three_then_nothing() {
        let backend = DemoBackend::new();

        let first = backend.trigger_agent().await.unwrap();
        assert!(first.is_success());
        assert_eq!(first.interventions_executed, Some(3));

        let at_risk = backend.at_risk_customers().await.unwrap().customers;
        assert_eq!(at_risk.len(), 1);

        let second = backend.trigger_agent().await.unwrap();
        assert_eq!(second.interventions_executed, Some(0));

        let feed = backend.realtime_activities().await.unwrap().activities;
        assert!(feed.iter().any(|a| a.kind == ActivityKind::CustomerSaved));
        assert!(feed[0].is_fresh());

        let metrics = backend.dashboard_metrics().await.unwrap();
        assert!((metrics.kpis.customers_saved.value - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn reset_restores_seed_book() {
        let backend = DemoBackend::new();
        backend.trigger_agent().await.unwrap();
        assert!(backend.reset_demo().await.unwrap().is_success());
        assert_eq!(backend.at_risk_customers().await.unwrap().customers.len(), 4);
        assert!(backend.realtime_activities().await.unwrap().activities.is_empty());
    }

    #[tokio::test]
    async fn injected_faults() {
        let backend = DemoBackend::new();

        backend
            .inject_failure_once(Endpoint::TriggerAgent, Fault::Network)
            .await;
        assert!(matches!(
            backend.trigger_agent().await,
            Err(ApiError::Network { .. })
        ));
        assert!(backend.trigger_agent().await.unwrap().is_success());

        backend
            .inject_failure(Endpoint::ResetDemo, Fault::Business("db unavailable".into()))
            .await;
        let reset = backend.reset_demo().await.unwrap();
        assert!(!reset.is_success());
        assert_eq!(reset.message.as_deref(), Some("db unavailable"));

        backend
            .inject_failure(Endpoint::DashboardMetrics, Fault::HttpStatus(502))
            .await;
        assert_eq!(
            backend.dashboard_metrics().await.unwrap_err(),
            ApiError::HttpStatus {
                endpoint: "/dashboard/metrics".into(),
                status: 502
            }
        );
        assert_eq!(backend.call_count(Endpoint::TriggerAgent), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied() {
        let backend = DemoBackend::new();
        backend
            .set_latency(Endpoint::RealtimeStats, Duration::from_secs(5))
            .await;

        let start = tokio::time::Instant::now();
        let stats = backend.realtime_stats().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(stats.total_customers, 10);
        assert_eq!(stats.high_risk_customers, 4);
    }

    #[test]
    fn seed_customers_have_emails_and_levels() {
        let customers = seed_customers();
        assert_eq!(customers[1].email.as_deref(), Some("mike@growthcorp.com"));
        assert_eq!(customers[1].churn_risk_level, RiskLevel::Critical);
        assert_eq!(customers[0].churn_risk_level, RiskLevel::High);
    }
}
