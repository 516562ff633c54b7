//! Dashboard view
//!
//! Builds the full [`DashboardView`] from a controller snapshot and draws it
//! as plain text for the terminal front end.

use std::fmt::Write as _;
use std::time::Instant;

use crate::application::DashboardState;
use crate::domain::constants::feed::CUSTOMER_CARDS_SHOWN;
use crate::domain::{CustomerRecord, DashboardMetrics, Kpi, RiskSegment};
use crate::types::{
    CustomerCard, DashboardView, HeaderView, KpiCard, PerformanceView, RiskSegmentView,
};

use super::activity_renderer::HighlightTracker;

const MISSING: &str = "--";

/// `$NK`, rounded to whole thousands.
pub fn thousands(value: f64) -> String {
    format!("${:.0}K", value / 1_000.0)
}

/// `$X.XM`
pub fn millions(value: f64) -> String {
    format!("${:.1}M", value / 1_000_000.0)
}

/// Fraction in [0, 1] as a whole percentage.
pub fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

pub fn header(state: &DashboardState) -> HeaderView {
    HeaderView {
        save_counter: state.save_counter,
        save_flash: state.recent_saves.first().map(|name| format!("+1 {name}!")),
        status_text: if state.is_agent_running {
            "Agent Working...".into()
        } else {
            "Agent Monitoring".into()
        },
        trigger_label: if state.is_agent_running {
            "Rescuing Customers...".into()
        } else {
            "Save Customers Now".into()
        },
        trigger_enabled: !state.is_agent_running,
        reset_label: if state.is_resetting {
            "Resetting...".into()
        } else {
            "Reset Demo".into()
        },
        reset_enabled: !state.is_resetting,
    }
}

fn kpi_value(
    metrics: Option<&DashboardMetrics>,
    pick: impl Fn(&DashboardMetrics) -> &Kpi,
    format: impl Fn(f64) -> String,
) -> (String, String) {
    metrics.map(pick).map_or_else(
        || (MISSING.to_owned(), String::new()),
        |kpi| (format(kpi.value), kpi.change.clone()),
    )
}

pub fn kpi_cards(state: &DashboardState) -> Vec<KpiCard> {
    let metrics = state.metrics.as_ref();
    let (revenue, revenue_change) = kpi_value(metrics, |m| &m.kpis.revenue_retained, millions);
    let (churn, churn_change) = kpi_value(metrics, |m| &m.kpis.churn_reduction, |v| format!("{v}%"));
    let (autonomy, autonomy_change) =
        kpi_value(metrics, |m| &m.kpis.agent_autonomy, |v| format!("{v}%"));

    vec![
        KpiCard {
            label: "Customers Saved".into(),
            value: state.save_counter.to_string(),
            change: "+73 this week".into(),
            detail: "From high-risk churn situations".into(),
        },
        KpiCard {
            label: "Revenue Retained".into(),
            value: revenue,
            change: revenue_change,
            detail: "Monthly recurring revenue saved".into(),
        },
        KpiCard {
            label: "Churn Rate Reduction".into(),
            value: churn,
            change: churn_change,
            detail: "Dramatic improvement in retention".into(),
        },
        KpiCard {
            label: "Agent Autonomy".into(),
            value: autonomy,
            change: autonomy_change,
            detail: "Fully autonomous interventions".into(),
        },
    ]
}

pub fn customer_card(customer: &CustomerRecord, rescued: bool) -> CustomerCard {
    CustomerCard {
        id: customer.id.clone(),
        name: customer.name.clone(),
        company: customer.company.clone(),
        risk_color: customer.churn_risk_level.color().to_owned(),
        churn_percent: percent(customer.churn_probability),
        revenue: thousands(customer.annual_contract_value),
        last_login: format!("{}d ago", customer.last_login_days_ago),
        usage: percent(customer.feature_usage_score),
        rescued,
    }
}

fn segment(label: &str, segment: Option<&RiskSegment>) -> RiskSegmentView {
    RiskSegmentView {
        label: label.to_owned(),
        count: segment.map_or(0, |s| s.count),
        at_risk: format!("{} at risk", thousands(segment.map_or(0.0, |s| s.total_at_risk))),
    }
}

pub fn risk_distribution(metrics: Option<&DashboardMetrics>) -> Vec<RiskSegmentView> {
    let distribution = metrics.map(|m| &m.churn_risk_summary.churn_distribution);
    vec![
        segment("Critical Risk", distribution.map(|d| &d.critical)),
        segment("High Risk", distribution.map(|d| &d.high)),
        segment("Medium Risk", distribution.map(|d| &d.medium)),
    ]
}

pub fn performance(metrics: Option<&DashboardMetrics>) -> PerformanceView {
    let perf = metrics.map(|m| &m.agent_performance);
    PerformanceView {
        response_time: format!("{:.0}s", perf.map_or(0.0, |p| p.avg_response_time_minutes)),
        customers_processed_24h: perf.map_or(0, |p| p.customers_processed_24h),
        critical_interventions_24h: perf.map_or(0, |p| p.critical_interventions_24h),
    }
}

/// Full view of a snapshot. The tracker carries highlight state between frames.
pub fn build_view(
    state: &DashboardState,
    tracker: &mut HighlightTracker,
    now: Instant,
) -> DashboardView {
    let metrics = state.metrics.as_ref();
    DashboardView {
        is_loading: state.is_loading,
        header: header(state),
        kpis: kpi_cards(state),
        feed_status: if state.is_agent_running {
            "AI Agent Processing...".into()
        } else {
            "Real-time Monitoring".into()
        },
        activities: tracker.render_feed(&state.activities, now),
        customer_count: format!("{} high-risk", state.at_risk_customers.len()),
        customers: state
            .at_risk_customers
            .iter()
            .take(CUSTOMER_CARDS_SHOWN)
            .map(|c| customer_card(c, state.is_being_rescued(&c.name)))
            .collect(),
        risk_distribution: risk_distribution(metrics),
        performance: performance(metrics),
    }
}

/// Plain-text rendering for the terminal.
pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();
    if view.is_loading {
        out.push_str("🤖 Autonomous Customer Success Agent Starting...\n");
        return out;
    }

    let header = &view.header;
    let _ = writeln!(out, "❤️  Customer Success Agent  |  {}", header.status_text);
    let _ = write!(out, "   Customers Saved: {}", header.save_counter);
    if let Some(flash) = &header.save_flash {
        let _ = write!(out, "  ({flash})");
    }
    out.push('\n');
    out.push('\n');

    for kpi in &view.kpis {
        let _ = writeln!(out, "  {:<22} {:>10}  {}", kpi.label, kpi.value, kpi.change);
    }

    let _ = writeln!(out, "\n🚨 Live Customer Rescue Operations  [{}]", view.feed_status);
    for activity in &view.activities {
        let marker = if activity.is_new { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {} {:<60} {}",
            activity.icon.symbol(),
            activity.title,
            activity.timestamp
        );
        if !activity.description.is_empty() {
            let _ = writeln!(out, "     {}", activity.description);
        }
        if !activity.tags.is_empty() {
            let labels: Vec<&str> = activity.tags.iter().map(|t| t.label.as_str()).collect();
            let _ = writeln!(out, "     [{}]", labels.join("] ["));
        }
    }

    let _ = writeln!(out, "\n⚠️  Customers at Risk  ({})", view.customer_count);
    for card in &view.customers {
        let rescued = if card.rescued { "  RESCUED!" } else { "" };
        let _ = writeln!(
            out,
            "  {:<20} {:<18} {:>4}  {:>6}  login {:<8} usage {:>4}{rescued}",
            card.name, card.company, card.churn_percent, card.revenue, card.last_login, card.usage
        );
    }

    out.push_str("\n📊 Churn Risk Distribution\n");
    for segment in &view.risk_distribution {
        let _ = writeln!(out, "  {:<14} {:>4}  {}", segment.label, segment.count, segment.at_risk);
    }

    let perf = &view.performance;
    out.push_str("\n🤖 Agent Performance\n");
    let _ = writeln!(out, "  Response Time: {}", perf.response_time);
    let _ = writeln!(out, "  Customers Processed (24h): {}", perf.customers_processed_24h);
    let _ = writeln!(out, "  Critical Interventions: {}", perf.critical_interventions_24h);
    out
}
