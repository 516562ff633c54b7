//! Controller state and its pure transitions
//!
//! Everything here is synchronous; the controller wraps a [`DashboardState`]
//! in a lock and calls these methods inside short critical sections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::agent_run::RunPhase;
use crate::domain::{ActivityRecord, CustomerRecord, DashboardMetrics};
use crate::infrastructure::config::DashboardSettings;

/// List caps applied on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedLimits {
    pub activity_cap: usize,
    pub demo_activity_cap: usize,
    pub recent_saves_cap: usize,
}

impl From<&DashboardSettings> for FeedLimits {
    fn from(settings: &DashboardSettings) -> Self {
        Self {
            activity_cap: settings.activity_cap,
            demo_activity_cap: settings.demo_activity_cap,
            recent_saves_cap: settings.recent_saves_cap,
        }
    }
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self::from(&DashboardSettings::default())
    }
}

/// All client-side dashboard state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    /// Unset until the first successful refresh.
    pub metrics: Option<DashboardMetrics>,
    /// Displayed feed, most recent first.
    pub activities: Vec<ActivityRecord>,
    /// Locally synthesized records, re-merged ahead of server records on every refresh.
    pub demo_activities: Vec<ActivityRecord>,
    pub at_risk_customers: Vec<CustomerRecord>,
    pub save_counter: u64,
    /// Most recent first.
    pub recent_saves: Vec<String>,
    pub is_loading: bool,
    pub is_agent_running: bool,
    pub is_resetting: bool,
    pub run_phase: RunPhase,
    pub last_refreshed: Option<DateTime<Utc>>,
    #[serde(skip)]
    limits: FeedLimits,
    #[serde(skip)]
    baseline: u64,
}

impl DashboardState {
    pub fn new(limits: FeedLimits, baseline: u64) -> Self {
        Self {
            metrics: None,
            activities: Vec::new(),
            demo_activities: Vec::new(),
            at_risk_customers: Vec::new(),
            save_counter: baseline,
            recent_saves: Vec::new(),
            is_loading: true,
            is_agent_running: false,
            is_resetting: false,
            run_phase: RunPhase::Idle,
            last_refreshed: None,
            limits,
            baseline,
        }
    }

    pub fn from_settings(settings: &DashboardSettings) -> Self {
        Self::new(FeedLimits::from(settings), settings.save_counter_baseline)
    }

    /// Prepend to both the demo list and the displayed feed, then truncate each.
    pub fn add_temporary_activity(&mut self, record: ActivityRecord) {
        self.demo_activities.insert(0, record.clone());
        self.demo_activities.truncate(self.limits.demo_activity_cap);

        self.activities.insert(0, record);
        self.activities.truncate(self.limits.activity_cap);
    }

    /// Apply a complete three-resource fetch.
    pub fn apply_refresh(
        &mut self,
        metrics: DashboardMetrics,
        server_activities: Vec<ActivityRecord>,
        customers: Vec<CustomerRecord>,
        at: DateTime<Utc>,
    ) {
        self.activities = merge_feed(
            &self.demo_activities,
            server_activities,
            self.limits.activity_cap,
        );
        self.metrics = Some(metrics);
        self.at_risk_customers = customers;
        self.last_refreshed = Some(at);
    }

    /// Add `count` confirmed saves.
    pub const fn record_saves(&mut self, count: u64) {
        self.save_counter = self.save_counter.saturating_add(count);
    }

    /// Cosmetic bump; never decreases the counter.
    pub const fn bump_counter(&mut self, by: u64) {
        self.save_counter = self.save_counter.saturating_add(by);
    }

    pub fn push_recent_save(&mut self, name: impl Into<String>) {
        self.recent_saves.insert(0, name.into());
        self.recent_saves.truncate(self.limits.recent_saves_cap);
    }

    /// Counter back to the baseline and no recent saves.
    pub fn reset_counters(&mut self) {
        self.save_counter = self.baseline;
        self.recent_saves.clear();
    }

    pub fn is_being_rescued(&self, customer_name: &str) -> bool {
        self.recent_saves.iter().any(|n| n == customer_name)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::from_settings(&DashboardSettings::default())
    }
}

/// `take(demo ++ server, cap)`: positional, demo records first.
pub fn merge_feed(
    demo: &[ActivityRecord],
    server: Vec<ActivityRecord>,
    cap: usize,
) -> Vec<ActivityRecord> {
    let mut merged = Vec::with_capacity(cap.min(demo.len() + server.len()));
    merged.extend(demo.iter().take(cap).cloned());
    let room = cap.saturating_sub(merged.len());
    merged.extend(server.into_iter().take(room));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn activity(id: &str) -> ActivityRecord {
        ActivityRecord {
            id: id.to_string(),
            ..ActivityRecord::default()
        }
    }

    fn ids(records: &[ActivityRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn temporary_activity_is_dual_written() {
        let mut state = DashboardState::default();
        state.activities = vec![activity("server-1")];

        state.add_temporary_activity(activity("demo-1"));
        assert_eq!(ids(&state.demo_activities), vec!["demo-1"]);
        assert_eq!(ids(&state.activities), vec!["demo-1", "server-1"]);
    }

    #[test]
    fn refresh_puts_demo_records_first() {
        let mut state = DashboardState::default();
        state.add_temporary_activity(activity("demo-old"));
        state.add_temporary_activity(activity("demo-new"));

        state.apply_refresh(
            DashboardMetrics::default(),
            vec![activity("server-1"), activity("server-2")],
            Vec::new(),
            Utc::now(),
        );

        assert_eq!(
            ids(&state.activities),
            vec!["demo-new", "demo-old", "server-1", "server-2"]
        );
        assert!(state.metrics.is_some());
        assert!(state.last_refreshed.is_some());
    }

    #[test]
    fn reset_returns_to_baseline() {
        let mut state = DashboardState::default();
        state.save_counter = 900;
        state.recent_saves = vec!["A".into(), "B".into()];

        state.reset_counters();
        assert_eq!(state.save_counter, 847);
        assert!(state.recent_saves.is_empty());
    }

    #[test]
    fn recent_saves_keep_five_newest() {
        let mut state = DashboardState::default();
        for name in ["a", "b", "c", "d", "e", "f"] {
            state.push_recent_save(name);
        }
        assert_eq!(state.recent_saves, vec!["f", "e", "d", "c", "b"]);
        assert!(state.is_being_rescued("c"));
        assert!(!state.is_being_rescued("a"));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Refresh(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Add),
            1 => (0usize..40).prop_map(Op::Refresh),
        ]
    }

    proptest! {
        #[test]
        fn caps_hold_after_every_operation(ops in prop::collection::vec(op(), 0..80)) {
            let mut state = DashboardState::default();
            for (i, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Add => state.add_temporary_activity(activity(&format!("demo-{i}"))),
                    Op::Refresh(n) => {
                        let server = (0..n).map(|j| activity(&format!("server-{i}-{j}"))).collect();
                        state.apply_refresh(DashboardMetrics::default(), server, Vec::new(), Utc::now());
                    }
                }
                prop_assert!(state.demo_activities.len() <= 15);
                prop_assert!(state.activities.len() <= 25);
            }
        }

        #[test]
        fn merge_is_take_of_concatenation(demo_len in 0usize..20, server_len in 0usize..40, cap in 0usize..30) {
            let demo: Vec<_> = (0..demo_len).map(|i| activity(&format!("d{i}"))).collect();
            let server: Vec<_> = (0..server_len).map(|i| activity(&format!("s{i}"))).collect();

            let expected: Vec<_> = demo.iter().chain(server.iter()).take(cap).cloned().collect();
            prop_assert_eq!(merge_feed(&demo, server, cap), expected);
        }

        #[test]
        fn counter_never_decreases_without_reset(bumps in prop::collection::vec(0u64..2, 0..50), saves in prop::collection::vec(0u64..5, 0..10)) {
            let mut state = DashboardState::default();
            let mut last = state.save_counter;
            for by in bumps {
                state.bump_counter(by);
                prop_assert!(state.save_counter >= last);
                last = state.save_counter;
            }
            for n in saves {
                state.record_saves(n);
                prop_assert!(state.save_counter >= last);
                last = state.save_counter;
            }
        }
    }
}
