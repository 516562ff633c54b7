//! End-to-end controller flows against the in-process demo backend, on a paused clock
use std::sync::Arc;
use std::time::Duration;

use csa_dashboard_lib::application::{
    DashboardController, DashboardError, DashboardEvent, RunEnd, ScriptStep, TriggerOutcome,
};
use csa_dashboard_lib::domain::ActivityKind;
use csa_dashboard_lib::infrastructure::{
    ActivitySource, DashboardSettings, DemoBackend, Endpoint, Fault,
};
use tokio::time::sleep;

const TOP_THREE: [&str; 3] = ["Mike Rodriguez", "Jennifer Walsh", "Sarah Chen"];

fn setup() -> (Arc<DemoBackend>, DashboardController) {
    let backend = Arc::new(DemoBackend::new());
    let settings = DashboardSettings {
        rng_seed: Some(42),
        ..DashboardSettings::default()
    };
    let controller =
        DashboardController::with_settings(backend.clone(), settings, ActivitySource::Dashboard);
    (backend, controller)
}

fn kinds(records: &[csa_dashboard_lib::domain::ActivityRecord]) -> Vec<ActivityKind> {
    records.iter().map(|r| r.kind.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn full_run_saves_a_top_customer() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();

    let report = controller.run_agent().await.unwrap();

    assert_eq!(report.end, RunEnd::Completed);
    assert_eq!(report.outcome, Some(TriggerOutcome::Saved(3)));
    assert_eq!(
        report.steps_executed,
        vec![
            ScriptStep::Scan,
            ScriptStep::StrategyRecall,
            ScriptStep::CommunicationInsight,
            ScriptStep::Commit,
            ScriptStep::Learning,
            ScriptStep::Finish,
        ]
    );

    let state = controller.snapshot().await;
    assert_eq!(state.save_counter, 850);
    assert_eq!(state.recent_saves.len(), 1);
    assert!(TOP_THREE.contains(&state.recent_saves[0].as_str()));
    assert!(!state.is_agent_running);
    assert_eq!(
        kinds(&state.demo_activities),
        vec![
            ActivityKind::AgentLearning,
            ActivityKind::CustomerSaved,
            ActivityKind::CommunicationInsight,
            ActivityKind::StrategySelection,
            ActivityKind::CustomerAnalysis,
        ]
    );
    // Finish refreshed: demo records first, then the server feed
    assert_eq!(&state.activities[..5], &state.demo_activities[..]);
    assert!(state.activities[5..]
        .iter()
        .all(|r| r.kind == ActivityKind::ChurnIntervention));
    assert_eq!(backend.call_count(Endpoint::DashboardMetrics), 2);
}

#[tokio::test(start_paused = true)]
async fn second_trigger_while_running_is_rejected() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();

    let handle = controller.trigger_agent().unwrap();
    sleep(Duration::from_millis(100)).await;
    let before = controller.snapshot().await;
    assert!(before.is_agent_running);

    assert!(matches!(controller.trigger_agent(), Err(DashboardError::AgentBusy)));
    assert_eq!(
        controller.run_agent().await.unwrap_err(),
        DashboardError::AgentBusy
    );
    assert_eq!(controller.snapshot().await, before);

    handle.await.unwrap();
    assert_eq!(backend.call_count(Endpoint::TriggerAgent), 1);
    assert!(controller.trigger_agent().is_ok());
}

#[tokio::test(start_paused = true)]
async fn transport_failure_cancels_pending_steps() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    backend
        .set_latency(Endpoint::TriggerAgent, Duration::from_millis(2_000))
        .await;
    backend
        .inject_failure(Endpoint::TriggerAgent, Fault::Network)
        .await;

    let report = controller.run_agent().await.unwrap();

    assert!(matches!(report.end, RunEnd::Aborted(ref e) if e.is_transport()));
    assert_eq!(
        report.steps_executed,
        vec![ScriptStep::Scan, ScriptStep::StrategyRecall]
    );

    // Nothing else lands afterwards
    sleep(Duration::from_secs(10)).await;
    let state = controller.snapshot().await;
    assert_eq!(state.demo_activities.len(), 2);
    assert_eq!(state.save_counter, 847);
    assert!(!state.is_agent_running);
    assert_eq!(backend.call_count(Endpoint::DashboardMetrics), 1);
}

#[tokio::test(start_paused = true)]
async fn scan_step_shows_even_when_trigger_fails_at_once() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    backend
        .inject_failure(Endpoint::TriggerAgent, Fault::Network)
        .await;

    let report = controller.run_agent().await.unwrap();

    assert!(matches!(report.end, RunEnd::Aborted(ref e) if e.is_transport()));
    assert_eq!(report.steps_executed, vec![ScriptStep::Scan]);

    let state = controller.snapshot().await;
    assert_eq!(
        kinds(&state.demo_activities),
        vec![ActivityKind::CustomerAnalysis]
    );
    assert_eq!(state.activities[0].kind, ActivityKind::CustomerAnalysis);
    assert_eq!(state.save_counter, 847);
    assert!(!state.is_agent_running);
}

#[tokio::test(start_paused = true)]
async fn http_error_status_aborts_like_network_failure() {
    let (backend, controller) = setup();
    backend
        .inject_failure(Endpoint::TriggerAgent, Fault::HttpStatus(500))
        .await;

    let report = controller.run_agent().await.unwrap();
    assert!(matches!(report.end, RunEnd::Aborted(_)));
    assert!(!controller.snapshot().await.is_agent_running);
}

#[tokio::test(start_paused = true)]
async fn late_outcome_is_applied_on_arrival() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    backend
        .set_latency(Endpoint::TriggerAgent, Duration::from_millis(5_000))
        .await;

    let report = controller.run_agent().await.unwrap();

    assert_eq!(report.end, RunEnd::Completed);
    assert_eq!(report.saved_customers.len(), 1);
    let state = controller.snapshot().await;
    assert_eq!(state.save_counter, 850);
    // Commit waited past the learning step
    assert_eq!(
        kinds(&state.demo_activities)[..2],
        [ActivityKind::CustomerSaved, ActivityKind::AgentLearning]
    );
}

#[tokio::test(start_paused = true)]
async fn trigger_still_in_flight_at_finish_is_dropped() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    backend
        .set_latency(Endpoint::TriggerAgent, Duration::from_secs(30))
        .await;

    let report = controller.run_agent().await.unwrap();

    assert_eq!(report.end, RunEnd::Completed);
    assert_eq!(report.outcome, None);
    assert!(report.saved_customers.is_empty());

    sleep(Duration::from_secs(60)).await;
    let state = controller.snapshot().await;
    assert_eq!(state.save_counter, 847);
    assert!(!state.is_agent_running);
    assert!(!state.demo_activities.iter().any(|r| r.kind == ActivityKind::CustomerSaved));
}

#[tokio::test(start_paused = true)]
async fn business_failure_shows_self_correction() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    backend
        .inject_failure(Endpoint::TriggerAgent, Fault::Business("db unavailable".into()))
        .await;

    let report = controller.run_agent().await.unwrap();

    assert!(matches!(report.outcome, Some(TriggerOutcome::Rejected(_))));
    assert_eq!(report.end, RunEnd::Completed);
    let state = controller.snapshot().await;
    assert_eq!(state.save_counter, 847);
    assert!(state.recent_saves.is_empty());
    assert!(state
        .demo_activities
        .iter()
        .any(|r| r.kind == ActivityKind::SelfCorrection));
}

#[tokio::test(start_paused = true)]
async fn zero_interventions_change_nothing() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    controller.run_agent().await.unwrap();
    assert_eq!(controller.snapshot().await.save_counter, 850);

    // Every customer above the intervention threshold was handled already
    let report = controller.run_agent().await.unwrap();
    assert_eq!(report.outcome, Some(TriggerOutcome::NoInterventions));
    assert_eq!(controller.snapshot().await.save_counter, 850);
    assert_eq!(backend.call_count(Endpoint::TriggerAgent), 2);
}

#[tokio::test(start_paused = true)]
async fn save_without_at_risk_customers_records_placeholder() {
    let (_backend, controller) = setup();
    // No initial fetch: the client has no at-risk customers to pick from
    let report = controller.run_agent().await.unwrap();

    assert_eq!(report.saved_customers, vec!["At-risk customer".to_string()]);
    let state = controller.snapshot().await;
    assert_eq!(state.recent_saves, vec!["At-risk customer".to_string()]);
    assert_eq!(state.save_counter, 850);
    assert!(!state
        .demo_activities
        .iter()
        .any(|r| r.kind == ActivityKind::CustomerSaved));
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_applies_nothing() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    let before = controller.snapshot().await;

    backend
        .inject_failure_once(Endpoint::AtRiskCustomers, Fault::Network)
        .await;
    backend.set_customers(Vec::new()).await;
    tokio_test::assert_err!(controller.refresh().await);

    let after = controller.snapshot().await;
    assert_eq!(after.metrics, before.metrics);
    assert_eq!(after.activities, before.activities);
    assert_eq!(after.at_risk_customers, before.at_risk_customers);
    assert_eq!(after.last_refreshed, before.last_refreshed);

    tokio_test::assert_ok!(controller.refresh().await);
    assert!(controller.snapshot().await.at_risk_customers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn reset_restores_baseline_after_run() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    controller.run_agent().await.unwrap();
    assert_eq!(controller.snapshot().await.save_counter, 850);

    controller.reset_demo().await.unwrap();
    let state = controller.snapshot().await;
    assert_eq!(state.save_counter, 847);
    assert!(state.recent_saves.is_empty());
    assert!(!state.is_resetting);
    assert_eq!(backend.call_count(Endpoint::ResetDemo), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_reset_leaves_state_alone() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    controller.run_agent().await.unwrap();

    backend
        .inject_failure_once(Endpoint::ResetDemo, Fault::Business("locked".into()))
        .await;
    let err = controller.reset_demo().await.unwrap_err();
    assert!(matches!(err, DashboardError::Api(ref e) if !e.is_transport()));

    let state = controller.snapshot().await;
    assert_eq!(state.save_counter, 850);
    assert_eq!(state.recent_saves.len(), 1);
    assert!(!state.is_resetting);
}

#[tokio::test(start_paused = true)]
async fn reset_and_trigger_gates_are_independent() {
    let (backend, controller) = setup();
    controller.initialize().await.unwrap();
    backend
        .set_latency(Endpoint::ResetDemo, Duration::from_millis(500))
        .await;

    let run = controller.trigger_agent().unwrap();
    controller.reset_demo().await.unwrap();
    assert!(controller.snapshot().await.is_agent_running);
    run.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn mounted_loops_tick_and_stop_on_unmount() {
    let (backend, controller) = setup();
    let mounted = controller.mount().unwrap();
    assert!(matches!(controller.mount(), Err(DashboardError::AlreadyMounted)));
    assert_eq!(
        mounted.intervals(),
        (Duration::from_secs(20), Duration::from_secs(45))
    );

    sleep(Duration::from_millis(10)).await;
    assert_eq!(backend.call_count(Endpoint::DashboardMetrics), 1);
    assert!(!controller.snapshot().await.is_loading);

    sleep(Duration::from_secs(20)).await;
    assert_eq!(backend.call_count(Endpoint::DashboardMetrics), 2);

    sleep(Duration::from_secs(26)).await;
    let counter = controller.snapshot().await.save_counter;
    assert!((847..=848).contains(&counter));

    mounted.unmount().await;
    sleep(Duration::from_secs(300)).await;
    assert_eq!(backend.call_count(Endpoint::DashboardMetrics), 3);
    assert_eq!(controller.snapshot().await.save_counter, counter);
    assert!(matches!(controller.refresh().await, Err(DashboardError::Unmounted)));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_mount_handle_cancels_loops() {
    let (backend, controller) = setup();
    drop(controller.mount().unwrap());

    sleep(Duration::from_secs(120)).await;
    assert!(backend.call_count(Endpoint::DashboardMetrics) <= 1);
    assert!(controller.is_unmounted());
}

#[tokio::test(start_paused = true)]
async fn unmount_mid_run_cancels_the_run() {
    let (backend, controller) = setup();
    let mounted = controller.mount().unwrap();
    backend
        .set_latency(Endpoint::TriggerAgent, Duration::from_secs(5))
        .await;

    let run = controller.trigger_agent().unwrap();
    sleep(Duration::from_millis(2_000)).await;
    mounted.unmount().await;

    let report = run.await.unwrap();
    assert_eq!(report.end, RunEnd::Cancelled);
    assert_eq!(
        report.steps_executed,
        vec![ScriptStep::Scan, ScriptStep::StrategyRecall]
    );

    sleep(Duration::from_secs(10)).await;
    let state = controller.snapshot().await;
    assert!(!state.is_agent_running);
    assert_eq!(state.demo_activities.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn run_events_are_broadcast_in_order() {
    let (_backend, controller) = setup();
    controller.initialize().await.unwrap();
    let mut events = controller.subscribe();

    controller.run_agent().await.unwrap();

    let mut steps = Vec::new();
    let mut started = false;
    let mut finished = false;
    while let Ok(event) = events.try_recv() {
        match event {
            DashboardEvent::RunStarted { .. } => started = true,
            DashboardEvent::RunStep { step, .. } => steps.push(step),
            DashboardEvent::RunFinished { end, .. } => {
                finished = true;
                assert_eq!(end, RunEnd::Completed);
            }
            _ => {}
        }
    }
    assert!(started && finished);
    assert_eq!(steps.len(), 6);
    assert_eq!(steps.first(), Some(&ScriptStep::Scan));
    assert_eq!(steps.last(), Some(&ScriptStep::Finish));
}
