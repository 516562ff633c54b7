//! Dashboard state controller
//!
//! Owns the dashboard state, keeps it fresh from the backend, layers locally
//! synthesized activities over server data and drives scripted agent runs.
//!
//! Lifecycle: [`DashboardController::mount`] starts the refresh and counter
//! loops under one cancellation token; [`MountedDashboard::unmount`] (or
//! dropping the handle) cancels them together with any agent run in progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::agent_run::{AgentRunReport, AgentRunScript, RunEnd, RunPhase, ScriptStep, TriggerOutcome};
use super::events::DashboardEvent;
use super::narrative;
use super::single_flight::{FlightGuard, SingleFlight};
use super::state::DashboardState;
use crate::domain::ActivityRecord;
use crate::domain::constants::counter::PLACEHOLDER_SAVE_NAME;
use crate::domain::constants::feed::SAVE_CANDIDATE_POOL;
use crate::infrastructure::api_client::{DashboardApi, Endpoint};
use crate::infrastructure::api_error::ApiError;
use crate::infrastructure::config::{ActivitySource, AppConfig, DashboardSettings};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("An agent run is already in progress")]
    AgentBusy,

    #[error("A demo reset is already in progress")]
    ResetBusy,

    #[error("Dashboard is already mounted")]
    AlreadyMounted,

    #[error("Dashboard has been unmounted")]
    Unmounted,

    #[error(transparent)]
    Api(#[from] ApiError),
}

struct ControllerInner {
    api: Arc<dyn DashboardApi>,
    state: RwLock<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
    settings: DashboardSettings,
    activity_source: ActivitySource,
    script: AgentRunScript,
    agent_gate: SingleFlight,
    reset_gate: SingleFlight,
    rng: Mutex<fastrand::Rng>,
    lifecycle: CancellationToken,
    mounted: AtomicBool,
}

/// Cheap to clone; clones share one dashboard.
#[derive(Clone)]
pub struct DashboardController {
    inner: Arc<ControllerInner>,
}

impl DashboardController {
    pub fn new(api: Arc<dyn DashboardApi>, config: &AppConfig) -> Self {
        Self::with_settings(api, config.dashboard.clone(), config.api.activity_source)
    }

    pub fn with_settings(
        api: Arc<dyn DashboardApi>,
        settings: DashboardSettings,
        activity_source: ActivitySource,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let rng = settings
            .rng_seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        Self {
            inner: Arc::new(ControllerInner {
                api,
                state: RwLock::new(DashboardState::from_settings(&settings)),
                events,
                script: AgentRunScript::from_timeline(&settings.timeline),
                settings,
                activity_source,
                agent_gate: SingleFlight::new(),
                reset_gate: SingleFlight::new(),
                rng: Mutex::new(rng),
                lifecycle: CancellationToken::new(),
                mounted: AtomicBool::new(false),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.inner.events.subscribe()
    }

    pub fn api(&self) -> &Arc<dyn DashboardApi> {
        &self.inner.api
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.inner.settings
    }

    pub fn is_unmounted(&self) -> bool {
        self.inner.lifecycle.is_cancelled()
    }

    /// Owned copy of the current state. Busy flags reflect the gates.
    pub async fn snapshot(&self) -> DashboardState {
        let mut state = self.inner.state.read().await.clone();
        state.is_agent_running = self.inner.agent_gate.is_busy();
        state.is_resetting = self.inner.reset_gate.is_busy();
        if !state.is_agent_running {
            state.run_phase = RunPhase::Idle;
        }
        state
    }

    /// Start the background loops: initial fetch, then refresh and counter
    /// bump on their intervals. First ticks come one period after mount.
    pub fn mount(&self) -> Result<MountedDashboard, DashboardError> {
        self.ensure_live()?;
        if self.inner.mounted.swap(true, Ordering::AcqRel) {
            return Err(DashboardError::AlreadyMounted);
        }

        let token = self.inner.lifecycle.clone();
        let refresh_period = self.inner.settings.refresh_interval();
        let counter_period = self.inner.settings.counter_interval();
        let mounted_at = Instant::now();

        let refresh_loop = {
            let controller = self.clone();
            let token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    () = token.cancelled() => return,
                    _ = controller.initialize() => {}
                }

                let mut ticker = interval_at(mounted_at + refresh_period, refresh_period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                    tokio::select! {
                        () = token.cancelled() => break,
                        result = controller.refresh() => {
                            if let Err(e) = result {
                                debug!("Periodic refresh skipped: {}", e);
                            }
                        }
                    }
                }
                debug!("Refresh loop stopped");
            })
        };

        let counter_loop = {
            let controller = self.clone();
            let token = token.clone();
            tokio::spawn(async move {
                let mut ticker = interval_at(mounted_at + counter_period, counter_period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        _ = ticker.tick() => {
                            controller.bump_save_counter().await;
                        }
                    }
                }
                debug!("Counter loop stopped");
            })
        };

        info!(
            refresh_secs = refresh_period.as_secs(),
            counter_secs = counter_period.as_secs(),
            "📺 Dashboard mounted"
        );

        Ok(MountedDashboard {
            controller: self.clone(),
            token,
            tasks: vec![refresh_loop, counter_loop],
        })
    }

    /// First fetch. The loading flag goes off whatever the result.
    pub async fn initialize(&self) -> Result<(), DashboardError> {
        let result = self.refresh().await;
        self.inner.state.write().await.is_loading = false;
        self.emit(DashboardEvent::Loaded { ok: result.is_ok() });
        if let Err(e) = &result {
            warn!("Initial dashboard fetch failed, rendering defaults: {}", e);
        }
        result
    }

    /// Fetch metrics, activities and at-risk customers concurrently. If any
    /// one fails nothing is applied.
    pub async fn refresh(&self) -> Result<(), DashboardError> {
        self.ensure_live()?;

        let api = &self.inner.api;
        let activities = async {
            match self.inner.activity_source {
                ActivitySource::Dashboard => api.dashboard_activities().await,
                ActivitySource::RealTime => api.realtime_activities().await,
            }
        };

        match futures::try_join!(api.dashboard_metrics(), activities, api.at_risk_customers()) {
            Ok((metrics, feed, customers)) => {
                let (activity_count, customer_count) = {
                    let mut state = self.inner.state.write().await;
                    state.apply_refresh(metrics, feed.activities, customers.customers, Utc::now());
                    state.is_loading = false;
                    (state.activities.len(), state.at_risk_customers.len())
                };
                debug!(
                    activities = activity_count,
                    customers = customer_count,
                    "Dashboard refreshed"
                );
                self.emit(DashboardEvent::Refreshed {
                    activities: activity_count,
                    customers: customer_count,
                });
                Ok(())
            }
            Err(error) => {
                warn!("Failed to fetch dashboard data: {}", error);
                self.inner.state.write().await.is_loading = false;
                self.emit(DashboardEvent::RefreshFailed {
                    error: error.clone(),
                });
                Err(error.into())
            }
        }
    }

    /// Show a synthetic record now and keep it across refreshes.
    pub async fn add_temporary_activity(&self, record: ActivityRecord) {
        self.inner
            .state
            .write()
            .await
            .add_temporary_activity(record.clone());
        self.emit(DashboardEvent::ActivityAdded { record });
    }

    /// Cosmetic +0 or +1. Returns the new counter value.
    pub async fn bump_save_counter(&self) -> u64 {
        let by = self.inner.rng.lock().await.u64(0..=1);
        let value = {
            let mut state = self.inner.state.write().await;
            state.bump_counter(by);
            state.save_counter
        };
        if by > 0 {
            self.emit(DashboardEvent::SaveCounterChanged { value });
        }
        value
    }

    /// Start an agent run in the background. Rejected while one is active;
    /// a rejected call changes nothing and makes no backend call.
    pub fn trigger_agent(&self) -> Result<JoinHandle<AgentRunReport>, DashboardError> {
        self.ensure_live()?;
        let guard = self
            .inner
            .agent_gate
            .try_acquire()
            .ok_or(DashboardError::AgentBusy)?;

        let controller = self.clone();
        Ok(tokio::spawn(async move { controller.run_script(guard).await }))
    }

    /// Like [`DashboardController::trigger_agent`], awaiting the whole run.
    pub async fn run_agent(&self) -> Result<AgentRunReport, DashboardError> {
        self.ensure_live()?;
        let guard = self
            .inner
            .agent_gate
            .try_acquire()
            .ok_or(DashboardError::AgentBusy)?;
        Ok(self.run_script(guard).await)
    }

    /// Reset the backend demo data; on success refresh and restore the counters.
    pub async fn reset_demo(&self) -> Result<(), DashboardError> {
        self.ensure_live()?;
        let _guard = self
            .inner
            .reset_gate
            .try_acquire()
            .ok_or(DashboardError::ResetBusy)?;
        self.emit(DashboardEvent::ResetStarted);

        let result = match self.inner.api.reset_demo().await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(ApiError::business(
                Endpoint::ResetDemo.path(),
                &response.status,
                response.message.as_deref(),
            )),
            Err(e) => Err(e),
        };

        if let Err(error) = result {
            warn!("Failed to reset demo: {}", error);
            self.emit(DashboardEvent::ResetFailed {
                error: error.clone(),
            });
            return Err(error.into());
        }

        if let Err(e) = self.refresh().await {
            warn!("Refresh after demo reset failed: {}", e);
        }

        let value = {
            let mut state = self.inner.state.write().await;
            state.reset_counters();
            state.save_counter
        };
        info!(save_counter = value, "🔄 Demo reset");
        self.emit(DashboardEvent::SaveCounterChanged { value });
        self.emit(DashboardEvent::ResetCompleted);
        Ok(())
    }

    async fn run_script(&self, guard: FlightGuard) -> AgentRunReport {
        let _guard = guard;
        let run_id = Uuid::new_v4();
        let cancel = self.inner.lifecycle.child_token();
        let start = Instant::now();

        info!(run_id = %run_id, "🤖 Agent run started");
        self.emit(DashboardEvent::RunStarted { run_id });

        let api = Arc::clone(&self.inner.api);
        let trigger = async move { api.trigger_agent().await };
        tokio::pin!(trigger);

        let mut outcome: Option<TriggerOutcome> = None;
        let mut commit_pending = false;
        let mut steps_executed = Vec::new();
        let mut saved_customers = Vec::new();
        let mut steps = self.inner.script.steps().iter().copied().peekable();

        let end = loop {
            let Some(next) = steps.peek().copied() else {
                break RunEnd::Completed;
            };

            tokio::select! {
                biased;

                () = cancel.cancelled() => break RunEnd::Cancelled,

                // Due steps run before a settled trigger is looked at
                () = sleep_until(start + next.offset) => {
                    steps.next();
                    steps_executed.push(next.step);
                    self.enter_step(run_id, next.step).await;

                    match next.step {
                        ScriptStep::Scan => {
                            self.add_temporary_activity(narrative::customer_analysis()).await;
                        }
                        ScriptStep::StrategyRecall => {
                            self.add_temporary_activity(narrative::strategy_recall()).await;
                        }
                        ScriptStep::CommunicationInsight => {
                            self.add_temporary_activity(narrative::communication_insight()).await;
                        }
                        ScriptStep::Commit => match &outcome {
                            Some(known) => self.commit(known, &mut saved_customers).await,
                            None => commit_pending = true,
                        },
                        ScriptStep::Learning => {
                            self.add_temporary_activity(narrative::agent_learning()).await;
                        }
                        ScriptStep::Finish => {
                            if outcome.is_none() {
                                debug!(run_id = %run_id, "Trigger call still in flight at finish, dropping it");
                            }
                            tokio::select! {
                                () = cancel.cancelled() => break RunEnd::Cancelled,
                                result = self.refresh() => {
                                    if let Err(e) = result {
                                        debug!(run_id = %run_id, "Final refresh failed: {}", e);
                                    }
                                }
                            }
                            break RunEnd::Completed;
                        }
                    }
                }

                result = &mut trigger, if outcome.is_none() => {
                    let arrived = TriggerOutcome::from_result(result);
                    debug!(run_id = %run_id, ?arrived, "Trigger call settled");
                    if let TriggerOutcome::TransportFailed(error) = &arrived {
                        warn!(run_id = %run_id, "Failed to trigger agent: {}", error);
                        let error = error.clone();
                        outcome = Some(arrived);
                        break RunEnd::Aborted(error);
                    }
                    if commit_pending {
                        commit_pending = false;
                        self.commit(&arrived, &mut saved_customers).await;
                    }
                    outcome = Some(arrived);
                }
            }
        };

        self.inner.state.write().await.run_phase = RunPhase::Idle;
        info!(
            run_id = %run_id,
            ?end,
            steps = steps_executed.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "🤖 Agent run finished"
        );
        self.emit(DashboardEvent::RunFinished {
            run_id,
            end: end.clone(),
        });

        AgentRunReport {
            run_id,
            outcome,
            end,
            steps_executed,
            saved_customers,
        }
    }

    async fn enter_step(&self, run_id: Uuid, step: ScriptStep) {
        let phase = step.phase();
        let changed = {
            let mut state = self.inner.state.write().await;
            let changed = state.run_phase != phase;
            state.run_phase = phase;
            changed
        };
        if changed {
            self.emit(DashboardEvent::RunPhaseChanged { run_id, phase });
        }
        self.emit(DashboardEvent::RunStep { run_id, step });
    }

    /// Fold the backend outcome into the dashboard.
    async fn commit(&self, outcome: &TriggerOutcome, saved_customers: &mut Vec<String>) {
        match outcome {
            TriggerOutcome::Saved(count) => {
                let candidate = {
                    let state = self.inner.state.read().await;
                    let pool = state.at_risk_customers.len().min(SAVE_CANDIDATE_POOL);
                    if pool == 0 {
                        None
                    } else {
                        let pick = self.inner.rng.lock().await.usize(0..pool);
                        state.at_risk_customers.get(pick).cloned()
                    }
                };

                if let Some(customer) = &candidate {
                    self.add_temporary_activity(narrative::customer_saved(customer))
                        .await;
                } else {
                    debug!("No at-risk customers to feature, skipping save activity");
                }

                let name = candidate.map_or_else(|| PLACEHOLDER_SAVE_NAME.to_string(), |c| c.name);
                let value = {
                    let mut state = self.inner.state.write().await;
                    state.record_saves(*count);
                    state.push_recent_save(name.clone());
                    state.save_counter
                };

                info!(interventions = count, customer = %name, save_counter = value, "✅ Customer saved");
                saved_customers.push(name.clone());
                self.emit(DashboardEvent::SaveCounterChanged { value });
                self.emit(DashboardEvent::CustomerSaved { name });
            }
            TriggerOutcome::NoInterventions => {
                info!("Agent cycle completed without interventions");
            }
            TriggerOutcome::Rejected(error) => {
                warn!("Agent cycle reported failure: {}", error);
                self.add_temporary_activity(narrative::self_correction())
                    .await;
            }
            TriggerOutcome::TransportFailed(_) => {}
        }
    }

    fn emit(&self, event: DashboardEvent) {
        trace!(event = event.name(), "Dashboard event");
        // No receivers is fine
        let _ = self.inner.events.send(event);
    }

    fn ensure_live(&self) -> Result<(), DashboardError> {
        if self.is_unmounted() {
            Err(DashboardError::Unmounted)
        } else {
            Ok(())
        }
    }
}

/// Background loops of a mounted dashboard. Dropping the handle cancels them.
pub struct MountedDashboard {
    controller: DashboardController,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl MountedDashboard {
    pub const fn controller(&self) -> &DashboardController {
        &self.controller
    }

    /// Cancel both loops and any agent run, and wait for the loops to stop.
    pub async fn unmount(mut self) {
        self.token.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("Dashboard task ended abnormally: {}", e);
            }
        }
        info!("📴 Dashboard unmounted");
        self.controller.emit(DashboardEvent::Unmounted);
    }

    /// Refresh and counter-bump periods.
    pub fn intervals(&self) -> (Duration, Duration) {
        let settings = self.controller.settings();
        (settings.refresh_interval(), settings.counter_interval())
    }
}

impl Drop for MountedDashboard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
