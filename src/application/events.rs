//! Events broadcast by the dashboard controller

use uuid::Uuid;

use super::agent_run::{RunEnd, RunPhase, ScriptStep};
use crate::domain::ActivityRecord;
use crate::infrastructure::api_error::ApiError;

/// A state change front ends may re-render on.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Initial fetch settled; the loading flag is now off.
    Loaded { ok: bool },
    Refreshed { activities: usize, customers: usize },
    /// A refresh was abandoned; nothing was applied.
    RefreshFailed { error: ApiError },
    ActivityAdded { record: ActivityRecord },
    SaveCounterChanged { value: u64 },
    CustomerSaved { name: String },
    RunStarted { run_id: Uuid },
    RunPhaseChanged { run_id: Uuid, phase: RunPhase },
    RunStep { run_id: Uuid, step: ScriptStep },
    RunFinished { run_id: Uuid, end: RunEnd },
    ResetStarted,
    ResetCompleted,
    ResetFailed { error: ApiError },
    Unmounted,
}

impl DashboardEvent {
    /// Short tag for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "loaded",
            Self::Refreshed { .. } => "refreshed",
            Self::RefreshFailed { .. } => "refresh_failed",
            Self::ActivityAdded { .. } => "activity_added",
            Self::SaveCounterChanged { .. } => "save_counter_changed",
            Self::CustomerSaved { .. } => "customer_saved",
            Self::RunStarted { .. } => "run_started",
            Self::RunPhaseChanged { .. } => "run_phase_changed",
            Self::RunStep { .. } => "run_step",
            Self::RunFinished { .. } => "run_finished",
            Self::ResetStarted => "reset_started",
            Self::ResetCompleted => "reset_completed",
            Self::ResetFailed { .. } => "reset_failed",
            Self::Unmounted => "unmounted",
        }
    }
}
