//! Scripted agent run
//!
//! A run is a fixed list of steps at offsets from its start. One scheduler
//! task walks the list; the backend trigger call runs alongside it and its
//! outcome is folded in at the commit step.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::domain::TriggerResponse;
use crate::infrastructure::api_client::Endpoint;
use crate::infrastructure::api_error::{ApiError, ApiResult};
use crate::infrastructure::config::AgentTimeline;

/// Phase of the current run, `Idle` between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RunPhase {
    #[default]
    Idle,
    Scanning,
    Analyzing,
    Committing,
    Done,
}

/// One step of the run script, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    /// Customer analysis activity.
    Scan,
    /// Strategy recall activity.
    StrategyRecall,
    /// Communication insight activity.
    CommunicationInsight,
    /// Apply the backend outcome; waits for it if still in flight.
    Commit,
    /// Learning activity.
    Learning,
    /// Final refresh, then the busy flag clears.
    Finish,
}

impl ScriptStep {
    pub const fn phase(self) -> RunPhase {
        match self {
            Self::Scan => RunPhase::Scanning,
            Self::StrategyRecall | Self::CommunicationInsight => RunPhase::Analyzing,
            Self::Commit | Self::Learning => RunPhase::Committing,
            Self::Finish => RunPhase::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStep {
    pub offset: Duration,
    pub step: ScriptStep,
}

/// Ordered steps with their offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRunScript {
    steps: Vec<ScheduledStep>,
}

impl AgentRunScript {
    pub fn from_timeline(timeline: &AgentTimeline) -> Self {
        let ms = Duration::from_millis;
        Self {
            steps: vec![
                ScheduledStep {
                    offset: ms(timeline.scan_ms),
                    step: ScriptStep::Scan,
                },
                ScheduledStep {
                    offset: ms(timeline.strategy_ms),
                    step: ScriptStep::StrategyRecall,
                },
                ScheduledStep {
                    offset: ms(timeline.communication_ms),
                    step: ScriptStep::CommunicationInsight,
                },
                ScheduledStep {
                    offset: ms(timeline.commit_ms),
                    step: ScriptStep::Commit,
                },
                ScheduledStep {
                    offset: ms(timeline.learning_ms),
                    step: ScriptStep::Learning,
                },
                ScheduledStep {
                    offset: ms(timeline.finish_ms),
                    step: ScriptStep::Finish,
                },
            ],
        }
    }

    pub fn steps(&self) -> &[ScheduledStep] {
        &self.steps
    }

    /// Offset of the last step.
    pub fn total(&self) -> Duration {
        self.steps.last().map_or(Duration::ZERO, |s| s.offset)
    }
}

impl Default for AgentRunScript {
    fn default() -> Self {
        Self::from_timeline(&AgentTimeline::default())
    }
}

/// What the backend trigger call decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Success with at least one intervention.
    Saved(u64),
    /// Success with zero interventions.
    NoInterventions,
    /// The backend answered with a non-success status.
    Rejected(ApiError),
    /// The call did not complete.
    TransportFailed(ApiError),
}

impl TriggerOutcome {
    pub fn from_result(result: ApiResult<TriggerResponse>) -> Self {
        match result {
            Ok(response) if response.is_success() => match response.interventions_executed {
                Some(n) if n > 0 => Self::Saved(n),
                _ => Self::NoInterventions,
            },
            Ok(response) => Self::Rejected(ApiError::business(
                Endpoint::TriggerAgent.path(),
                &response.status,
                response.message.as_deref(),
            )),
            Err(e) => Self::TransportFailed(e),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    /// The finish step ran.
    Completed,
    /// Transport failure of the trigger call; remaining steps were cancelled.
    Aborted(ApiError),
    /// The dashboard was torn down mid-run.
    Cancelled,
}

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRunReport {
    pub run_id: Uuid,
    /// `None` when the trigger call was still in flight at the end.
    pub outcome: Option<TriggerOutcome>,
    pub end: RunEnd,
    pub steps_executed: Vec<ScriptStep>,
    /// Names pushed to the recent-saves list by this run.
    pub saved_customers: Vec<String>,
}

impl AgentRunReport {
    pub const fn completed(&self) -> bool {
        matches!(self.end, RunEnd::Completed)
    }
}
