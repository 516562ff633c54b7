//! Application layer - dashboard controller and agent run orchestration

pub mod agent_run;
pub mod dashboard_controller;
pub mod events;
pub mod narrative;
pub mod single_flight;
pub mod state;

pub use agent_run::{
    AgentRunReport, AgentRunScript, RunEnd, RunPhase, ScheduledStep, ScriptStep, TriggerOutcome,
};
pub use dashboard_controller::{DashboardController, DashboardError, MountedDashboard};
pub use events::DashboardEvent;
pub use single_flight::{FlightGuard, SingleFlight};
pub use state::{DashboardState, FeedLimits, merge_feed};
