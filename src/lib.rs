//! Customer Success Agent dashboard
//!
//! Polls a churn-analytics backend, merges locally synthesized agent
//! activity ahead of server activity, and animates scripted agent runs.

// Module declarations
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod types;

pub use application::{DashboardController, DashboardError, DashboardEvent, DashboardState};
pub use infrastructure::{AppConfig, DashboardApi, DemoBackend, HttpDashboardApi};
