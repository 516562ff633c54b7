//! Presentation services - activity rendering and dashboard view building

pub mod activity_renderer;
pub mod dashboard_view;

pub use activity_renderer::{HighlightTracker, icon_for, render, tags_for, weight_for};
pub use dashboard_view::{build_view, render_text};
