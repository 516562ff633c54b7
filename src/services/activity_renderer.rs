//! Activity renderer
//!
//! Pure mapping from an [`ActivityRecord`] to an [`ActivityView`]. The only
//! stateful piece is the "new" highlight, tracked per record id by
//! [`HighlightTracker`].

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::domain::constants::feed::NEW_HIGHLIGHT_SECS;
use crate::domain::{ActivityKind, ActivityRecord, ActivityStatus, Annotation, Urgency};
use crate::infrastructure::DashboardSettings;
use crate::types::{ActivityView, IconGlyph, MetaTag, TagKind, Tone, WeightClass};

use super::dashboard_view::thousands;

/// Icon and tone for an activity type. `churn_intervention` takes its tone
/// from the record status.
pub fn icon_for(kind: &ActivityKind, status: &ActivityStatus) -> (IconGlyph, Tone) {
    match kind {
        ActivityKind::CustomerAnalysis => (IconGlyph::Bot, Tone::Analyzing),
        ActivityKind::StrategySelection => (IconGlyph::Bot, Tone::Success),
        ActivityKind::CommunicationInsight => (IconGlyph::Bot, Tone::Warning),
        ActivityKind::AgentLearning => (IconGlyph::Bot, Tone::Info),
        ActivityKind::CustomerSaved => (IconGlyph::CheckCircle, Tone::Success),
        ActivityKind::SelfCorrection => (IconGlyph::Zap, Tone::Warning),
        ActivityKind::ChurnIntervention => (IconGlyph::AlertTriangle, tone_for_status(status)),
        ActivityKind::TidbVectorSearch
        | ActivityKind::AgentMemoryRecall
        | ActivityKind::CommunicationAnalysis
        | ActivityKind::GraphRagAnalysis
        | ActivityKind::HtapProcessing
        | ActivityKind::AgentTriggered
        | ActivityKind::Other(_) => (IconGlyph::Bot, Tone::Info),
    }
}

/// Unknown statuses render as `Info`.
pub const fn tone_for_status(status: &ActivityStatus) -> Tone {
    match status {
        ActivityStatus::Executing => Tone::Executing,
        ActivityStatus::Success => Tone::Success,
        ActivityStatus::Warning => Tone::Warning,
        ActivityStatus::Corrected => Tone::Corrected,
        ActivityStatus::Failed => Tone::Failed,
        ActivityStatus::Monitoring => Tone::Monitoring,
        ActivityStatus::Info | ActivityStatus::Other(_) => Tone::Info,
    }
}

pub const fn weight_for(urgency: Urgency) -> WeightClass {
    match urgency {
        Urgency::Critical => WeightClass::Critical,
        Urgency::High => WeightClass::High,
        Urgency::Medium => WeightClass::Medium,
        Urgency::Low => WeightClass::Low,
    }
}

/// Inline tag for one annotation, if it is a surfaced key with a non-zero value.
pub fn tag_for(annotation: &Annotation) -> Option<MetaTag> {
    let (kind, label) = match *annotation {
        Annotation::CustomersAnalyzed(n) if n > 0 => {
            (TagKind::Analytics, format!("{n} profiles analyzed"))
        }
        Annotation::SimilarCases(n) if n > 0 => {
            (TagKind::Intelligence, format!("{n} similar cases found"))
        }
        Annotation::MessagesAnalyzed(n) if n > 0 => {
            (TagKind::Communication, format!("{n} messages analyzed"))
        }
        Annotation::RevenueSaved(v) if v != 0.0 => {
            (TagKind::Revenue, format!("{} secured", thousands(v)))
        }
        Annotation::EmbeddingsProcessing(n) if n > 0 => {
            (TagKind::Embeddings, format!("{n} embeddings processed"))
        }
        Annotation::MemoriesFound(n) if n > 0 => {
            (TagKind::Memory, format!("{n} memories found"))
        }
        Annotation::ChurnProbability(p) if p != 0.0 => {
            (TagKind::Risk, format!("{:.0}% churn risk", p * 100.0))
        }
        Annotation::RevenueAtRisk(v) if v != 0.0 => {
            (TagKind::RevenueRisk, format!("{} at risk", thousands(v)))
        }
        _ => return None,
    };
    Some(MetaTag { kind, label })
}

/// Tags in a fixed order regardless of metadata order.
pub fn tags_for(record: &ActivityRecord) -> Vec<MetaTag> {
    let mut tags: Vec<MetaTag> = record.metadata.iter().filter_map(tag_for).collect();
    tags.sort_by_key(|t| t.kind as u8);
    tags
}

/// Render without highlight state.
pub fn render(record: &ActivityRecord, is_new: bool) -> ActivityView {
    let (icon, tone) = icon_for(&record.kind, &record.status);
    ActivityView {
        id: record.id.clone(),
        icon,
        tone,
        weight: weight_for(record.urgency),
        title: record.title.clone(),
        description: record.description.clone(),
        timestamp: record.timestamp.to_string(),
        status: record.status.as_str().to_owned(),
        tags: tags_for(record),
        is_new,
    }
}

/// First-seen times of fresh records, for the transient "new" highlight.
#[derive(Debug, Clone)]
pub struct HighlightTracker {
    window: Duration,
    first_seen: HashMap<String, Instant>,
}

impl HighlightTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            first_seen: HashMap::new(),
        }
    }

    /// Whether the record is highlighted at `now`. Only `Now`/`Just now`
    /// records qualify; the window starts the first time the id is seen.
    pub fn is_new(&mut self, record: &ActivityRecord, now: Instant) -> bool {
        if !record.is_fresh() {
            return false;
        }
        let seen = *self.first_seen.entry(record.id.clone()).or_insert(now);
        now.saturating_duration_since(seen) < self.window
    }

    /// Render a whole feed and forget ids no longer shown.
    pub fn render_feed(&mut self, records: &[ActivityRecord], now: Instant) -> Vec<ActivityView> {
        let views = records
            .iter()
            .map(|record| {
                let is_new = self.is_new(record, now);
                render(record, is_new)
            })
            .collect();

        let shown: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        self.first_seen.retain(|id, _| shown.contains(id.as_str()));
        views
    }

    /// Tracker using the configured highlight window.
    pub fn from_settings(settings: &DashboardSettings) -> Self {
        Self::new(settings.new_highlight_window())
    }

    pub fn tracked(&self) -> usize {
        self.first_seen.len()
    }
}

impl Default for HighlightTracker {
    fn default() -> Self {
        Self::new(Duration::from_secs(NEW_HIGHLIGHT_SECS))
    }
}
