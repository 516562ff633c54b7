//! 프론트엔드 공유 타입

pub mod dashboard_types;

pub use dashboard_types::{
    ActivityView, CustomerCard, DashboardView, HeaderView, IconGlyph, KpiCard, MetaTag,
    PerformanceView, RiskSegmentView, TagKind, Tone, WeightClass,
};
