//! 대시보드 화면을 위한 뷰 모델
//!
//! 컨트롤러 상태를 렌더링 가능한 형태로 변환한 결과물입니다.
//! 프론트엔드와 공유하기 위해 `ts-rs`로 TypeScript 타입을 생성합니다.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 활동 아이콘 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum IconGlyph {
    Bot,
    CheckCircle,
    Zap,
    AlertTriangle,
}

impl IconGlyph {
    /// 터미널 출력용 기호
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Bot => "🤖",
            Self::CheckCircle => "✅",
            Self::Zap => "⚡",
            Self::AlertTriangle => "⚠️",
        }
    }
}

/// 아이콘 색조
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Tone {
    Analyzing,
    Executing,
    Success,
    Warning,
    Info,
    Corrected,
    Failed,
    Monitoring,
}

/// 긴급도에 따른 시각적 무게
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum WeightClass {
    Critical,
    High,
    Medium,
    Low,
}

/// 메타데이터 태그 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TagKind {
    Analytics,
    Intelligence,
    Communication,
    Revenue,
    Embeddings,
    Memory,
    Risk,
    RevenueRisk,
}

/// 활동 항목 아래 표시되는 인라인 태그
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MetaTag {
    pub kind: TagKind,
    pub label: String,
}

/// 렌더링된 활동 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActivityView {
    /// 활동 ID
    pub id: String,
    pub icon: IconGlyph,
    pub tone: Tone,
    pub weight: WeightClass,
    pub title: String,
    pub description: String,
    /// 표시용 시간 문자열 ("Now", "2 min ago" 등)
    pub timestamp: String,
    /// 원본 상태 문자열 (CSS 클래스로 사용)
    pub status: String,
    pub tags: Vec<MetaTag>,
    /// 새 활동 강조 표시 여부 (3초간 유지)
    pub is_new: bool,
}

/// 헤더 영역
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HeaderView {
    pub save_counter: u64,
    /// 가장 최근 저장 알림 ("+1 Sarah Chen!")
    pub save_flash: Option<String>,
    /// "Agent Working..." 또는 "Agent Monitoring"
    pub status_text: String,
    pub trigger_label: String,
    pub trigger_enabled: bool,
    pub reset_label: String,
    pub reset_enabled: bool,
}

/// KPI 카드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KpiCard {
    pub label: String,
    /// 포맷된 값 ("$1.3M", "70%")
    pub value: String,
    pub change: String,
    pub detail: String,
}

/// 위험 고객 카드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerCard {
    pub id: String,
    pub name: String,
    pub company: String,
    /// 위험도 색상 (hex)
    pub risk_color: String,
    /// 이탈 확률 ("91%")
    pub churn_percent: String,
    /// 연간 계약 금액 ("$54K")
    pub revenue: String,
    /// 마지막 로그인 ("21d ago")
    pub last_login: String,
    /// 기능 사용률 ("15%")
    pub usage: String,
    /// 최근 저장 목록에 이름이 있으면 "RESCUED!" 표시
    pub rescued: bool,
}

/// 위험 분포 패널의 한 구간
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RiskSegmentView {
    pub label: String,
    pub count: u64,
    /// "$NK at risk"
    pub at_risk: String,
}

/// 에이전트 성능 패널
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PerformanceView {
    /// 평균 응답 시간 ("2s")
    pub response_time: String,
    pub customers_processed_24h: u64,
    pub critical_interventions_24h: u64,
}

/// 대시보드 전체 화면
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardView {
    /// 첫 로딩 중이면 나머지 필드는 기본값
    pub is_loading: bool,
    pub header: HeaderView,
    pub kpis: Vec<KpiCard>,
    /// "AI Agent Processing..." 또는 "Real-time Monitoring"
    pub feed_status: String,
    pub activities: Vec<ActivityView>,
    /// "N high-risk"
    pub customer_count: String,
    /// 상위 8명만 포함
    pub customers: Vec<CustomerCard>,
    pub risk_distribution: Vec<RiskSegmentView>,
    pub performance: PerformanceView,
}
