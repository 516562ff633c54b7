//! 대시보드 도메인 상수들
//!
//! 활동 피드 상한, 저장 카운터 기준값, 에이전트 실행 타임라인 등
//! 컨트롤러가 사용하는 고정값들을 정의합니다.

/// 활동 피드 관련 상한값
pub mod feed {
    /// 화면에 표시되는 활동 최대 개수
    pub const ACTIVITY_CAP: usize = 25;

    /// 로컬에서 합성한 데모 활동 최대 개수 (새로고침 사이에도 유지됨)
    pub const DEMO_ACTIVITY_CAP: usize = 15;

    /// "구조 중" 표시에 쓰이는 최근 저장 고객 이름 최대 개수
    pub const RECENT_SAVES_CAP: usize = 5;

    /// 새 활동 강조 표시 유지 시간 (초)
    pub const NEW_HIGHLIGHT_SECS: u64 = 3;

    /// 화면에 표시할 위험 고객 카드 수
    pub const CUSTOMER_CARDS_SHOWN: usize = 8;

    /// 저장 대상 고객을 고를 때 고려하는 상위 위험 고객 수
    pub const SAVE_CANDIDATE_POOL: usize = 3;
}

/// 저장 카운터 관련 상수
pub mod counter {
    /// 저장 카운터 기준값 (리셋 시 이 값으로 돌아감)
    pub const SAVE_COUNTER_BASELINE: u64 = 847;

    /// 실제 고객을 고를 수 없을 때 최근 저장 목록에 들어가는 이름
    pub const PLACEHOLDER_SAVE_NAME: &str = "At-risk customer";
}

/// 폴링 주기
pub mod polling {
    /// 대시보드 데이터 새로고침 주기 (초)
    pub const REFRESH_INTERVAL_SECS: u64 = 20;

    /// 저장 카운터 애니메이션 주기 (초)
    pub const COUNTER_INTERVAL_SECS: u64 = 45;
}

/// 에이전트 실행 스크립트 오프셋 (실행 시작 기준, 밀리초)
pub mod agent_timeline {
    pub const SCAN_MS: u64 = 0;
    pub const STRATEGY_MS: u64 = 1_500;
    pub const COMMUNICATION_MS: u64 = 2_500;
    pub const COMMIT_MS: u64 = 3_500;
    pub const LEARNING_MS: u64 = 4_500;
    pub const FINISH_MS: u64 = 6_000;
}

/// 고객 이탈 위험도 임계값 (백엔드 예측기와 동일)
pub mod risk {
    pub const CRITICAL_THRESHOLD: f64 = 0.8;
    pub const HIGH_THRESHOLD: f64 = 0.6;
    pub const MEDIUM_THRESHOLD: f64 = 0.4;

    /// 저장 후 표시되는 이탈 확률
    pub const RISK_AFTER_SAVE: f64 = 0.23;
}

/// 백엔드 API 기본값
pub mod api {
    /// API 기본 주소
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

    /// API 주소를 덮어쓰는 환경 변수
    pub const BASE_URL_ENV: &str = "CSA_API_URL";

    /// 성공 상태 문자열
    pub const STATUS_SUCCESS: &str = "success";
}
