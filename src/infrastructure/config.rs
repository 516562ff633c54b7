//! Configuration infrastructure
//!
//! Configuration is layered with the `config` crate:
//! 1. Built-in defaults (`Default` impls, see [`defaults`])
//! 2. Optional JSON/TOML file (`--config`, or the user config dir)
//! 3. Environment (`CSA_` prefix, `__` between sections, e.g. `CSA_API__TIMEOUT_SECONDS=5`)
//! 4. `CSA_API_URL` / `--api-url` for the backend base URL

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domain::constants;

/// Directory name under the platform config/data dirs.
pub const APP_DIR_NAME: &str = "csa-dashboard";

/// Default config file name inside [`APP_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "csa_dashboard.json";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "CSA";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend API access
    pub api: ApiConfig,

    /// Polling, caps and the scripted agent timeline
    pub dashboard: DashboardSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backend API access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8000/api`
    pub base_url: String,

    pub user_agent: String,

    /// Client-side request timeout. `None` keeps the original no-timeout behaviour.
    pub timeout_seconds: Option<u64>,

    /// Optional outbound rate limit.
    pub max_requests_per_second: Option<u32>,

    /// Which endpoint feeds the activity list on refresh.
    pub activity_source: ActivitySource,
}

/// Activity endpoint used by refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    /// `GET /dashboard/activities`
    #[default]
    Dashboard,
    /// `GET /activities/real-time` (DB-backed)
    RealTime,
}

/// Dashboard controller tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub refresh_interval_secs: u64,
    pub counter_interval_secs: u64,
    pub save_counter_baseline: u64,
    pub activity_cap: usize,
    pub demo_activity_cap: usize,
    pub recent_saves_cap: usize,
    pub new_highlight_secs: u64,
    pub timeline: AgentTimeline,

    /// Seed for the cosmetic RNG (counter bumps, save pick). Random when unset.
    pub rng_seed: Option<u64>,
}

/// Offsets of the scripted agent run, in milliseconds from its start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTimeline {
    pub scan_ms: u64,
    pub strategy_ms: u64,
    pub communication_ms: u64,
    pub commit_ms: u64,
    pub learning_ms: u64,
    pub finish_ms: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output (stderr)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; defaults to `<data dir>/csa-dashboard/logs`
    pub log_dir: Option<PathBuf>,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::api::DEFAULT_BASE_URL.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: None,
            max_requests_per_second: None,
            activity_source: ActivitySource::default(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: constants::polling::REFRESH_INTERVAL_SECS,
            counter_interval_secs: constants::polling::COUNTER_INTERVAL_SECS,
            save_counter_baseline: constants::counter::SAVE_COUNTER_BASELINE,
            activity_cap: constants::feed::ACTIVITY_CAP,
            demo_activity_cap: constants::feed::DEMO_ACTIVITY_CAP,
            recent_saves_cap: constants::feed::RECENT_SAVES_CAP,
            new_highlight_secs: constants::feed::NEW_HIGHLIGHT_SECS,
            timeline: AgentTimeline::default(),
            rng_seed: None,
        }
    }
}

impl Default for AgentTimeline {
    fn default() -> Self {
        use constants::agent_timeline as t;
        Self {
            scan_ms: t::SCAN_MS,
            strategy_ms: t::STRATEGY_MS,
            communication_ms: t::COMMUNICATION_MS,
            commit_ms: t::COMMIT_MS,
            learning_ms: t::LEARNING_MS,
            finish_ms: t::FINISH_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters.insert("tokio".to_string(), "info".to_string());
                filters
            },
        }
    }
}

impl DashboardSettings {
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub const fn counter_interval(&self) -> Duration {
        Duration::from_secs(self.counter_interval_secs)
    }

    pub const fn new_highlight_window(&self) -> Duration {
        Duration::from_secs(self.new_highlight_secs)
    }
}

impl AgentTimeline {
    /// Offsets in script order.
    pub const fn offsets(&self) -> [u64; 6] {
        [
            self.scan_ms,
            self.strategy_ms,
            self.communication_ms,
            self.commit_ms,
            self.learning_ms,
            self.finish_ms,
        ]
    }
}

impl AppConfig {
    /// `<config dir>/csa-dashboard/csa_dashboard.json`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from defaults, an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load`], reading overrides from `env` instead of the process
    /// environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
                info!("Loading configuration from: {:?}", path);
            }
            None => {
                if let Some(default_path) = Self::default_config_path() {
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let api_url = match &env {
            Some(vars) => vars.get(constants::api::BASE_URL_ENV).cloned(),
            None => std::env::var(constants::api::BASE_URL_ENV).ok(),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings = builder.build()?;
        let config: Self = settings.try_deserialize()?;
        let config = config.with_api_url(api_url);
        config.validate()?;
        Ok(config)
    }

    /// Override the backend base URL when one is given.
    #[must_use]
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().trim_end_matches('/').to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Validation {
            message: message.to_string(),
        };

        url::Url::parse(&self.api.base_url).map_err(|e| ConfigError::Validation {
            message: format!("api.base_url '{}' is not a valid URL: {e}", self.api.base_url),
        })?;

        if self.api.max_requests_per_second == Some(0) {
            return Err(invalid("api.max_requests_per_second must be greater than 0"));
        }
        if self.api.timeout_seconds == Some(0) {
            return Err(invalid("api.timeout_seconds must be greater than 0"));
        }

        let dashboard = &self.dashboard;
        if dashboard.refresh_interval_secs == 0 || dashboard.counter_interval_secs == 0 {
            return Err(invalid("dashboard intervals must be greater than 0"));
        }
        if dashboard.activity_cap == 0 || dashboard.demo_activity_cap == 0 || dashboard.recent_saves_cap == 0 {
            return Err(invalid("dashboard caps must be greater than 0"));
        }

        let offsets = dashboard.timeline.offsets();
        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(invalid("dashboard.timeline offsets must be in script order"));
        }

        Ok(())
    }
}

/// Default configuration values
pub mod defaults {
    /// Default user agent for backend calls
    pub const USER_AGENT: &str = concat!("csa-dashboard/", env!("CARGO_PKG_VERSION"));

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = false;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = true;

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;

    /// Default auto cleanup logs setting
    pub const LOG_AUTO_CLEANUP: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn defaults_match_dashboard_constants() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_seconds, None);
        assert_eq!(config.dashboard.refresh_interval(), Duration::from_secs(20));
        assert_eq!(config.dashboard.counter_interval(), Duration::from_secs(45));
        assert_eq!(config.dashboard.save_counter_baseline, 847);
        assert_eq!(config.dashboard.timeline.offsets(), [0, 1_500, 2_500, 3_500, 4_500, 6_000]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "api": {{ "timeout_seconds": 5, "activity_source": "real_time" }},
                "dashboard": {{ "refresh_interval_secs": 7, "timeline": {{ "finish_ms": 9000 }} }}
            }}"#
        )
        .unwrap();

        let config = AppConfig::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(config.api.timeout_seconds, Some(5));
        assert_eq!(config.api.activity_source, ActivitySource::RealTime);
        assert_eq!(config.dashboard.refresh_interval_secs, 7);
        assert_eq!(config.dashboard.timeline.finish_ms, 9_000);
        assert_eq!(config.dashboard.timeline.commit_ms, 3_500);
        assert_eq!(config.dashboard.counter_interval_secs, 45);
    }

    #[test]
    fn environment_overrides_file_and_api_url() {
        let env = HashMap::from([
            ("CSA_API__MAX_REQUESTS_PER_SECOND".to_string(), "4".to_string()),
            ("CSA_DASHBOARD__RNG_SEED".to_string(), "42".to_string()),
            ("CSA_API_URL".to_string(), "http://demo.internal:9000/api/".to_string()),
        ]);

        let config = AppConfig::load_with_env(None, Some(env)).unwrap();
        assert_eq!(config.api.max_requests_per_second, Some(4));
        assert_eq!(config.dashboard.rng_seed, Some(42));
        assert_eq!(config.api.base_url, "http://demo.internal:9000/api");
    }

    #[test]
    fn rejects_out_of_order_timeline() {
        let mut config = AppConfig::default();
        config.dashboard.timeline.finish_ms = 1_000;
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn rejects_invalid_base_url() {
        let config = AppConfig::default().with_api_url(Some("not a url".into()));
        assert!(config.validate().is_err());
    }
}
