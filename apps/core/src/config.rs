//! Process configuration, read once at startup from the environment (and `.env`).

use crate::backends::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::backends::llama::DEFAULT_MAX_TOKENS;
use crate::brain::ClassifierKind;
use crate::error::AppError;
use crate::logging::LogFormat;
use crate::session::HistoryMode;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use validator::Validate;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_EXTERNAL_TIMEOUT_SECS: u64 = 20;

/// Settings for the hosted generative service.
#[derive(Debug, Clone, Validate)]
pub struct GeminiConfig {
    #[validate(length(min = 1))]
    pub api_key: String,
    #[validate(length(min = 1))]
    pub model: String,
    pub base_url: String,
}

/// Settings for the local completion server.
#[derive(Debug, Clone, Validate)]
pub struct FallbackConfig {
    pub url: String,
    pub auth_token: Option<String>,
    #[validate(range(min = 1, max = 4096))]
    pub max_tokens: u32,
}

/// Complete process configuration.
#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub classifier: ClassifierKind,
    pub history_mode: HistoryMode,
    #[validate(range(min = 1, max = 100_000))]
    pub max_sessions: usize,
    #[validate(range(min = 1, max = 300))]
    pub external_timeout_secs: u64,
    pub gemini: Option<GeminiConfig>,
    pub fallback: Option<FallbackConfig>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            classifier: ClassifierKind::default(),
            history_mode: HistoryMode::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            external_timeout_secs: DEFAULT_EXTERNAL_TIMEOUT_SECS,
            gemini: None,
            fallback: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr: SocketAddr = parse_or(get("WELLNESS_BIND_ADDR"), "WELLNESS_BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;
        let classifier: ClassifierKind = parse_or(get("WELLNESS_CLASSIFIER"), "WELLNESS_CLASSIFIER", Some(ClassifierKind::default()))?;
        let history_mode: HistoryMode = parse_or(get("WELLNESS_HISTORY_MODE"), "WELLNESS_HISTORY_MODE", Some(HistoryMode::default()))?;
        let max_sessions: usize = parse_or(get("WELLNESS_MAX_SESSIONS"), "WELLNESS_MAX_SESSIONS", Some(DEFAULT_MAX_SESSIONS))?;
        let external_timeout_secs: u64 = parse_or(
            get("WELLNESS_EXTERNAL_TIMEOUT_SECS"),
            "WELLNESS_EXTERNAL_TIMEOUT_SECS",
            Some(DEFAULT_EXTERNAL_TIMEOUT_SECS),
        )?;
        let log_format: LogFormat = parse_or(get("WELLNESS_LOG_FORMAT"), "WELLNESS_LOG_FORMAT", Some(LogFormat::default()))?;

        let gemini = match get("GOOGLE_API_KEY") {
            Some(api_key) => {
                let base_url = get("WELLNESS_GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
                check_url("WELLNESS_GEMINI_BASE_URL", &base_url)?;
                let gemini = GeminiConfig {
                    api_key,
                    model: get("WELLNESS_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                    base_url,
                };
                gemini
                    .validate()
                    .map_err(|e| AppError::Config(format!("Invalid Gemini settings: {}", e)))?;
                Some(gemini)
            }
            None => None,
        };

        let fallback = match get("WELLNESS_FALLBACK_URL") {
            Some(url) => {
                check_url("WELLNESS_FALLBACK_URL", &url)?;
                let fallback = FallbackConfig {
                    url,
                    auth_token: get("WELLNESS_FALLBACK_TOKEN"),
                    max_tokens: parse_or(
                        get("WELLNESS_FALLBACK_MAX_TOKENS"),
                        "WELLNESS_FALLBACK_MAX_TOKENS",
                        Some(DEFAULT_MAX_TOKENS),
                    )?,
                };
                fallback
                    .validate()
                    .map_err(|e| AppError::Config(format!("Invalid fallback settings: {}", e)))?;
                Some(fallback)
            }
            None => None,
        };

        let config = Self {
            bind_addr,
            classifier,
            history_mode,
            max_sessions,
            external_timeout_secs,
            gemini,
            fallback,
            log_format,
        };
        config
            .validate()
            .map_err(|e| AppError::Config(format!("Invalid configuration: {}", e)))?;
        Ok(config)
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs)
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: Option<T>) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{}='{}': {}", key, value, e))),
        None => default.ok_or_else(|| AppError::Config(format!("{} has no default", key))),
    }
}

fn check_url(key: &str, value: &str) -> Result<(), AppError> {
    let url = Url::parse(value).map_err(|e| AppError::Config(format!("{}='{}': {}", key, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::Config(format!(
            "{}='{}': unsupported scheme '{}'",
            key, value, other
        ))),
    }
}
