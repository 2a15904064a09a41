//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chat_engine::TurnSettings;
use chat_provider::{InvocationMode, ReasoningEffort};

use crate::error::AppError;

pub const PROVIDER_ENV_VAR: &str = "REASONING_CHAT_PROVIDER";
pub const API_KEY_PATH_ENV_VAR: &str = "REASONING_CHAT_API_KEY_PATH";
pub const BASE_URL_ENV_VAR: &str = "REASONING_CHAT_BASE_URL";
pub const STREAM_ENV_VAR: &str = "REASONING_CHAT_STREAM";
pub const REASONING_EFFORT_ENV_VAR: &str = "REASONING_CHAT_REASONING_EFFORT";
pub const REASONING_SUMMARY_ENV_VAR: &str = "REASONING_CHAT_REASONING_SUMMARY";
pub const TIMEOUT_ENV_VAR: &str = "REASONING_CHAT_TIMEOUT_SEC";
pub const REFERER_ENV_VAR: &str = "REASONING_CHAT_REFERER";
pub const APP_TITLE_ENV_VAR: &str = "REASONING_CHAT_APP_TITLE";

pub const DEFAULT_API_KEY_PATH: &str = "api_key.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub provider_id: Option<String>,
    pub api_key_path: PathBuf,
    pub base_url: Option<String>,
    pub stream: bool,
    pub reasoning_effort: ReasoningEffort,
    pub reasoning_summary: bool,
    pub timeout: Option<Duration>,
    pub referer: Option<String>,
    pub app_title: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let reasoning_effort = match env_string_opt(REASONING_EFFORT_ENV_VAR) {
            Some(value) => ReasoningEffort::parse(&value).ok_or_else(|| {
                AppError::Config(format!(
                    "{REASONING_EFFORT_ENV_VAR} must be one of minimal, low, medium, high (got '{value}')"
                ))
            })?,
            None => ReasoningEffort::default(),
        };

        let timeout = match env_string_opt(TIMEOUT_ENV_VAR) {
            Some(value) => Some(parse_timeout(&value)?),
            None => None,
        };

        Ok(Self {
            provider_id: env_string_opt(PROVIDER_ENV_VAR).map(|value| value.trim().to_string()),
            api_key_path: env_string_opt(API_KEY_PATH_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_API_KEY_PATH)),
            base_url: env_string_opt(BASE_URL_ENV_VAR),
            stream: env_flag(STREAM_ENV_VAR),
            reasoning_effort,
            reasoning_summary: env_flag_default_on(REASONING_SUMMARY_ENV_VAR),
            timeout,
            referer: env_string_opt(REFERER_ENV_VAR).map(|value| value.trim().to_string()),
            app_title: env_string_opt(APP_TITLE_ENV_VAR).map(|value| value.trim().to_string()),
        })
    }

    /// Turn settings for the model picked at startup.
    pub fn turn_settings(&self, model_id: impl Into<String>) -> TurnSettings {
        let mode = if self.stream {
            InvocationMode::Streaming
        } else {
            InvocationMode::Batch
        };

        TurnSettings::new(model_id)
            .with_mode(mode)
            .with_reasoning_effort(self.reasoning_effort)
            .with_reasoning_summary(self.reasoning_summary)
    }
}

fn parse_timeout(value: &str) -> Result<Duration, AppError> {
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(AppError::Config(format!(
            "{TIMEOUT_ENV_VAR} must be a positive number of seconds (got '{value}')"
        ))),
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_flag_default_on(key: &str) -> bool {
    env::var(key).map(|value| value != "0").unwrap_or(true)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
