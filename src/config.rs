//! Process configuration from environment variables

use crate::db::UserId;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "church_bot.db";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub hf_api_key: String,
    pub admin_id: UserId,
    pub db_path: PathBuf,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    /// Sessions and workers idle longer than this are dropped
    pub session_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let seconds = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            get(name).map_or(Ok(Duration::from_secs(default)), |value| {
                value
                    .trim()
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::Invalid { name, value })
            })
        };

        let admin_raw = required("ADMIN_ID")?;
        let admin_id = admin_raw
            .trim()
            .parse()
            .map(UserId)
            .map_err(|_| ConfigError::Invalid {
                name: "ADMIN_ID",
                value: admin_raw.clone(),
            })?;

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            hf_api_key: required("HF_API_KEY")?,
            admin_id,
            db_path: get("CHURCH_BOT_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            llm_base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout: seconds("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
            session_idle: seconds("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("hf_api_key", &"<redacted>")
            .field("admin_id", &self.admin_id)
            .field("db_path", &self.db_path)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout", &self.llm_timeout)
            .field("session_idle", &self.session_idle)
            .finish()
    }
}
