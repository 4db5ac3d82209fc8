use crate::errors::{MoltcheckError, MoltcheckResult};
use std::path::PathBuf;

/// Runtime configuration, sourced from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub moltbook_api_key: String,
    pub moltbook_base_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub heartbeat_interval_hours: u64,
    pub max_posts_per_day: u32,
    pub max_comments_per_heartbeat: u32,
    pub max_replies_per_heartbeat: u32,
    pub log_level: String,
    pub data_dir: PathBuf,
}

fn required(name: &str) -> MoltcheckResult<String> {
    std::env::var(name)
        .map_err(|_| MoltcheckError::Config(format!("{} must be set", name)))
        .and_then(|v| {
            if v.trim().is_empty() {
                Err(MoltcheckError::Config(format!("{} must not be empty", name)))
            } else {
                Ok(v)
            }
        })
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn bounded_u64(name: &str, default: u64, min: u64, max: u64) -> MoltcheckResult<u64> {
    let raw = match std::env::var(name) {
        Ok(v) => v,
        Err(_) => return Ok(default),
    };
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| MoltcheckError::Config(format!("{} must be an integer, got '{}'", name, raw)))?;
    if value < min || value > max {
        return Err(MoltcheckError::Config(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(value)
}

impl Settings {
    /// Load and validate settings from the process environment.
    pub fn from_env() -> MoltcheckResult<Self> {
        Ok(Self {
            moltbook_api_key: required("MOLTBOOK_API_KEY")?,
            moltbook_base_url: optional(
                "MOLTBOOK_BASE_URL",
                "https://www.moltbook.com/api/v1",
            ),
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: optional("GEMINI_MODEL", "gemini-2.0-flash"),
            heartbeat_interval_hours: bounded_u64("HEARTBEAT_INTERVAL_HOURS", 4, 1, 24)?,
            max_posts_per_day: bounded_u64("MAX_POSTS_PER_DAY", 3, 1, 10)? as u32,
            max_comments_per_heartbeat: bounded_u64("MAX_COMMENTS_PER_HEARTBEAT", 10, 1, 50)?
                as u32,
            max_replies_per_heartbeat: bounded_u64("MAX_REPLIES_PER_HEARTBEAT", 5, 1, 20)? as u32,
            log_level: optional("LOG_LEVEL", "info"),
            data_dir: PathBuf::from(optional("DATA_DIR", "data")),
        })
    }
}
