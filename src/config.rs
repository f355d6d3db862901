use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://studydesk.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 3600;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub gemini: Option<GeminiConfig>,
    pub reminder_interval_secs: u64,
    pub notify_webhook_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

impl AppConfig {
    /// Read configuration from the environment. Call `dotenvy::dotenv()` first
    /// to pick up a local `.env`.
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let gemini = match non_empty_var("GEMINI_API_KEY") {
            Some(api_key) => Some(GeminiConfig {
                api_key,
                model: non_empty_var("GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            }),
            None => None,
        };

        let reminder_interval_secs = match non_empty_var("REMINDER_INTERVAL_SECS") {
            Some(raw) => parse_interval(&raw)?,
            None => DEFAULT_REMINDER_INTERVAL_SECS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            gemini,
            reminder_interval_secs,
            notify_webhook_url: non_empty_var("NOTIFY_WEBHOOK_URL"),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_interval(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::Config(
            "REMINDER_INTERVAL_SECS must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(secs),
        Err(e) => Err(AppError::Config(format!(
            "REMINDER_INTERVAL_SECS is invalid: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("60").unwrap(), 60);
        assert_eq!(parse_interval(" 15 ").unwrap(), 15);
        assert!(matches!(parse_interval("0"), Err(AppError::Config(_))));
        assert!(matches!(parse_interval("hourly"), Err(AppError::Config(_))));
    }
}
