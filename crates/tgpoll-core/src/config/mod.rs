mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::TgPollError;
use defaults::*;

/// Top-level tgpoll configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram Bot API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Bot API host, without the `/bot<token>` suffix.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Server-side long-poll wait passed to `getUpdates`.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Fixed pause before retrying a failed poll.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Client-side cap on a single HTTP request. Must exceed the poll timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_api_base(),
            poll_timeout_secs: default_poll_timeout(),
            retry_delay_ms: default_retry_delay(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl TelegramConfig {
    /// Timing knobs for the polling loop.
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            poll_timeout: Duration::from_secs(self.poll_timeout_secs),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Reject configs the client cannot run with.
    pub fn validate(&self) -> Result<(), TgPollError> {
        if self.bot_token.is_empty() {
            return Err(TgPollError::Config(
                "bot_token is empty. Set it in config.toml or TELEGRAM_BOT_TOKEN env var.".into(),
            ));
        }
        if self.request_timeout_secs <= self.poll_timeout_secs {
            return Err(TgPollError::Config(format!(
                "request_timeout_secs ({}) must be greater than poll_timeout_secs ({})",
                self.request_timeout_secs, self.poll_timeout_secs
            )));
        }
        Ok(())
    }
}

/// Runtime timing settings of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub poll_timeout: Duration,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        TelegramConfig::default().poll_settings()
    }
}

/// Logging settings for the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file. Empty = stderr only.
    #[serde(default)]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, TgPollError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| TgPollError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| TgPollError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
