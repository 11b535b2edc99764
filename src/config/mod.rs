use std::collections::HashSet;
use std::env;
use std::fmt;
use std::num::ParseIntError;

use crate::workflows::postings::{ChannelConfig, ChatId, UserId};

/// Distinguishes runtime behavior for different stages of the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub channels: ChannelsConfig,
    pub quota: QuotaConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let moderation_chat_id = parse_chat_id("MODERATION_CHAT_ID", require("MODERATION_CHAT_ID")?)?;
        let main_channel_id = parse_chat_id("MAIN_CHANNEL_ID", require("MAIN_CHANNEL_ID")?)?;
        let channel_username = env::var("CHANNEL_USERNAME")
            .unwrap_or_default()
            .trim()
            .trim_start_matches('@')
            .to_string();

        let unlimited_users = parse_user_list(&env::var("UNLIMITED_USERS").unwrap_or_default())?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            channels: ChannelsConfig {
                moderation_chat_id,
                main_channel_id,
                channel_username,
            },
            quota: QuotaConfig { unlimited_users },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Chat identities the workflow delivers to.
#[derive(Debug, Clone)]
pub struct ChannelsConfig {
    pub moderation_chat_id: i64,
    pub main_channel_id: i64,
    /// Public username of the main channel without `@`; empty when the
    /// channel is private.
    pub channel_username: String,
}

impl ChannelsConfig {
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            moderation_chat: ChatId(self.moderation_chat_id),
            main_channel: ChatId(self.main_channel_id),
            channel_username: self.channel_username.clone(),
        }
    }
}

/// Daily publication limits.
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    pub unlimited_users: Vec<i64>,
}

impl QuotaConfig {
    pub fn unlimited_set(&self) -> HashSet<UserId> {
        self.unlimited_users.iter().copied().map(UserId).collect()
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::MissingVar { var })
}

fn parse_chat_id(var: &'static str, raw: String) -> Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|source| ConfigError::InvalidChatId { var, source })
}

fn parse_user_list(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|source| ConfigError::InvalidUserId {
                    value: part.to_string(),
                    source,
                })
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar { var: &'static str },
    InvalidChatId { var: &'static str, source: ParseIntError },
    InvalidUserId { value: String, source: ParseIntError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar { var } => write!(f, "{var} must be set"),
            ConfigError::InvalidChatId { var, .. } => {
                write!(f, "{var} must be a valid chat id (i64)")
            }
            ConfigError::InvalidUserId { value, .. } => {
                write!(f, "UNLIMITED_USERS entry '{value}' must be a valid user id (i64)")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::MissingVar { .. } => None,
            ConfigError::InvalidChatId { source, .. } => Some(source),
            ConfigError::InvalidUserId { source, .. } => Some(source),
        }
    }
}
