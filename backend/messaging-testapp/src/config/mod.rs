use nova_messaging_shared::{load_script, AppOptions, LoopbackConfig, MessagingError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::runner::RunnerSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub messaging: MessagingConfig,
    pub loopback: LoopbackSettings,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_id: String,
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    pub topic: String,
    /// Pump timeout while initialization is pending (default: 100ms)
    pub init_poll_ms: u64,
    /// Pump timeout per main loop iteration (default: 1000ms)
    pub poll_interval_ms: u64,
    /// Pump once for this long after an init failure (default: 2000ms)
    pub failure_linger_ms: u64,
    pub await_subscription: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopbackSettings {
    pub script_path: Option<String>,
    pub delivery_interval_ms: u64,
    pub registration_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub json: bool,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match var(key) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value }),
        },
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                app_id: var("MESSAGING_APP_ID")
                    .unwrap_or_else(|| "nova-messaging-testapp".to_string()),
                // An explicitly empty project id is kept so context creation reports it
                project_id: std::env::var("MESSAGING_PROJECT_ID")
                    .unwrap_or_else(|_| "nova-dev".to_string()),
            },
            messaging: MessagingConfig {
                topic: var("MESSAGING_TOPIC").unwrap_or_else(|| "TestTopic".to_string()),
                init_poll_ms: parse_or("MESSAGING_INIT_POLL_MS", 100)?,
                poll_interval_ms: parse_or("MESSAGING_POLL_INTERVAL_MS", 1000)?,
                failure_linger_ms: parse_or("MESSAGING_FAILURE_LINGER_MS", 2000)?,
                await_subscription: parse_bool("MESSAGING_AWAIT_SUBSCRIPTION", false)?,
            },
            loopback: LoopbackSettings {
                script_path: var("MESSAGING_SCRIPT_PATH"),
                delivery_interval_ms: parse_or("MESSAGING_DELIVERY_INTERVAL_MS", 500)?,
                registration_token: var("MESSAGING_REGISTRATION_TOKEN"),
            },
            log: LogConfig {
                json: var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
        })
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            app_options: AppOptions::new(&self.app.app_id, &self.app.project_id),
            topic: self.messaging.topic.clone(),
            init_poll: Duration::from_millis(self.messaging.init_poll_ms),
            poll_interval: Duration::from_millis(self.messaging.poll_interval_ms),
            failure_linger: Duration::from_millis(self.messaging.failure_linger_ms),
            await_subscription: self.messaging.await_subscription,
        }
    }

    /// Build the loopback backend configuration, loading the message script if set
    pub fn loopback_config(&self) -> Result<LoopbackConfig, MessagingError> {
        let mut config = LoopbackConfig::default().with_delivery_interval(Duration::from_millis(
            self.loopback.delivery_interval_ms,
        ));
        if let Some(token) = &self.loopback.registration_token {
            config = config.with_token(token);
        }
        if let Some(path) = &self.loopback.script_path {
            config = config.with_script(load_script(path)?);
        }
        Ok(config)
    }
}
