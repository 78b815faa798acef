//! Application settings.
//!
//! Read from `settings.toml` (optional, see `settings.example.toml`) and from
//! environment variables prefixed with `TALLY`, e.g. `TALLY__TELEGRAM__TOKEN`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u64,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_true")]
    pub monthly_reminder: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    pub telegram: Option<Telegram>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("TALLY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_page_size() -> usize {
    telegram_bot::DEFAULT_PAGE_SIZE
}

fn default_session_ttl_minutes() -> u64 {
    30
}

fn default_currency() -> String {
    engine::DEFAULT_CURRENCY.to_string()
}

fn default_true() -> bool {
    true
}
