//! Application configuration, read from `settings.toml`.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// In-memory sqlite, for local experiments. Data is lost on exit.
    Memory,
    /// Path of the sqlite file, created on first run.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter applied to the workspace crates.
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
    /// Peer transfers at or above this amount wait for admin review.
    pub transfer_review_threshold_minor: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
