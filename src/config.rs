//! Configuration for boardbot.
//!
//! Settings are read from a TOML file; credentials may also come from the
//! environment (`BOARDBOT_TOKEN`, `BOARDBOT_WEBHOOK_SECRET`), which takes
//! precedence over the file so secrets can stay out of it entirely.
//!
//! # Configuration File Format
//!
//! ```toml
//! organization = "acme"
//! project = "Release board"
//! developing_column = "Developing"
//! testing_column = "Testing"
//! qa_team = "qa"
//! dev_team = "developers"
//! port = 8000
//! # token = "ghp_..."            # or BOARDBOT_TOKEN
//! # webhook_secret = "..."       # or BOARDBOT_WEBHOOK_SECRET
//! # api_base_url = "https://api.github.com"
//! # request_timeout_secs = 30
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

fn default_port() -> u16 {
    8000
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Organization that owns the tracked project and the teams.
    pub organization: String,
    /// Name of the tracked project board.
    pub project: String,
    /// Column the Dev team works in.
    pub developing_column: String,
    /// Column the QA team works in.
    pub testing_column: String,
    /// Team slug whose members pull issues into testing.
    pub qa_team: String,
    /// Team slug whose members pull issues back into development.
    pub dev_team: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// API token; `BOARDBOT_TOKEN` overrides.
    #[serde(default)]
    pub token: String,
    /// Shared webhook secret; `BOARDBOT_WEBHOOK_SECRET` overrides.
    #[serde(default)]
    pub webhook_secret: String,

    /// Overridable for tests against a local stub server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Upper bound on any single outbound request. A hung call must not
    /// hold the mirror lock forever.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl BotConfig {
    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let mut config: BotConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Ok(token) = std::env::var("BOARDBOT_TOKEN") {
            config.token = token;
        }
        if let Ok(secret) = std::env::var("BOARDBOT_WEBHOOK_SECRET") {
            config.webhook_secret = secret;
        }

        Ok(config)
    }

    /// Validate the loaded configuration, returning all problems found.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let required = [
            ("organization", &self.organization),
            ("project", &self.project),
            ("developing_column", &self.developing_column),
            ("testing_column", &self.testing_column),
            ("qa_team", &self.qa_team),
            ("dev_team", &self.dev_team),
            ("token", &self.token),
            ("webhook_secret", &self.webhook_secret),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{name} must not be empty"));
            }
        }

        if self.developing_column == self.testing_column {
            problems.push("developing_column and testing_column must differ".to_string());
        }
        if self.request_timeout_secs == 0 {
            problems.push("request_timeout_secs must be at least 1".to_string());
        }

        problems
    }
}
