//! # Configuration Management Module
//!
//! This module handles process configuration for the FAQ bot: which Slack app
//! identity to run as, which FAQ partitions to load, which courses to offer, and
//! where audit files and logs go.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - bot name, identity and optional flow override
//! - [`FaqConfig`] - FAQ source partitions and reload policy
//! - [`CourseOption`] - one `[[courses]]` entry per start-menu button
//! - [`AuditConfig`] - audit trail directory
//! - [`LoggingConfig`] - log level and optional log file
//! - [`SlackConfig`] - Web API base URL and reconnect budget
//!
//! ## Usage
//!
//! ```rust,no_run
//! use faqbot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Bot: {} ({})", config.bot.name, config.flow().as_str());
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "커널아카데미 FAQ 봇"
//! identity = "primary"
//!
//! [faq]
//! reload = "always"
//!
//! [[faq.sources]]
//! path = "data/attendance-faq.json"
//! label = "출석 관련"
//!
//! [[courses]]
//! key = "ai"
//! name = "AI 과정"
//! emoji = "🧠"
//! ```
//!
//! ## Secrets
//!
//! Slack tokens never live in the config file. They are read from the environment
//! (optionally seeded from a `.env` file) by [`Credentials::from_env`]; which pair of
//! variables is read depends on [`BotIdentity`].

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tokio::fs;

use crate::bot::menu::CourseOption;
use crate::bot::state::FlowVariant;
use crate::faq::{FaqSource, ReloadPolicy};

/// Which Slack app this process runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotIdentity {
    /// `SLACK_BOT_TOKEN` / `SLACK_APP_TOKEN`, 3-level navigation
    #[default]
    Primary,
    /// `SLACK_BOT_TOKEN2` / `SLACK_APP_TOKEN2`, 2-level navigation
    Secondary,
}

impl BotIdentity {
    /// `(bot token var, app token var)`
    pub fn env_vars(&self) -> (&'static str, &'static str) {
        match self {
            BotIdentity::Primary => ("SLACK_BOT_TOKEN", "SLACK_APP_TOKEN"),
            BotIdentity::Secondary => ("SLACK_BOT_TOKEN2", "SLACK_APP_TOKEN2"),
        }
    }

    pub fn default_flow(&self) -> FlowVariant {
        match self {
            BotIdentity::Primary => FlowVariant::Categorized,
            BotIdentity::Secondary => FlowVariant::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BotIdentity::Primary => "primary",
            BotIdentity::Secondary => "secondary",
        }
    }
}

impl std::str::FromStr for BotIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "1" => Ok(BotIdentity::Primary),
            "secondary" | "2" => Ok(BotIdentity::Secondary),
            other => Err(format!("unknown identity '{other}' (expected primary or secondary)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    #[serde(default)]
    pub identity: BotIdentity,
    /// Overrides the identity's default navigation flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqConfig {
    #[serde(default)]
    pub reload: ReloadPolicy,
    #[serde(default = "default_sources")]
    pub sources: Vec<FaqSource>,
}

fn default_sources() -> Vec<FaqSource> {
    vec![
        FaqSource::new("data/attendance-faq.json", "출석 관련"),
        FaqSource::new("data/live-lecture-faq.json", "실시간 강의 관련"),
        FaqSource::new("data/online-lecture-faq.json", "온라인 강의 관련"),
        FaqSource::new("data/cource-etc-faq.json", "과정 외 관련"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Consecutive failed reconnects tolerated before `run` gives up.
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: u32,
    /// Seconds between metrics lines in the log (0 disables).
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

fn default_api_base() -> String {
    crate::slack::DEFAULT_API_BASE.to_string()
}

fn default_max_reconnects() -> u32 {
    5
}

fn default_stats_interval() -> u64 {
    300
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub faq: FaqConfig,
    #[serde(default = "CourseOption::defaults")]
    pub courses: Vec<CourseOption>,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub slack: SlackConfig,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            max_reconnects: default_max_reconnects(),
            stats_interval_secs: default_stats_interval(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Navigation flow after applying the optional override.
    pub fn flow(&self) -> FlowVariant {
        self.bot.flow.unwrap_or_else(|| self.bot.identity.default_flow())
    }

    /// Reject course setups that could not round-trip through button payloads.
    pub fn validate(&self) -> Result<()> {
        if self.courses.is_empty() {
            return Err(anyhow!("At least one [[courses]] entry is required"));
        }
        for c in &self.courses {
            if c.key.trim().is_empty() || c.name.trim().is_empty() {
                return Err(anyhow!("Course entries need a non-empty key and name"));
            }
            crate::validation::validate_payload_field("course", &c.name)
                .map_err(|e| anyhow!("Invalid course '{}': {}", c.name, e))?;
        }
        let mut keys: Vec<&str> = self.courses.iter().map(|c| c.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        if keys.len() != self.courses.len() {
            return Err(anyhow!("Course keys must be unique"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "커널아카데미 FAQ 봇".to_string(),
                identity: BotIdentity::Primary,
                flow: None,
            },
            faq: FaqConfig {
                reload: ReloadPolicy::Always,
                sources: default_sources(),
            },
            courses: CourseOption::defaults(),
            audit: AuditConfig {
                dir: "logs".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("faqbot.log".to_string()),
            },
            slack: SlackConfig::default(),
        }
    }
}

/// Slack tokens for one identity
#[derive(Clone)]
pub struct Credentials {
    /// `xoxb-` token for Web API calls
    pub bot_token: String,
    /// `xapp-` token for Socket Mode
    pub app_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("app_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read the token pair for `identity` from the process environment.
    pub fn from_env(identity: BotIdentity) -> Result<Self> {
        let (bot_var, app_var) = identity.env_vars();
        let read = |name: &str| -> Result<String> {
            match env::var(name) {
                Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(anyhow!("Environment variable {} is not set", name)),
            }
        };
        Ok(Self {
            bot_token: read(bot_var)?,
            app_token: read(app_var)?,
        })
    }
}
