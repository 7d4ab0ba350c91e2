//! # Configuration
//!
//! Loads and parses the bot's configuration file (`config.yaml`).
//! Every section is optional; missing values fall back to defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::types::Role;

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Static role table used by the console harness.
    #[serde(default)]
    pub roles: HashMap<String, Role>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    /// Shown next to the bot's username in advertisements. Empty means no alias.
    #[serde(default)]
    pub name: String,
    /// Account the bot runs as.
    #[serde(default = "default_username")]
    pub username: String,
    /// When set, text messages without this prefix never reach the registry.
    #[serde(default)]
    pub command_prefix: Option<String>,
    #[serde(default)]
    pub allow_self_messages: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            username: default_username(),
            command_prefix: None,
            allow_self_messages: false,
        }
    }
}

fn default_username() -> String {
    "switchboard".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Maximum number of messages dispatched at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Seconds in-flight messages get to finish once shutdown starts.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}

fn default_shutdown_grace() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub json: bool,
    /// Log file written through a non-blocking appender.
    #[serde(default)]
    pub file: Option<String>,
    /// Conversation that receives a copy of every log line.
    #[serde(default)]
    pub conversation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    /// Upper bound, in seconds, for any single collaborator call.
    #[serde(default = "default_timeout")]
    pub collaborator: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            collaborator: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Reads the configuration at `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        if config.dispatch.concurrency == 0 {
            anyhow::bail!("dispatch.concurrency must be at least 1");
        }
        Ok(config)
    }

    /// The global prefix, ignoring empty strings.
    pub fn command_prefix(&self) -> Option<&str> {
        self.bot
            .command_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.bot.username, "switchboard");
        assert_eq!(config.dispatch.concurrency, 1);
        assert_eq!(config.dispatch.shutdown_grace, 10);
        assert_eq!(config.timeouts.collaborator, 30);
        assert!(config.command_prefix().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bot:
  name: Helper
  username: helperbot
  command_prefix: "!"
dispatch:
  concurrency: 4
  shutdown_grace: 3
logging:
  debug: true
  conversation: "log-conv"
timeouts:
  collaborator: 5
roles:
  alice: Owner
  bob: reader
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.bot.name, "Helper");
        assert_eq!(config.bot.username, "helperbot");
        assert_eq!(config.command_prefix(), Some("!"));
        assert!(!config.bot.allow_self_messages);
        assert_eq!(config.dispatch.concurrency, 4);
        assert_eq!(config.dispatch.shutdown_grace, 3);
        assert!(config.logging.debug);
        assert_eq!(config.logging.conversation.as_deref(), Some("log-conv"));
        assert_eq!(config.timeouts.collaborator, 5);
        assert_eq!(config.roles.get("alice"), Some(&Role::Owner));
        assert_eq!(config.roles.get("bob"), Some(&Role::Reader));
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let config = AppConfig::parse("bot:\n  command_prefix: \"\"\n").unwrap();
        assert!(config.command_prefix().is_none());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(AppConfig::parse("dispatch:\n  concurrency: 0\n").is_err());
    }
}
