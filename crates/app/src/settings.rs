use config::{Config, ConfigError, Environment, File};
use knowledge_sync::SyncConfig;
use narrative::NarratorConfig;
use serde::Deserialize;

use crate::agent::AgentConfig;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA name of the local timezone, decides what "today" is.
    pub timezone: String,
    /// Create the default accounts and goals on an empty ledger.
    pub seed: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "Africa/Johannesburg".to_string(),
            seed: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("./lif3.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub server: Option<Server>,
    pub narrator: NarratorConfig,
    pub agent: AgentConfig,
    pub sync: SyncConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: App::default(),
            database: Database::default(),
            server: Some(Server::default()),
            narrator: NarratorConfig::default(),
            agent: AgentConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Settings {
    /// Reads `settings.toml` (optional) and `LIF3__SECTION__KEY` overrides.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load("settings")
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("LIF3").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn timezone(&self) -> Result<chrono_tz::Tz, String> {
        self.app
            .timezone
            .parse()
            .map_err(|_| format!("unknown timezone '{}'", self.app.timezone))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let settings = Settings::load(path.to_str().unwrap()).unwrap();

        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.database, Database::Sqlite(ref p) if p == "./lif3.db"));
        assert_eq!(settings.server.as_ref().map(|s| s.port), Some(8000));
        assert_eq!(settings.narrator.timeout_secs, 20);
        assert_eq!(settings.agent.interval_secs, 300);
        assert!(!settings.sync.enabled);
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Africa::Johannesburg);
    }

    #[test]
    fn file_overrides_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
database = "memory"

[app]
level = "debug"
timezone = "Europe/London"

[narrator]
timeout_secs = 5

[agent]
briefing_hour = 7
"#
        )
        .unwrap();

        let settings = Settings::load(dir.path().join("settings").to_str().unwrap()).unwrap();
        assert_eq!(settings.app.level, "debug");
        assert!(matches!(settings.database, Database::Memory));
        assert_eq!(settings.narrator.timeout_secs, 5);
        assert_eq!(settings.agent.briefing_hour, 7);
        assert_eq!(settings.agent.interval_secs, 300);
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Europe::London);
    }

    #[test]
    fn bad_timezone_is_reported() {
        let mut settings = Settings::default();
        settings.app.timezone = "Mars/Olympus".to_string();
        assert!(settings.timezone().unwrap_err().contains("Mars/Olympus"));
    }
}
