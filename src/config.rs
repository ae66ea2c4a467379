use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The portion of the shared deployment config file this bridge cares about.
/// Fields used only by the collector script are ignored.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
}

#[derive(Debug, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Loads the config from `dir`, preferring `config.local.toml` over
    /// `config.toml`. Presence and type of the broker fields are checked
    /// here, before any network activity.
    pub fn load(dir: &Path) -> Result<Config, ConfigError> {
        let mut path = dir.join("config.local.toml");
        if !path.is_file() {
            path = dir.join("config.toml");
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Invalid { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        [mqtt]
        host = "broker.local"
        port = 1883
        username = "news"
        password = "hunter2"
    "#;

    #[test]
    fn accepts_a_complete_mqtt_section() {
        let config: Config = toml::from_str(VALID).unwrap();
        assert_eq!(config.mqtt.host, "broker.local");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.username, "news");
        assert_eq!(config.mqtt.password, "hunter2");
    }

    #[test]
    fn ignores_sections_used_by_other_programs() {
        let raw = format!("{VALID}\n[feeds]\nurl = \"https://example.com/rss\"\n");
        assert!(toml::from_str::<Config>(&raw).is_ok());
    }

    #[test]
    fn rejects_a_missing_mqtt_section() {
        assert!(toml::from_str::<Config>("").is_err());
    }

    #[test]
    fn rejects_each_missing_field() {
        for missing in ["host", "port", "username", "password"] {
            let raw: String = VALID
                .lines()
                .filter(|line| !line.trim_start().starts_with(missing))
                .collect::<Vec<_>>()
                .join("\n");
            assert!(
                toml::from_str::<Config>(&raw).is_err(),
                "config without mqtt.{missing} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_a_mistyped_port() {
        let raw = r#"
            [mqtt]
            host = "broker.local"
            port = "1883"
            username = "news"
            password = "hunter2"
        "#;
        assert!(toml::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn rejects_a_mistyped_host() {
        let raw = r#"
            [mqtt]
            host = 42
            port = 1883
            username = "news"
            password = "hunter2"
        "#;
        assert!(toml::from_str::<Config>(raw).is_err());
    }
}
