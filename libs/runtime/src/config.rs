use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration: strongly-typed server and logging
/// sections plus an opaque bag for the HTTP gate section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Logging configuration (defaults used if absent).
    pub logging: Option<LoggingConfig>,
    /// Gate section, deserialized by the composition root.
    #[serde(default)]
    pub gate: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    /// Listen port. When absent the server falls back to the `PORT`
    /// environment variable, then to its built-in default.
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Console level: "trace", "debug", "info", "warn", "error", "off".
    pub console_level: String,
    /// Log file path; empty disables file logging.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: "info".to_string(),
            file: String::new(),
            file_level: "debug".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(LoggingConfig::default()),
            gate: serde_json::Value::Null,
        }
    }
}

impl AppConfig {
    /// Layered loading: defaults → YAML file → environment variables
    /// (`APP__SERVER__PORT=9001` maps to `server.port`).
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Minimal base so optional sections stay None unless provided.
        let base = AppConfig {
            server: ServerConfig::default(),
            logging: None,
            gate: serde_json::Value::Null,
        };

        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path.as_ref()))
            .merge(Env::prefixed("APP__").split("__"))
            .extract()
            .context("Failed to extract configuration")?;

        Ok(config)
    }

    /// Load from a file, or fall back to defaults when no path is given.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = Some(port);
        }

        let logging = self.logging.get_or_insert_with(LoggingConfig::default);
        match args.verbose {
            0 => {}
            1 => logging.console_level = "debug".to_string(),
            _ => logging.console_level = "trace".to_string(),
        }
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_leave_port_unset() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, None);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
server:
  host: "127.0.0.1"
  port: 9100

logging:
  console_level: debug

gate:
  docs:
    title: "Widgets API"
"#,
        )
        .unwrap();

        let config = AppConfig::load_layered(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, Some(9100));
        assert_eq!(config.logging.unwrap().console_level, "debug");
        assert_eq!(config.gate["docs"]["title"], "Widgets API");
    }

    #[test]
    fn cli_overrides_port_and_verbosity() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&CliArgs {
            port: Some(9300),
            verbose: 2,
            ..CliArgs::default()
        });
        assert_eq!(config.server.port, Some(9300));
        assert_eq!(config.logging.unwrap().console_level, "trace");
    }

    #[test]
    fn roundtrips_through_yaml() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("server"));
    }
}
