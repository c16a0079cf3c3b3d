//! Service configuration
//!
//! Values are resolved in order: built-in defaults, an optional TOML file,
//! then environment variables. The result is validated before use.
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! max_upload_bytes = 10485760
//! chunk_size = 65536
//!
//! [logger]
//! level = "debug"
//! pretty_print = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scanner::DEFAULT_CHUNK_SIZE;

/// Upload cap applied by the HTTP layer.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
    pub chunk_size: usize,
    pub logger: LoggerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    pub level: String,
    pub pretty_print: bool,
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            chunk_size: DEFAULT_CHUNK_SIZE,
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            pretty_print: true,
            enabled: true,
        }
    }
}

impl Config {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply `PORT`, `LOG_LEVEL`, `PRETTY_PRINT` and `LOG_ENABLED` overrides.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "PORT" => {
                    self.port = value.parse().map_err(|_| invalid("PORT", value, "a port number"))?;
                }
                "LOG_LEVEL" => self.logger.level = value.to_ascii_lowercase(),
                "PRETTY_PRINT" => self.logger.pretty_print = parse_bool("PRETTY_PRINT", value)?,
                "LOG_ENABLED" => self.logger.enabled = parse_bool("LOG_ENABLED", value)?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.logger.level.as_str()) {
            return Err(invalid(
                "logger.level",
                &self.logger.level,
                "one of debug, info, warn, error",
            ));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "0", "a positive number of bytes"));
        }
        if self.max_upload_bytes == 0 {
            return Err(invalid("max_upload_bytes", "0", "a positive number of bytes"));
        }
        if self.host.trim().is_empty() {
            return Err(invalid("host", &self.host, "a host name or address"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "a boolean")),
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: format!("expected {}, got {:?}", expected, value),
    }
}
