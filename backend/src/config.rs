//! Runtime configuration from the environment.
//!
//! `.env` is loaded by the binary before [`Config::from_env`] runs.
//!
//! | Variable           | Default  |
//! |--------------------|----------|
//! | `LOG_LEVEL`        | `info`   |
//! | `PORT`             | `3000`   |
//! | `MESSAGE_LIMIT`    | `4096`   |
//! | `MAX_UPLOAD_BYTES` | 20 MiB   |

use std::env;
use std::str::FromStr;

use crate::api::logs::LogLevel;
use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;

/// Longest text fragment sent back in one message.
pub const DEFAULT_MESSAGE_LIMIT: usize = 4096;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: LogLevel,
    pub port: u16,
    pub message_limit: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            port: DEFAULT_PORT,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset or blank variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();
        let message_limit = parse_var(&lookup, "MESSAGE_LIMIT", defaults.message_limit)?;
        if message_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MESSAGE_LIMIT",
                value: "0".into(),
            });
        }

        Ok(Self {
            log_level: parse_var(&lookup, "LOG_LEVEL", defaults.log_level)?,
            port: parse_var(&lookup, "PORT", defaults.port)?,
            message_limit,
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::InvalidValue { name, value })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn test_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("LOG_LEVEL", "DEBUG"),
            ("PORT", "8080"),
            ("MESSAGE_LIMIT", " 1000 "),
        ]))
        .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.port, 8080);
        assert_eq!(config.message_limit, 1000);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue { name: "PORT", value: "http".into() }
        );
        assert!(Config::from_lookup(lookup(&[("MESSAGE_LIMIT", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("LOG_LEVEL", "verbose")])).is_err());
    }
}
