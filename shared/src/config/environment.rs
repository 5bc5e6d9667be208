//! Deployment environment and the logging defaults derived from it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Crates whose events are worth reading at debug level
const SERVICE_CRATES: [&str; 3] = ["ts_api", "ts_core", "ts_infra"];

/// Where the service is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Short spellings accepted besides the full name
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Environment::Development => &["dev", "local"],
            Environment::Staging => &["stage", "test"],
            Environment::Production => &["prod"],
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }

    /// Read `ENVIRONMENT`. Unset means development; an unknown name is an
    /// error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("ENVIRONMENT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::invalid("ENVIRONMENT", format!("unknown environment '{}'", raw))),
            Err(_) => Ok(Environment::default()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == wanted || env.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| ConfigError::invalid("ENVIRONMENT", format!("unknown environment '{}'", s)))
    }
}

/// Subscriber settings handed to the binary at startup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Development traces the service crates at debug over quiet
    /// dependencies; deployed environments keep dependencies at `warn` and
    /// emit JSON.
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                filter: service_filter("info", "debug"),
                format: LogFormat::Pretty,
            },
            Environment::Staging => Self {
                filter: service_filter("warn", "debug"),
                format: LogFormat::Json,
            },
            Environment::Production => Self {
                filter: service_filter("warn", "info"),
                format: LogFormat::Json,
            },
        }
    }

    /// Environment defaults with `LOG_LEVEL` and `LOG_FORMAT` applied on top.
    ///
    /// `LOG_LEVEL` may be a bare level, which then applies to the service
    /// crates only, or a full filter directive.
    pub fn from_env(env: Environment) -> Result<Self, ConfigError> {
        let mut config = Self::for_environment(env);

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.trim();
            config.filter = if level.contains(|c: char| c == '=' || c == ',') {
                level.to_string()
            } else {
                let base = if env.is_development() { "info" } else { "warn" };
                service_filter(base, level)
            };
        }
        config.format = super::parse_env("LOG_FORMAT", config.format)?;

        Ok(config)
    }
}

/// `<base>,ts_api=<ours>,...`
fn service_filter(base: &str, ours: &str) -> String {
    SERVICE_CRATES
        .iter()
        .fold(base.to_string(), |filter, krate| format!("{},{}={}", filter, krate, ours))
}

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::invalid("LOG_FORMAT", format!("unknown format '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_names_and_aliases() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!(" Staging ".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("qa".parse::<Environment>().is_err());

        for env in Environment::ALL {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }

    #[test]
    fn test_unknown_environment_is_an_error() {
        temp_env::with_var("ENVIRONMENT", Some("prodd"), || {
            assert!(Environment::from_env().is_err());
        });
        temp_env::with_var_unset("ENVIRONMENT", || {
            assert_eq!(Environment::from_env().unwrap(), Environment::Development);
        });
    }

    #[test]
    fn test_filters_target_service_crates() {
        let dev = LoggingConfig::for_environment(Environment::Development);
        assert_eq!(dev.filter, "info,ts_api=debug,ts_core=debug,ts_infra=debug");
        assert_eq!(dev.format, LogFormat::Pretty);

        let prod = LoggingConfig::for_environment(Environment::Production);
        assert_eq!(prod.filter, "warn,ts_api=info,ts_core=info,ts_infra=info");
        assert_eq!(prod.format, LogFormat::Json);
    }

    #[test]
    fn test_log_overrides() {
        temp_env::with_vars(
            [("LOG_LEVEL", Some("trace")), ("LOG_FORMAT", Some("compact"))],
            || {
                let config = LoggingConfig::from_env(Environment::Production).unwrap();
                assert_eq!(config.filter, "warn,ts_api=trace,ts_core=trace,ts_infra=trace");
                assert_eq!(config.format, LogFormat::Compact);
            },
        );

        temp_env::with_vars(
            [("LOG_LEVEL", Some("debug,hyper=warn")), ("LOG_FORMAT", None)],
            || {
                let config = LoggingConfig::from_env(Environment::Production).unwrap();
                assert_eq!(config.filter, "debug,hyper=warn");
                assert_eq!(config.format, LogFormat::Json);
            },
        );

        temp_env::with_var("LOG_FORMAT", Some("xml"), || {
            assert!(LoggingConfig::from_env(Environment::Development).is_err());
        });
    }
}
