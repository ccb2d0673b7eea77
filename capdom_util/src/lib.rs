use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use log::{warn, error};
use snafu::{Snafu, ResultExt};

pub fn init_logging(default_filters: &str) {
    let log_env_raw = env::var("RUST_LOG");
    let log_env = log_env_raw.clone().ok()
        .filter(|env| !env.is_empty())
        .unwrap_or(default_filters.into());

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&log_env)
        .init();

    match &log_env_raw {
        Err(env::VarError::NotUnicode(..)) =>
            error!("Failed to read 'RUST_LOG' due to invalid Unicode. Using default instead: '{}'", default_filters),

        Err(env::VarError::NotPresent) =>
            warn!("Missing 'RUST_LOG'. Using default instead: '{}'", default_filters),

        Ok(s) if s.is_empty() =>
            warn!("Got empty 'RUST_LOG'. Using default instead: '{}'", default_filters),

        Ok(_) => (),
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("'{}' missing or unset in '.env' file: {}", name, source))]
    BadVariable {
        name: String,
        source: env::VarError,
    },

    #[snafu(display("'{}' has invalid value '{}': {}", name, value, reason))]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[snafu(display("{} errors occurred attempting to read config: {:?}", errors.len(), errors))]
    ErrorCollection {
        errors: Vec<ConfigError>,
    }
}

pub trait IntoConfigResult<T> {
    fn into_config_result(self) -> Result<T, ConfigError>;
}

impl<T> IntoConfigResult<T> for Result<T, Vec<ConfigError>> {
    fn into_config_result(self) -> Result<T, ConfigError> {
        self.map_err(|e| ConfigError::ErrorCollection { errors: e })
    }
}

/// Reads environment variables sharing a common prefix, e.g. `CAPDOM_LOADER_HIST_COIN_COUNT`.
pub struct ConfigContext {
    prefix: String,
}

impl ConfigContext {
    pub fn new(prefix: impl AsRef<str>) -> ConfigContext {
        ConfigContext {
            prefix: prefix.as_ref().to_owned(),
        }
    }

    pub fn name_of(&self, name: impl AsRef<str>) -> String {
        format!("{}_{}", self.prefix, name.as_ref())
    }

    pub fn var(&self, name: impl AsRef<str>) -> Result<String, ConfigError> {
        env::var(self.name_of(name.as_ref()))
            .context(BadVariable { name: name.as_ref().to_owned() })
    }

    /// Missing and empty variables both resolve to `default`.
    pub fn var_or(&self, name: impl AsRef<str>, default: impl Into<String>) -> String {
        self.var(name).ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.into())
    }

    pub fn parse_or<T>(&self, name: impl AsRef<str>, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.var(name.as_ref()) {
            Ok(raw) if !raw.trim().is_empty() =>
                raw.trim().parse::<T>()
                    .map_err(|e| self.invalid(name.as_ref(), &raw, e)),
            _ => Ok(default),
        }
    }

    pub fn duration_or(&self, name: impl AsRef<str>, default: Duration) -> Result<Duration, ConfigError> {
        match self.var(name.as_ref()) {
            Ok(raw) if !raw.trim().is_empty() =>
                parse_duration::parse(raw.trim())
                    .map_err(|e| self.invalid(name.as_ref(), &raw, e)),
            _ => Ok(default),
        }
    }

    pub fn invalid(&self, name: &str, value: &str, reason: impl Display) -> ConfigError {
        ConfigError::InvalidValue {
            name: self.name_of(name),
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_should_be_prefixed() {
        let config = ConfigContext::new("CAPDOM_TEST");
        assert_eq!(config.name_of("COIN_COUNT"), "CAPDOM_TEST_COIN_COUNT");
    }

    #[test]
    fn missing_and_empty_values_fall_back_to_default() {
        let config = ConfigContext::new("CAPDOM_UTIL_TEST_DEFAULTS");
        env::set_var("CAPDOM_UTIL_TEST_DEFAULTS_EMPTY", "  ");

        assert_eq!(config.var_or("MISSING", "fallback"), "fallback");
        assert_eq!(config.var_or("EMPTY", "fallback"), "fallback");
        assert_eq!(config.parse_or("MISSING", 7usize).unwrap(), 7);
        assert_eq!(config.parse_or("EMPTY", 7usize).unwrap(), 7);
    }

    #[test]
    fn parses_present_values() {
        let config = ConfigContext::new("CAPDOM_UTIL_TEST_PRESENT");
        env::set_var("CAPDOM_UTIL_TEST_PRESENT_COUNT", " 25 ");
        env::set_var("CAPDOM_UTIL_TEST_PRESENT_DELAY", "90s");

        assert_eq!(config.parse_or("COUNT", 10usize).unwrap(), 25);
        assert_eq!(config.duration_or("DELAY", Duration::from_secs(1)).unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn invalid_values_report_full_variable_name() {
        let config = ConfigContext::new("CAPDOM_UTIL_TEST_INVALID");
        env::set_var("CAPDOM_UTIL_TEST_INVALID_COUNT", "ten");

        let err = config.parse_or("COUNT", 10usize).unwrap_err();
        match err {
            ConfigError::InvalidValue { name, value, .. } => {
                assert_eq!(name, "CAPDOM_UTIL_TEST_INVALID_COUNT");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
