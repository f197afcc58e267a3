//! Runtime configuration.
//!
//! Values come from any key/value source: the Shuttle secret store when
//! deployed, process environment otherwise.

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://crud.db?mode=rwc";
pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const MAX_PAGE_LIMIT: u32 = 1000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("DEFAULT_PAGE_LIMIT ({default}) must be between 1 and MAX_PAGE_LIMIT ({max})")]
    LimitRange { default: u32, max: u32 },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Page size used when a list request carries no `limit`.
    pub default_limit: u32,
    /// Upper bound a caller-supplied `limit` is clamped to.
    pub max_limit: u32,
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let default_limit = parse_limit(&lookup, "DEFAULT_PAGE_LIMIT", DEFAULT_PAGE_LIMIT)?;
        let max_limit = parse_limit(&lookup, "MAX_PAGE_LIMIT", MAX_PAGE_LIMIT)?;

        if default_limit == 0 || default_limit > max_limit {
            return Err(ConfigError::LimitRange {
                default: default_limit,
                max: max_limit,
            });
        }

        Ok(Self {
            database_url,
            default_limit,
            max_limit,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn parse_limit<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.default_limit, 100);
        assert_eq!(config.max_limit, 1000);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://other.db"),
            ("DEFAULT_PAGE_LIMIT", "25"),
            ("MAX_PAGE_LIMIT", "50"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite://other.db");
        assert_eq!(config.default_limit, 25);
        assert_eq!(config.max_limit, 50);
    }

    #[test]
    fn rejects_non_numeric_limit() {
        let err = AppConfig::from_lookup(lookup_from(&[("DEFAULT_PAGE_LIMIT", "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: "DEFAULT_PAGE_LIMIT",
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn rejects_default_above_max() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DEFAULT_PAGE_LIMIT", "200"),
            ("MAX_PAGE_LIMIT", "100"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::LimitRange { default: 200, max: 100 });
    }

    #[test]
    fn rejects_zero_default() {
        assert!(AppConfig::from_lookup(lookup_from(&[("DEFAULT_PAGE_LIMIT", "0")])).is_err());
    }

    #[test]
    fn in_memory_is_detected() {
        assert!(AppConfig::in_memory().is_in_memory());
        assert!(!AppConfig::from_lookup(|_| None).unwrap().is_in_memory());
    }
}
