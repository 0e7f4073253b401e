use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::SearchResult;
use crate::source::IsolationLevel;

const CONFIG_FILE: &str = "./searchql.toml";

/// Executor configuration.
///
/// Loaded with priority: environment variables (`SEARCHQL_*`) > config file
/// (`./searchql.toml`, optional) > defaults.
#[derive(Debug, Deserialize)]
pub struct SearcherConfig {
    /// Run both queries of a request inside one read-only transaction.
    #[serde(default)]
    pub transactional: bool,
    /// Isolation level for transactional mode.
    #[serde(default = "default_isolation")]
    pub isolation: String,
    /// Statements taking at least this long are observed as slow.
    #[serde(default = "default_slow_sql_threshold_ms")]
    pub slow_sql_threshold_ms: u64,
}

fn default_isolation() -> String {
    "read_committed".to_string()
}

const fn default_slow_sql_threshold_ms() -> u64 {
    1000
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            transactional: false,
            isolation: default_isolation(),
            slow_sql_threshold_ms: default_slow_sql_threshold_ms(),
        }
    }
}

impl SearcherConfig {
    /// Loads configuration from the optional config file and environment,
    /// falling back to defaults on any load failure.
    #[must_use]
    pub fn load() -> Self {
        let mut builder = Config::builder();
        if Path::new(CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(CONFIG_FILE));
        }
        builder = builder.add_source(Environment::with_prefix("SEARCHQL"));
        builder
            .build()
            .ok()
            .and_then(|c| c.try_deserialize::<Self>().ok())
            .unwrap_or_default()
    }

    pub fn isolation_level(&self) -> SearchResult<IsolationLevel> {
        self.isolation.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearcherConfig::default();
        assert!(!config.transactional);
        assert_eq!(config.slow_sql_threshold_ms, 1000);
        assert_eq!(config.isolation_level().unwrap(), IsolationLevel::ReadCommitted);
    }

    #[test]
    fn test_unknown_isolation_is_rejected() {
        let config = SearcherConfig {
            isolation: "snapshot".to_string(),
            ..SearcherConfig::default()
        };
        assert!(config.isolation_level().is_err());
    }
}
