//! Service configuration from environment variables
//!
//! | variable                 | default  | meaning                              |
//! |--------------------------|----------|--------------------------------------|
//! | `MODELS_DIR`             | `models` | directory holding the JSON artifacts |
//! | `PORT`                   | `3000`   | HTTP listen port                     |
//! | `GRID_DEADLINE_MS`       | `10000`  | heatmap scoring deadline, 0 = none   |
//! | `HEATMAP_CACHE_TTL_SECS` | `300`    | heatmap response cache TTL           |

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub models_dir: PathBuf,
    pub port: u16,
    pub grid_deadline: Option<Duration>,
    pub heatmap_cache_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            port: 3000,
            grid_deadline: Some(Duration::from_millis(10_000)),
            heatmap_cache_ttl: Duration::from_secs(300),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("MODELS_DIR") {
            config.models_dir = PathBuf::from(dir);
        }
        if let Some(port) = parse_var::<u16>(&lookup, "PORT")? {
            config.port = port;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "GRID_DEADLINE_MS")? {
            config.grid_deadline = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "HEATMAP_CACHE_TTL_SECS")? {
            config.heatmap_cache_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  MODELS_DIR: {:?}", self.models_dir);
        tracing::info!("  PORT: {}", self.port);
        tracing::info!("  GRID_DEADLINE: {:?}", self.grid_deadline);
        tracing::info!("  HEATMAP_CACHE_TTL: {:?}", self.heatmap_cache_ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_overrides_and_zero_deadline() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("MODELS_DIR", "/opt/models"),
            ("PORT", "8080"),
            ("GRID_DEADLINE_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.models_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.grid_deadline, None);
    }

    #[test]
    fn test_bad_port() {
        let err = ServiceConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
