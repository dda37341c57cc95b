// =============================================================================
// CONFIGURATION MODULE
// =============================================================================
// Loads configuration from environment variables into a typed struct.
// Malformed values fail at startup with a message naming the variable.
// =============================================================================

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::store::DEFAULT_NAMESPACE;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of the file-backed store (default: ./data)
    pub data_dir: PathBuf,

    /// Prefix for every stored key (default: toner-manager-)
    pub namespace: String,

    /// Movements shown on the dashboard (default: 5)
    pub recent_movements_limit: usize,

    /// Where to write the Prometheus text snapshot, if anywhere
    pub metrics_textfile: Option<PathBuf>,
}

impl Config {
    // -------------------------------------------------------------------------
    // LOAD CONFIGURATION FROM ENVIRONMENT
    // -------------------------------------------------------------------------
    /// Creates a Config by reading environment variables.
    ///
    /// # Returns
    /// - `Ok(Config)` with defaults for anything unset
    /// - `Err` if `RECENT_MOVEMENTS_LIMIT` is not a number
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_dir: env::var("TONER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),

            namespace: env::var("TONER_STORE_NAMESPACE")
                .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string()),

            recent_movements_limit: env::var("RECENT_MOVEMENTS_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Failed to parse RECENT_MOVEMENTS_LIMIT as a number")?,

            metrics_textfile: env::var("METRICS_TEXTFILE").ok().map(PathBuf::from),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_from_env() {
        // Set up test environment
        env::set_var("TONER_DATA_DIR", "/tmp/toners");
        env::set_var("TONER_STORE_NAMESPACE", "test-");
        env::set_var("RECENT_MOVEMENTS_LIMIT", "10");
        env::set_var("METRICS_TEXTFILE", "/tmp/toners.prom");

        let config = Config::from_env().expect("Failed to load config");

        assert_eq!(config.data_dir, PathBuf::from("/tmp/toners"));
        assert_eq!(config.namespace, "test-");
        assert_eq!(config.recent_movements_limit, 10);
        assert_eq!(config.metrics_textfile, Some(PathBuf::from("/tmp/toners.prom")));

        // Malformed limit is an error
        env::set_var("RECENT_MOVEMENTS_LIMIT", "many");
        assert!(Config::from_env().is_err());

        // Defaults once everything is unset
        env::remove_var("TONER_DATA_DIR");
        env::remove_var("TONER_STORE_NAMESPACE");
        env::remove_var("RECENT_MOVEMENTS_LIMIT");
        env::remove_var("METRICS_TEXTFILE");

        let config = Config::from_env().expect("Failed to load config");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.namespace, "toner-manager-");
        assert_eq!(config.recent_movements_limit, 5);
        assert!(config.metrics_textfile.is_none());
    }
}
