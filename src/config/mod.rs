use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Ranking engine configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "cardrank")]
#[command(about = "Credit card cashback matching and ranking engine")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "CARDRANK_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Path to catalog YAML file (cards and rules)
    #[arg(long, default_value = "catalog.yaml", env = "CARDRANK_CATALOG_PATH")]
    pub catalog_path: PathBuf,

    /// Path to merchant directory YAML file
    #[arg(long, default_value = "merchants.yaml", env = "CARDRANK_MERCHANTS_PATH")]
    pub merchants_path: PathBuf,

    /// Postgres catalog URL (optional; file catalog is used if not set)
    #[arg(long, env = "CARDRANK_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Catalog reload check interval in seconds
    #[arg(long, default_value = "30", env = "CARDRANK_CATALOG_RELOAD_SECS")]
    pub catalog_reload_secs: u64,

    /// Default result limit when the caller sends none (0 = unlimited)
    #[arg(long, default_value = "0", env = "CARDRANK_DEFAULT_LIMIT")]
    pub default_limit: usize,

    /// Latency budget in milliseconds for the calculate endpoint
    #[arg(long, default_value = "100", env = "CARDRANK_LATENCY_BUDGET_MS")]
    pub latency_budget_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "CARDRANK_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,
}

impl Config {
    /// Get catalog reload interval as Duration.
    pub fn catalog_reload_interval(&self) -> Duration {
        Duration::from_secs(self.catalog_reload_secs)
    }

    /// Default limit as the engine expects it (None = unlimited).
    pub fn default_limit(&self) -> Option<usize> {
        if self.default_limit == 0 {
            None
        } else {
            Some(self.default_limit)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            catalog_path: PathBuf::from("catalog.yaml"),
            merchants_path: PathBuf::from("merchants.yaml"),
            database_url: None,
            catalog_reload_secs: 30,
            default_limit: 0,
            latency_budget_ms: 100,
            log_level: "info".to_string(),
            graceful_shutdown: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.latency_budget_ms, 100);
        assert_eq!(config.default_limit(), None);
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config {
            catalog_reload_secs: 60,
            default_limit: 10,
            ..Default::default()
        };

        assert_eq!(config.catalog_reload_interval(), Duration::from_secs(60));
        assert_eq!(config.default_limit(), Some(10));
    }
}
