// Configuration module entry point
// Loads layered configuration and exposes the shared application state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::{RegistryError, Result};

// Re-export public types
pub use state::AppState;
pub use types::{Config, IdStrategy, LoggingConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from "config.toml" (optional) plus environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest precedence first: built-in defaults, the file (if it
    /// exists), then `REGISTRY_*` environment variables with `__` between
    /// nested keys, e.g. `REGISTRY_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Same layering, reading variables from `env` instead of the process
    /// environment when it is given
    fn load_with_env(config_path: &str, env: Option<config::Map<String, String>>) -> Result<Self> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("REGISTRY")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Built-in defaults only, unaffected by files or `REGISTRY_*` variables
    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self::load_with_env("does-not-exist", Some(config::Map::new()))
            .expect("built-in defaults deserialize")
    }

    fn defaults() -> std::result::Result<
        config::ConfigBuilder<config::builder::DefaultState>,
        config::ConfigError,
    > {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "movie-registry")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.legacy_silent_errors", false)?
            .set_default("store.seed", true)?
            .set_default("store.id_strategy", "random")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| RegistryError::InvalidAddress(format!("{}: {e}", self.server.host)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::test_defaults();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.store.id_strategy, IdStrategy::Random);
        assert!(cfg.store.seed);
        assert!(!cfg.http.legacy_silent_errors);
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert_eq!(cfg.performance.max_connections, None);
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.liveness_path, "/healthz");
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_env_overrides_defaults() {
        let cfg = Config::load_with_env(
            "does-not-exist",
            env(&[
                ("REGISTRY_SERVER__PORT", "9123"),
                ("REGISTRY_HTTP__LEGACY_SILENT_ERRORS", "true"),
                ("REGISTRY_STORE__ID_STRATEGY", "sequential"),
                ("REGISTRY_PERFORMANCE__MAX_CONNECTIONS", "16"),
                ("OTHER_SERVER__PORT", "1"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9123);
        assert!(cfg.http.legacy_silent_errors);
        assert_eq!(cfg.store.id_strategy, IdStrategy::Sequential);
        assert_eq!(cfg.performance.max_connections, Some(16));
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn test_file_then_env_layering() {
        let path = std::env::temp_dir().join(format!(
            "movie-registry-{}-layering.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[server]\nhost = \"127.0.0.1\"\nport = 9001\n\n[store]\nseed = false\n\n[routes.health]\nenabled = false\n",
        )
        .unwrap();
        let file = path.to_str().unwrap();

        let from_file = Config::load_with_env(file, env(&[]));
        let with_env = Config::load_with_env(file, env(&[("REGISTRY_SERVER__PORT", "9002")]));
        std::fs::remove_file(&path).unwrap();

        let cfg = from_file.unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9001);
        assert!(!cfg.store.seed);
        assert!(!cfg.routes.health.enabled);
        // Keys the file leaves out keep their defaults
        assert_eq!(cfg.store.id_strategy, IdStrategy::Random);
        assert_eq!(cfg.routes.health.readiness_path, "/readyz");

        let cfg = with_env.unwrap();
        assert_eq!(cfg.server.port, 9002);
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_bad_value_is_config_error() {
        let result = Config::load_with_env(
            "does-not-exist",
            env(&[("REGISTRY_STORE__ID_STRATEGY", "uuid")]),
        );
        assert!(matches!(result, Err(RegistryError::Config(_))));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::test_defaults();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_invalid_host_rejected() {
        let mut cfg = Config::test_defaults();
        cfg.server.host = "not a host".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(RegistryError::InvalidAddress(_))
        ));
    }
}
