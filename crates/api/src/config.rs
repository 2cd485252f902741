//! Process configuration from environment variables (and an optional `.env`).

use std::net::SocketAddr;
use std::time::Duration;

use catalog_observability::TelemetryContext;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_NAME: &str = "catalog-api";
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_TELEMETRY_TIMEOUT_MS: u64 = 2000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable '{0}'")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where product records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl StoreConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InMemory => "in-memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

/// Monitoring backend settings. No endpoint means telemetry goes to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub endpoint: Option<String>,
    pub instrumentation_key: Option<String>,
    pub timeout: Duration,
    pub context: TelemetryContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// Recognised variables: `BIND_ADDR`, `USE_PERSISTENT_STORES`,
    /// `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `TELEMETRY_ENDPOINT`,
    /// `TELEMETRY_INSTRUMENTATION_KEY`, `TELEMETRY_TIMEOUT_MS`, `APP_NAME`,
    /// `APP_ENVIRONMENT`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(
            "BIND_ADDR",
            get("BIND_ADDR"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?,
        )?;

        let use_persistent: bool = parse_or("USE_PERSISTENT_STORES", get("USE_PERSISTENT_STORES"), false)?;
        let store = if use_persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_DB_MAX_CONNECTIONS,
            )?;
            StoreConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StoreConfig::InMemory
        };

        let timeout_ms: u64 = parse_or(
            "TELEMETRY_TIMEOUT_MS",
            get("TELEMETRY_TIMEOUT_MS"),
            DEFAULT_TELEMETRY_TIMEOUT_MS,
        )?;

        let telemetry = TelemetryConfig {
            endpoint: get("TELEMETRY_ENDPOINT"),
            instrumentation_key: get("TELEMETRY_INSTRUMENTATION_KEY"),
            timeout: Duration::from_millis(timeout_ms),
            context: TelemetryContext::new(
                get("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
                get("APP_ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
                env!("CARGO_PKG_VERSION"),
            ),
        };

        Ok(Self {
            bind_addr,
            store,
            telemetry,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            reason: format!("'{value}': {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_in_memory_and_tracing_telemetry() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.store, StoreConfig::InMemory);
        assert!(config.telemetry.endpoint.is_none());
        assert_eq!(config.telemetry.timeout, Duration::from_millis(2000));
        assert_eq!(config.telemetry.context.role_name, "catalog-api");
        assert_eq!(config.telemetry.context.environment, "development");
    }

    #[test]
    fn persistent_store_requires_database_url() {
        let err = load(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn persistent_store_reads_connection_settings() {
        let config = load(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Postgres {
                database_url: "postgres://localhost/catalog".to_string(),
                max_connections: 12,
            }
        );
        assert_eq!(config.store.kind(), "postgres");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load(&[("BIND_ADDR", "not-an-addr")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));

        let err = load(&[("USE_PERSISTENT_STORES", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "USE_PERSISTENT_STORES", .. }));

        let err = load(&[("TELEMETRY_TIMEOUT_MS", "-5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TELEMETRY_TIMEOUT_MS", .. }));
    }

    #[test]
    fn telemetry_settings_and_blank_values() {
        let config = load(&[
            ("TELEMETRY_ENDPOINT", "https://ingest.example.com/v2/track"),
            ("TELEMETRY_INSTRUMENTATION_KEY", "   "),
            ("APP_NAME", "catalog-eu"),
            ("APP_ENVIRONMENT", "production"),
        ])
        .unwrap();
        assert_eq!(
            config.telemetry.endpoint.as_deref(),
            Some("https://ingest.example.com/v2/track")
        );
        assert!(config.telemetry.instrumentation_key.is_none());
        assert_eq!(config.telemetry.context.role_name, "catalog-eu");
        assert_eq!(config.telemetry.context.environment, "production");
    }
}
