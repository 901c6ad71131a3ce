//! Environment-driven startup configuration.
//!
//! Every field here corresponds to one of the environment variables named in
//! the specification's External Interfaces section: database connection
//! parameters, bus brokers/topic/consumer-group, and the PVZ identifier a
//! service instance binds to. Failure to provide the PVZ identifier is a
//! fatal startup error, per the spec — [`Config::from_env`] returns an `Err`
//! rather than falling back to a default, and `main` is expected to abort on
//! that `Err`.

use std::env;

/// Database connection parameters.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres host.
    pub host: String,
    /// Postgres port.
    pub port: u16,
    /// Postgres user.
    pub user: String,
    /// Postgres password.
    pub password: String,
    /// Postgres database name.
    pub dbname: String,
}

impl DatabaseConfig {
    /// Render a `postgres://` connection URL for `sqlx`.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.dbname
        )
    }

    fn from_env() -> Self {
        Self {
            host: env::var("PVZ_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("PVZ_DB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5432),
            user: env::var("PVZ_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: env::var("PVZ_DB_PASSWORD").unwrap_or_default(),
            dbname: env::var("PVZ_DB_NAME").unwrap_or_else(|_| "pvz_orders".to_string()),
        }
    }
}

/// Messaging bus connection parameters.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Comma-separated broker addresses.
    pub brokers: String,
    /// Topic the outbox relay publishes domain events to.
    pub topic: String,
    /// Consumer group used by downstream subscribers (not by the relay
    /// itself, which only produces; kept here because it is part of the same
    /// environment contract and consumed by the `bus-watch` example binary).
    pub consumer_group: String,
}

impl BusConfig {
    fn from_env() -> Self {
        Self {
            brokers: env::var("PVZ_BUS_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string()),
            topic: env::var("PVZ_BUS_TOPIC").unwrap_or_else(|_| "pvz.order-events".to_string()),
            consumer_group: env::var("PVZ_BUS_CONSUMER_GROUP")
                .unwrap_or_else(|_| "pvz-order-events".to_string()),
        }
    }
}

/// Top-level service configuration, assembled from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// The PVZ identifier this instance accepts/issues parcels for.
    /// Every instance binds to exactly one PVZ, per §1.
    pub pvz_id: crate::ids::PvzId,
    /// Database connection parameters.
    pub database: DatabaseConfig,
    /// Messaging bus connection parameters.
    pub bus: BusConfig,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `PVZ_ID` is unset or empty — the specification
    /// calls this out explicitly as a fatal startup error, not a default-able
    /// value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let pvz_id = env::var("PVZ_ID")
            .map_err(|_| ConfigError::MissingPvzId)
            .and_then(|v| {
                if v.trim().is_empty() {
                    Err(ConfigError::MissingPvzId)
                } else {
                    Ok(v)
                }
            })?;

        Ok(Self {
            pvz_id: crate::ids::PvzId::from(pvz_id),
            database: DatabaseConfig::from_env(),
            bus: BusConfig::from_env(),
        })
    }
}

/// Fatal startup configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `PVZ_ID` was not set or was empty. A service instance cannot start
    /// without knowing which pickup point it serves.
    #[error("PVZ_ID environment variable is required and must be non-empty")]
    MissingPvzId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_pvz_id_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::remove_var("PVZ_ID");
        }
        assert!(matches!(Config::from_env(), Err(ConfigError::MissingPvzId)));
    }

    #[test]
    fn blank_pvz_id_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::set_var("PVZ_ID", "   ");
        }
        assert!(matches!(Config::from_env(), Err(ConfigError::MissingPvzId)));
        unsafe {
            env::remove_var("PVZ_ID");
        }
    }

    #[test]
    fn present_pvz_id_loads() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::set_var("PVZ_ID", "p1");
        }
        let cfg = Config::from_env().expect("config should load");
        assert_eq!(cfg.pvz_id.as_str(), "p1");
        unsafe {
            env::remove_var("PVZ_ID");
        }
    }

    #[test]
    fn database_url_has_expected_shape() {
        let db = DatabaseConfig {
            host: "db".to_string(),
            port: 5432,
            user: "u".to_string(),
            password: "p".to_string(),
            dbname: "d".to_string(),
        };
        assert_eq!(db.url(), "postgres://u:p@db:5432/d");
    }
}
