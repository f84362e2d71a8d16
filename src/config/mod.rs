//! Configuration handling for the application.
//!
//! Everything comes from environment variables. `DATABASE_URL` is required:
//! a missing connection string is a configuration failure, reported
//! distinctly from downstream database errors so operators can tell the two
//! apart. The remaining values fall back to development defaults.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable names. Keeping them public lets other crates (tests,
/// build scripts) refer to them if needed later.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_EXPOSE_ERROR_DETAILS: &str = "EXPOSE_ERROR_DETAILS";

/// Default development values used when environment variables are absent.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    database_url: String,
    bind_addr: String,
    expose_error_details: bool,
}

impl Config {
    /// Create a new config explicitly.
    pub fn new(
        database_url: impl Into<String>,
        bind_addr: impl Into<String>,
        expose_error_details: bool,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            bind_addr: bind_addr.into(),
            expose_error_details,
        }
    }

    /// Load from environment variables.
    ///
    /// Fails with [`ConfigError::Missing`] when `DATABASE_URL` is unset;
    /// `BIND_ADDR` and `EXPOSE_ERROR_DETAILS` fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var(ENV_DATABASE_URL).map_err(|_| ConfigError::Missing {
            field: ENV_DATABASE_URL,
        })?;
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let expose_error_details = env::var(ENV_EXPOSE_ERROR_DETAILS)
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(Self {
            database_url,
            bind_addr,
            expose_error_details,
        })
    }

    /// Database connection string (PostgreSQL URL).
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Whether 500 responses include the underlying database message.
    pub fn expose_error_details(&self) -> bool {
        self.expose_error_details
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable was not set.
    Missing { field: &'static str },
    /// Reserved for future validation failures.
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing { field } => {
                write!(f, "missing required environment variable '{}'", field)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [ENV_DATABASE_URL, ENV_BIND_ADDR, ENV_EXPOSE_ERROR_DETAILS] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                field: ENV_DATABASE_URL
            }
        ));
    }

    #[test]
    fn defaults_when_optional_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_DATABASE_URL, "postgres://user:pw@db:5432/matchday");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.bind_addr(), super::DEFAULT_BIND_ADDR);
        assert!(!cfg.expose_error_details());
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_DATABASE_URL, "postgres://user:pw@db:5432/other");
            env::set_var(ENV_BIND_ADDR, "0.0.0.0:9000");
            env::set_var(ENV_EXPOSE_ERROR_DETAILS, "true");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.database_url(), "postgres://user:pw@db:5432/other");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert!(cfg.expose_error_details());
    }
}
